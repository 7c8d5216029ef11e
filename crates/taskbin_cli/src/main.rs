//! taskbin CLI.
//!
//! # Responsibility
//! - Map subcommands onto `LifecycleService` operations over the SQLite store.
//! - Ask for confirmation before destructive operations unless `--yes` is set.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use taskbin_core::db::open_db;
use taskbin_core::{
    core_version, init_logging, AppConfig, EngineError, EntityId, LifecycleService,
    SnapshotRepository, SqliteSnapshotRepository,
};

#[derive(Parser)]
#[command(name = "taskbin")]
#[command(author, version, about = "Projects, tasks and their recycle bins", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database file (overrides TASKBIN_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    yes: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Show active projects and the tasks of the focused project
    List {
        /// Project to show tasks for (defaults to the resolved focus)
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Show the project bin and the task bin
    Bin,

    /// Write a JSON backup of everything
    Export {
        /// Target directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Replace everything with the content of a JSON backup
    Import { path: PathBuf },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// Create a project
    Create { name: String },
    /// Show a project with its active tasks
    Select { id: String },
    /// Move a project and all its tasks to the bin
    Delete { id: String },
    /// Restore a project and the tasks removed with it
    Recover { id: String },
    /// Remove a project and all its tasks forever
    Purge { id: String },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Add a task
    Add {
        description: String,
        /// Owning project (defaults to the resolved focus)
        #[arg(short, long)]
        project: Option<String>,
    },
    /// Mark a task completed
    Done { id: String },
    /// Mark a completed task active again
    Undone { id: String },
    /// Move a task to the bin
    Delete { id: String },
    /// Restore a task from the bin
    Recover { id: String },
    /// Remove a task forever
    Purge { id: String },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        match err.downcast_ref::<EngineError>() {
            Some(engine) => eprintln!("error[{}]: {engine}", engine.kind().as_str()),
            None => eprintln!("error: {err:#}"),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let repo = SqliteSnapshotRepository::with_key(&conn, config.storage_key.as_str());
    info!(
        "event=cli_start module=cli status=ok core_version={} storage_key={} db_path={}",
        core_version(),
        repo.storage_key(),
        config.db_path.display()
    );
    let mut service = LifecycleService::new(repo);
    let yes = cli.yes;

    match cli.command {
        Commands::Project { action } => run_project(&mut service, action, yes),
        Commands::Task { action } => run_task(&mut service, action, yes),
        Commands::List { project } => list(&mut service, project),
        Commands::Bin => show_bin(&service),
        Commands::Export { out } => {
            let path = service.write_backup(&out)?;
            println!("exported to {}", path.display());
            Ok(())
        }
        Commands::Import { path } => {
            confirm(yes, "Importing replaces all current projects and tasks.")?;
            let outcome = service.read_backup(&path)?;
            println!(
                "imported {} projects and {} tasks",
                outcome.value.projects, outcome.value.tasks
            );
            if outcome.value.invariant_violations > 0 {
                println!(
                    "note: {} inconsistencies kept as-is",
                    outcome.value.invariant_violations
                );
            }
            Ok(())
        }
    }
}

fn run_project<R: SnapshotRepository>(
    service: &mut LifecycleService<R>,
    action: ProjectAction,
    yes: bool,
) -> Result<()> {
    match action {
        ProjectAction::Create { name } => {
            let project = service.create_project(&name)?.value;
            println!("created project {} ({})", project.name, project.id);
        }
        ProjectAction::Select { id } => {
            let project = service.select_project(&EntityId::from(id))?;
            println!("{} ({})", project.name, project.id);
            for task in service.active_tasks(&project.id)? {
                println!("  [ ] {} ({})", task.description, task.id);
            }
        }
        ProjectAction::Delete { id } => {
            confirm(yes, "The project and all of its tasks move to the bin.")?;
            let report = service.soft_delete_project(&EntityId::from(id))?.value;
            println!(
                "moved project {} and {} tasks to the bin",
                report.project.name,
                report.affected_tasks.len()
            );
        }
        ProjectAction::Recover { id } => {
            let report = service.recover_project(&EntityId::from(id))?.value;
            println!(
                "recovered project {} and {} tasks",
                report.project.name,
                report.affected_tasks.len()
            );
        }
        ProjectAction::Purge { id } => {
            confirm(yes, "The project and all of its tasks are deleted forever.")?;
            let report = service.permanently_delete_project(&EntityId::from(id))?.value;
            println!(
                "deleted project {} and {} tasks",
                report.project.name, report.removed_tasks
            );
        }
    }
    Ok(())
}

fn run_task<R: SnapshotRepository>(
    service: &mut LifecycleService<R>,
    action: TaskAction,
    yes: bool,
) -> Result<()> {
    match action {
        TaskAction::Add {
            description,
            project,
        } => {
            let project_id = match project {
                Some(id) => EntityId::from(id),
                None => match service.resolve_focus()? {
                    Some(id) => id,
                    None => bail!("no active project; create one first"),
                },
            };
            let task = service.create_task(&project_id, &description)?.value;
            println!("added task {} ({})", task.description, task.id);
        }
        TaskAction::Done { id } => {
            let task = service.set_task_completion(&EntityId::from(id), true)?.value;
            println!("completed {}", task.description);
        }
        TaskAction::Undone { id } => {
            let task = service.set_task_completion(&EntityId::from(id), false)?.value;
            println!("reopened {}", task.description);
        }
        TaskAction::Delete { id } => {
            confirm(yes, "The task moves to the bin.")?;
            let task = service.soft_delete_task(&EntityId::from(id))?.value;
            println!("moved {} to the bin", task.description);
        }
        TaskAction::Recover { id } => {
            let task = service.recover_task(&EntityId::from(id))?.value;
            println!("recovered {}", task.description);
        }
        TaskAction::Purge { id } => {
            confirm(yes, "The task is deleted forever.")?;
            let task = service.permanently_delete_task(&EntityId::from(id))?.value;
            println!("deleted {}", task.description);
        }
    }
    Ok(())
}

fn list<R: SnapshotRepository>(
    service: &mut LifecycleService<R>,
    project: Option<String>,
) -> Result<()> {
    let focus = match project {
        Some(id) => Some(service.select_project(&EntityId::from(id))?.id),
        None => service.resolve_focus()?,
    };

    let projects = service.active_projects()?;
    if projects.is_empty() {
        println!("no active projects");
        return Ok(());
    }
    for project in &projects {
        let marker = if focus.as_ref() == Some(&project.id) { '*' } else { ' ' };
        println!("{marker} {} ({})", project.name, project.id);
    }

    if let Some(project_id) = focus {
        println!();
        let tasks = service.active_tasks(&project_id)?;
        if tasks.is_empty() {
            println!("  no active tasks");
        }
        for task in tasks {
            println!("  [ ] {} ({})", task.description, task.id);
        }
    }
    Ok(())
}

fn show_bin<R: SnapshotRepository>(service: &LifecycleService<R>) -> Result<()> {
    println!("project bin:");
    for project in service.project_bin()? {
        println!("  {} ({})", project.name, project.id);
    }

    println!("task bin:");
    for entry in service.task_bin()? {
        let hint = if entry.recoverable { "" } else { " [recover project first]" };
        println!(
            "  {} ({}) - {}{hint}",
            entry.task.description, entry.task.id, entry.label
        );
    }
    Ok(())
}

fn confirm(yes: bool, warning: &str) -> Result<()> {
    if yes {
        return Ok(());
    }
    print!("{warning} Continue? [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    if matches!(answer.trim(), "y" | "Y" | "yes") {
        Ok(())
    } else {
        bail!("cancelled")
    }
}
