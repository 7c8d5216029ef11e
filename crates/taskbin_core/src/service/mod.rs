//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate snapshot load/replace into lifecycle and transfer APIs.
//! - Keep presentation layers decoupled from storage details.
//!
//! # See also
//! - `transitions` for the pure state rules every service call runs.

pub mod error;
pub mod lifecycle_service;
pub mod session;
pub mod transfer;
pub mod transitions;
pub mod views;
