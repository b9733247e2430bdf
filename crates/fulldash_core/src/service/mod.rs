//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and the split engine into use-case APIs.
//! - Keep CLI/handler layers decoupled from storage details.

pub mod dashboard_service;
