//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep CLI and admin callers decoupled from storage details.

pub mod bootstrap;
pub mod content_service;
