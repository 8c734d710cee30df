//! Core use-case services.
//!
//! # Responsibility
//! - Validate interaction-layer input before it reaches the repositories.
//! - Keep callers decoupled from table layout details.

pub mod attendance_service;
