//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into board-level operations.
//! - Keep interaction and CLI layers decoupled from storage details.

pub mod board_service;
