//! Persistence contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the record-level store contract the board engine writes through.
//! - Isolate SQLite query details from board orchestration.
//!
//! # Invariants
//! - Stores never hold an in-memory copy of the board.
//! - Multi-row writes go through one transaction per batch.

pub mod board_repo;
