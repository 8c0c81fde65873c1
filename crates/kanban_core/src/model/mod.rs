//! Board domain model.
//!
//! # Responsibility
//! - Define columns, tasks, focus and workspace identity.
//! - Keep ordering and ownership invariants independent of storage.
//!
//! # Invariants
//! - Positions are 0-based and contiguous within their parent.
//! - Every task is owned by exactly one column.

pub mod board;
pub mod focus;
pub mod workspace;
