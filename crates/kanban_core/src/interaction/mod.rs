//! Keyboard interaction engine.
//!
//! # Responsibility
//! - Map terminal key events to semantic actions per mode.
//! - Drive board mutations through one transition table.
//! - Expose a serializable snapshot for renderers.

pub mod action;
pub mod buffer;
pub mod keymap;
pub mod machine;
pub mod mode;
pub mod snapshot;
