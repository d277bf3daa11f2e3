//! Domain logic for the data marketplace backend.
//!
//! Pure, I/O-free building blocks shared by the db and api crates:
//! the DDA status state machine, notification payload validation, the
//! catalogue search matcher, and the offset/limit pagination contract.

pub mod dda;
pub mod error;
pub mod notification;
pub mod pagination;
pub mod search;
pub mod types;
