//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize`/plain create DTOs for inserts
//!
//! Wire serialization uses camelCase field names per the public API
//! contract; columns stay snake_case.

pub mod b2b_connection;
pub mod dda_record;
pub mod dda_template;
pub mod organisation;
