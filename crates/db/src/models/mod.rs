//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Response or view types where the row must not be exposed as-is

pub mod cart;
pub mod item;
pub mod user;
