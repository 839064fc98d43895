//! Domain types and rules shared by the storefront database and API crates.
//!
//! This crate has no I/O: everything here is plain data and pure functions.

pub mod cart;
pub mod error;
pub mod types;
