//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Methods that take part in a multi-statement transaction accept any
//! [`sqlx::PgExecutor`], so they work against `&PgPool` and `&mut *tx` alike;
//! the rest take `&PgPool` directly.

pub mod cart_repo;
pub mod item_repo;
pub mod user_repo;

pub use cart_repo::CartRepo;
pub use item_repo::ItemRepo;
pub use user_repo::UserRepo;
