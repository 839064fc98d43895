//! Service layer between HTTP handlers and repositories.
//!
//! - [`cart_manager::CartManager`] -- cart add / read / update / remove.
//! - [`user_directory::UserDirectory`] -- accounts and authentication.
//!
//! Domain failures are raised here as [`storefront_core::error::CoreError`]
//! and travel unchanged to the HTTP boundary.

pub mod cart_manager;
pub mod user_directory;

pub use cart_manager::CartManager;
pub use user_directory::UserDirectory;
