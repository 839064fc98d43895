//! Cart rules: quantity validation, stock checks, and read-time reconciliation.
//!
//! Reconciliation is a rebuild pass, not an in-place filter. [`reconcile`]
//! consumes the user's lines and hands back two collections: the lines that
//! are still valid and the lines that must be deleted. The caller issues the
//! deletions as a separate step.
//!
//! Stock policy: cart operations only *check* item stock. Nothing in this
//! crate decrements or restores it.

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a requested line quantity. Must be strictly positive.
pub fn validate_quantity(quantity: i32) -> Result<(), CoreError> {
    if quantity <= 0 {
        return Err(CoreError::Validation(format!(
            "quantity must be greater than 0, got {quantity}"
        )));
    }
    Ok(())
}

/// Fail with [`CoreError::OutOfStock`] unless the item has stock left.
pub fn ensure_in_stock(item_id: DbId, available: i32) -> Result<(), CoreError> {
    if available <= 0 {
        return Err(CoreError::OutOfStock { item_id });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// A cart line as seen at read time, joined with its item's current stock.
pub trait StockedLine {
    /// Quantity stored on the cart line.
    fn quantity(&self) -> i32;

    /// Current available stock of the referenced item, or `None` if the item
    /// no longer exists.
    fn available(&self) -> Option<i32>;
}

/// Why a line was dropped during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// The referenced item has been removed from the catalog.
    ItemMissing,
    /// The line asks for more than the item currently has. Lines are dropped
    /// wholesale, never clamped.
    InsufficientStock { requested: i32, available: i32 },
}

/// Outcome of [`reconcile`].
#[derive(Debug)]
pub struct Reconciliation<L> {
    /// Valid lines, in input order.
    pub kept: Vec<L>,
    /// Lines to delete, in input order.
    pub evicted: Vec<(L, EvictionReason)>,
}

/// Decide whether a single line survives.
pub fn check_line<L: StockedLine>(line: &L) -> Option<EvictionReason> {
    match line.available() {
        None => Some(EvictionReason::ItemMissing),
        Some(available) if line.quantity() > available => {
            Some(EvictionReason::InsufficientStock {
                requested: line.quantity(),
                available,
            })
        }
        Some(_) => None,
    }
}

/// Split `lines` into the ones still consistent with current stock and the
/// ones to evict.
pub fn reconcile<L: StockedLine>(lines: Vec<L>) -> Reconciliation<L> {
    let mut kept = Vec::with_capacity(lines.len());
    let mut evicted = Vec::new();

    for line in lines {
        match check_line(&line) {
            None => kept.push(line),
            Some(reason) => evicted.push((line, reason)),
        }
    }

    Reconciliation { kept, evicted }
}
