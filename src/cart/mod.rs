//! Browser session state: the cart reducer, the storage subscriber that
//! mirrors it into durable client storage, and checkout total rules.
//!
//! Everything here is synchronous and free of I/O apart from the
//! [`ClientStorage`] seam, so the same code backs the frontend build and
//! the server's order validation.

mod reducer;
mod state;
mod storage;
mod totals;

pub use reducer::{CartAction, reduce};
pub use state::{CartError, CartLine, CartState, SessionState, check_stock};
pub use storage::{ClientStorage, MemoryStorage, SessionStore, keys, load_session, persist_session};
pub use totals::{
    CartGroup, CheckoutTotals, FLAT_SHIPPING_PRICE, FREE_SHIPPING_THRESHOLD, GroupKey,
    compute_totals, group_lines, round2,
};
