//! Shopping cart module.
//!
//! Contains the cart value type, the persisted [`CartStore`], and the
//! notifications shown when an operation fails.

mod cart;
mod notice;
mod store;

pub use cart::Cart;
pub use notice::{Notice, NoticeLevel, Operation};
pub use store::{CartStore, DEFAULT_CART_KEY};
