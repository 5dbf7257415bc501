//! Store-agnostic query model.

mod cursor;
mod filter;
mod order;

pub use cursor::Cursor;
pub use filter::{Filter, FilterOp, compare_values};
pub use order::{Direction, OrderBy};
