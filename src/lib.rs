//! An ordered map based on a red-black tree, with stable cursors.
//!
//! [`Map`](map/struct.Map.html) keeps its entries sorted by key under a comparator from the
//! `compare` crate. Besides the usual lookup and iteration methods it exposes positions as
//! [`Cursor`](struct.Cursor.html)s: copyable handles that survive every operation except the
//! erasure of the entry they refer to, and that can be walked in both directions around a
//! circular sequence closed by a past-the-end position.
//!
//! # Examples
//!
//! ```
//! let mut map = rbmap::Map::new();
//!
//! let end = map.end();
//! for (i, name) in vec!["uno", "dos", "tres", "cuatro", "cinco"].into_iter().enumerate() {
//!     map.insert_hint(end, i + 1, name);
//! }
//!
//! let three = map.find(&3);
//! assert_eq!(map.get_at(three), (&3, &"tres"));
//!
//! let four = map.erase(three);
//! assert_eq!(map.get_at(four), (&4, &"cuatro"));
//! assert_eq!(map.keys().cloned().collect::<Vec<_>>(), [1, 2, 4, 5]);
//! ```

mod balance;
mod error;
pub mod map;
mod node;

#[cfg(feature = "ordered_iter")]
mod ordered_iter;

#[cfg(feature = "quickcheck")]
mod quickcheck;

pub use error::Violation;
pub use map::Map;
pub use node::Cursor;
