//! A hash map which remembers the order its keys were first inserted in.
//!
//! [`OrderedMap`] pairs a `HashMap` with a `Vec` of its keys, so an entry
//! can be found by key in O(1) or by its position in insertion order.
//! Updating a key's value leaves it where it is; removing a key shifts
//! everything after it down by one.
//!
//! With the `shared_map` feature (on by default), [`SharedOrderedMap`]
//! wraps one behind a lock so it can be handed out to several threads.
//!
//! ```
//! use ordered_table::OrderedMap;
//!
//! let mut map = OrderedMap::new();
//! map.insert("a", 1);
//! map.insert("b", 2);
//! map.insert("a", 3);
//! map.remove("b");
//!
//! assert_eq!(vec![&"a"], map.keys().collect::<Vec<_>>());
//! assert_eq!(Some(&3), map.get("a"));
//! assert_eq!(Some(0), map.index_of("a"));
//! assert!(map.element_at(1).is_err());
//! ```

pub mod error;
pub mod ordered_map;
#[cfg(feature = "shared_map")]
pub mod shared_map;

pub use error::{OrderedMapError, Result};
pub use ordered_map::{Iter, Keys, OrderedMap, Values};
#[cfg(feature = "shared_map")]
pub use shared_map::SharedOrderedMap;
