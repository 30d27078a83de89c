//! Generic containers used by the catalog
//!
//! [`OrderedList`] is a doubly-linked sequence with stable node handles, so
//! callers can remove an element in O(1) once they have located it.

mod ordered_list;

pub use ordered_list::{IntoIter, Iter, NodeRef, Nodes, OrderedList};
