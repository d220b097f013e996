//! `proptest` strategies for generating power lists.
//!
//! Available with the `proptest` feature.

use core::fmt::Debug;
use core::ops::Range;

use proptest::collection::vec;
use proptest::prelude::*;

use crate::PowerList;

/// Generates balanced lists built from `element` values, with a length in `size`.
pub fn power_list<S>(element: S, size: Range<usize>) -> impl Strategy<Value = PowerList<S::Value>>
where
    S: Strategy,
    S::Value: Ord + Clone + Debug,
{
    vec(element, size).prop_map(|values| values.into_iter().collect::<PowerList<_>>())
}

/// Generates lists whose skip links are stale: values are inserted one at a time in
/// generation order and never rebalanced.
pub fn dirty_power_list<S>(element: S, size: Range<usize>) -> impl Strategy<Value = PowerList<S::Value>>
where
    S: Strategy,
    S::Value: Ord + Clone + Debug,
{
    vec(element, size).prop_map(|values| {
        let mut list = PowerList::new();
        list.extend(values);
        list
    })
}
