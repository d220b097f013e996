use powerlist::{Cursor, PowerList};

#[test]
fn test_empty_list() {
    let mut list = PowerList::<i32>::new();
    assert!(!list.remove(&123));
    assert!(list.is_empty());
    assert_eq!(list.len(), 0);
    assert!(!list.contains(&0));
    assert_eq!(list.front(), None);
    assert_eq!(list.back(), None);
    assert!(list.find(&0).is_end());
    assert_eq!(list.pop_front(), None);
}

#[test]
fn test_construction_from_range() {
    let list = PowerList::from_sorted(-2..2).unwrap();
    for value in -2..2 {
        assert!(list.contains(&value), "value {value} not found");
    }
    assert_eq!(list.len(), 4);
    assert!(!list.needs_rebalance());
}

#[test]
fn test_construction_rejects_unsorted_input() {
    let err = PowerList::from_sorted([1, 2, 5, 3, 4]).unwrap_err();
    assert_eq!(err.index(), 3);
    assert_eq!(
        err.to_string(),
        "input is not sorted: element 3 is less than its predecessor"
    );
}

#[test]
fn test_copy_construction() {
    let list = PowerList::from_sorted(-2..2).unwrap();
    let copy = list.clone();
    assert_eq!(list, copy);
    assert_eq!(list, list);
}

#[test]
fn test_insert_empty() {
    let mut list = PowerList::new();
    list.insert(23);
    assert!(list.contains(&23));
    assert_eq!(list.front(), Some(&23));
    assert_eq!(list.back(), Some(&23));
}

#[test]
fn test_insert_before_head() {
    let mut list = PowerList::new();
    list.insert(23);
    list.insert(22);
    assert!(list.contains(&23));
    assert!(list.contains(&22));
    assert_eq!(list.front(), Some(&22));
}

#[test]
fn test_insert_after_tail() {
    let mut list = PowerList::new();
    list.insert(23);
    list.insert(24);
    assert!(list.contains(&23));
    assert_eq!(list.back(), Some(&24));
}

#[test]
fn test_insert_in_middle() {
    let mut list = PowerList::new();
    list.insert(22);
    list.insert(24);
    list.insert(23);
    assert!(list.contains(&23));
    assert_eq!(list.iter().copied().collect::<Vec<_>>(), [22, 23, 24]);
}

#[test]
fn test_insert_remove_insert() {
    let mut list = PowerList::new();
    list.insert(23);
    assert!(list.remove(&23));
    list.insert(24);
    assert!(!list.contains(&23));
    assert!(list.contains(&24));
}

#[test]
fn test_assign_range() {
    let mut list = PowerList::from_sorted(-2..2).unwrap();
    list.assign_range(0..4).unwrap();
    list.assign_range(4..8).unwrap();
    assert_eq!(list.len(), 4);
    for value in 4..8 {
        assert!(list.contains(&value));
    }
    assert!(!list.contains(&0));
}

#[test]
fn test_assign_range_error_keeps_contents() {
    let mut list = PowerList::from_sorted([1, 2, 3]).unwrap();
    assert!(list.assign_range([9, 8]).is_err());
    assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);

    list.assign_range(std::iter::empty()).unwrap();
    assert!(list.is_empty());
}

#[test]
fn test_remove_from_empty() {
    let mut list = PowerList::new();
    assert!(!list.remove(&23));
    assert!(list.is_empty());
}

#[test]
fn test_remove_one() {
    let mut list = PowerList::from_sorted(0..1).unwrap();
    assert!(list.remove(&0));
    assert!(list.is_empty());
}

#[test]
fn test_remove_head() {
    let mut list = PowerList::from_sorted(0..8).unwrap();
    assert!(list.remove(&0));
    for value in 1..8 {
        assert!(list.contains(&value));
    }
    assert_eq!(list.len(), 7);
    assert_eq!(list.front(), Some(&1));
}

#[test]
fn test_remove_tail() {
    let mut list = PowerList::from_sorted(0..8).unwrap();
    assert!(list.remove(&7));
    for value in 0..7 {
        assert!(list.contains(&value));
    }
    assert_eq!(list.len(), 7);
    assert_eq!(list.back(), Some(&6));
}

#[test]
fn test_remove_middle() {
    let mut list = PowerList::from_sorted(0..8).unwrap();
    for value in 1..7 {
        assert!(list.remove(&value));
    }
    let found = (0..8).filter(|value| list.contains(value)).count();
    assert_eq!(found, 2);
    assert_eq!(list.len(), 2);
    assert_eq!(list.iter().copied().collect::<Vec<_>>(), [0, 7]);
}

#[test]
fn test_remove_twice_is_noop() {
    let mut list = PowerList::from_sorted([1, 2, 3]).unwrap();
    assert!(list.remove(&2));
    assert!(!list.remove(&2));
    assert_eq!(list.len(), 2);
}

#[test]
fn test_explicit_rebalance() {
    let mut list = PowerList::new();
    for value in -20..20 {
        list.insert(value);
    }
    assert!(list.needs_rebalance());
    list.rebalance();
    assert!(!list.needs_rebalance());
    assert!(list.contains(&1));
}

#[test]
fn test_rebalancing_iteration() {
    let mut list = PowerList::new();
    for value in -10..20 {
        list.insert(value);
    }
    let sum: i32 = list.rebalancing_iter().sum();
    assert!(sum > 0);
    assert!(!list.needs_rebalance());
    assert!(list.contains(&1));
}

#[test]
fn test_comparison() {
    let list1 = PowerList::from_sorted(0..20).unwrap();
    let list2 = PowerList::from_sorted(0..20).unwrap();
    assert_eq!(list1, list2);

    let mut list3 = PowerList::new();
    for value in 0..20 {
        list3.insert(value);
    }
    assert_eq!(list1, list3);

    list3.insert(20);
    assert_ne!(list1, list3);
}

#[test]
fn test_cursor_navigation() {
    let list = PowerList::from_sorted([10, 20, 30]).unwrap();

    let cursor = list.lower_bound(&15);
    assert_eq!(list[cursor], 20);
    let cursor = list.successor(cursor);
    assert_eq!(list.get(cursor), Some(&30));
    let cursor = list.successor(cursor);
    assert!(cursor.is_end());
    assert_eq!(cursor, Cursor::end());
    assert!(list.successor(cursor).is_end());

    assert!(list.lower_bound(&31).is_end());
    assert_eq!(list.lower_bound(&10), list.find(&10));
    assert!(list.find(&15).is_end());
}

#[test]
#[should_panic(expected = "end or stale cursor")]
fn test_index_end_cursor_panics() {
    let list = PowerList::from_sorted([1]).unwrap();
    let _value = list[Cursor::end()];
}

#[test]
fn test_erase_through_cursor() {
    let mut list = PowerList::from_sorted([1, 2, 3, 4]).unwrap();
    let cursor = list.find(&3);
    assert_eq!(list.erase(cursor), Some(3));
    assert_eq!(list.erase(Cursor::end()), None);
    assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 2, 4]);
    assert_eq!(list.back(), Some(&4));
}

#[test]
fn test_collect_and_extend() {
    let mut list: PowerList<i32> = [5, 3, 9, 1].into_iter().collect();
    assert!(!list.needs_rebalance());
    list.extend([4, 0, 10]);
    assert_eq!(list.iter().copied().collect::<Vec<_>>(), [0, 1, 3, 4, 5, 9, 10]);
    assert_eq!(list.iter().len(), 7);

    let owned: Vec<i32> = list.into_iter().collect();
    assert_eq!(owned, [0, 1, 3, 4, 5, 9, 10]);
}

#[test]
fn test_round_trip_regardless_of_rebalance() {
    let values: Vec<u32> = (0..100).map(|v| v * 3).collect();
    let mut list = PowerList::from_sorted(values.clone()).unwrap();
    assert_eq!(list.iter().copied().collect::<Vec<_>>(), values);

    list.insert(1);
    list.remove(&1);
    assert!(list.needs_rebalance());
    assert_eq!(list.iter().copied().collect::<Vec<_>>(), values);
    list.rebalance();
    assert_eq!(list.iter().copied().collect::<Vec<_>>(), values);
}

#[test]
fn test_debug_format() {
    let list = PowerList::from_sorted([1, 2, 3]).unwrap();
    assert_eq!(format!("{list:?}"), "[1, 2, 3]");
}

#[test]
fn test_take_leaves_empty_list() {
    let mut list = PowerList::from_sorted([1, 2]).unwrap();
    let moved = std::mem::take(&mut list);
    assert!(list.is_empty());
    assert_eq!(moved.len(), 2);
}
