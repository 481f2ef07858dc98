use compare::{natural, Compare};
use quickcheck_macros::quickcheck;
use rbmap::{Cursor, Map, Violation};
use simplelog::{Config, LevelFilter, TestLogger};

fn init_logging() {
    let _ = TestLogger::init(LevelFilter::Trace, Config::default());
}

fn five() -> Map<i32, &'static str> {
    let mut map = Map::new();
    map.insert(1, "uno");
    map.insert(2, "dos");
    map.insert(3, "tres");
    map.insert(4, "cuatro");
    map.insert(5, "cinco");
    map
}

fn collect(map: &Map<i32, &'static str>) -> Vec<(i32, &'static str)> {
    map.iter().map(|(&k, &v)| (k, v)).collect()
}

#[test]
fn five_elements_in_order() {
    let map = five();
    assert_eq!(map.len(), 5);
    assert!(!map.is_empty());
    assert_eq!(collect(&map),
               [(1, "uno"), (2, "dos"), (3, "tres"), (4, "cuatro"), (5, "cinco")]);
    assert_eq!(format!("{:?}", map),
               r#"{1: "uno", 2: "dos", 3: "tres", 4: "cuatro", 5: "cinco"}"#);
    assert_eq!(map.validate(), Ok(()));
}

#[test]
fn remove_by_key() {
    let mut map = five();
    assert_eq!(map.remove(&1), Some((1, "uno")));
    assert_eq!(map.len(), 4);
    assert_eq!(map.find(&1), map.end());
    assert_eq!(map.remove(&1), None);
    assert_eq!(map.len(), 4);
    assert_eq!(map.first(), Some((&2, &"dos")));
}

#[test]
fn erase_returns_next_cursor() {
    let mut map = five();

    let seven = map.insert(7, "siete");
    assert_eq!(map.erase(seven), map.end());

    let zero = map.insert(0, "cero");
    assert_eq!(map.erase(zero), map.begin());
    assert_eq!(map.get_at(map.begin()), (&1, &"uno"));

    let three = map.find(&3);
    let four = map.erase(three);
    assert_eq!(map.get_at(four), (&4, &"cuatro"));
    assert_eq!(map.len(), 4);
}

#[test]
#[should_panic(expected = "past-the-end")]
fn erase_end_panics() {
    let mut map = five();
    let end = map.end();
    map.erase(end);
}

#[test]
#[should_panic(expected = "nil cursor")]
fn nil_cursor_panics() {
    let map = five();
    map.get_at(Cursor::nil());
}

#[test]
#[should_panic(expected = "past-the-end")]
fn dereference_end_panics() {
    let map = five();
    map.get_at(map.end());
}

#[test]
fn insert_keeps_existing_value() {
    let mut map = five();
    let one = map.find(&1);
    assert_eq!(map.insert(1, "one"), one);
    assert_eq!(map[&1], "uno");
    assert_eq!(map.len(), 5);
}

#[test]
fn insert_or_assign_overwrites() {
    let mut map = five();
    let one = map.insert_or_assign(1, "diez");
    assert_eq!(map.get_at(one), (&1, &"diez"));
    assert_eq!(map.at(&1), &"diez");
    assert_eq!(map.len(), 5);

    let six = map.insert_or_assign(6, "seis");
    assert_eq!(map.get_at(six), (&6, &"seis"));
    assert_eq!(map.len(), 6);
}

#[test]
fn at_and_index() {
    let mut map = five();
    assert_eq!(map.at(&3), &"tres");
    *map.at_mut(&3) = "three";
    assert_eq!(map[&3], "three");
    *map.get_or_insert_default(9) = "nueve";
    assert_eq!(map[&9], "nueve");
    assert_eq!(*map.get_or_insert_default(10), "");
}

#[test]
#[should_panic(expected = "not in the map")]
fn at_absent_panics() {
    five().at(&42);
}

#[test]
#[should_panic(expected = "key not found")]
fn index_absent_panics() {
    let _ = five()[&42];
}

#[test]
fn lower_bound() {
    let map = five();
    assert_eq!(map.get_at(map.lower_bound(&0)), (&1, &"uno"));
    assert_eq!(map.get_at(map.lower_bound(&3)), (&3, &"tres"));
    assert_eq!(map.lower_bound(&6), map.end());

    let mut gaps = Map::new();
    for i in 0..5 { gaps.insert(i * 2, ()); }
    assert_eq!(gaps.get_at(gaps.lower_bound(&3)).0, &4);
}

#[test]
fn swap_empty_and_five() {
    let mut a = Map::new();
    let mut b = five();
    let three = b.find(&3);

    a.swap(&mut b);
    assert_eq!(a.len(), 5);
    assert!(b.is_empty());
    assert_eq!(a.get_at(three), (&3, &"tres"));
    assert_eq!(b.begin(), b.end());
    assert_eq!(a.validate(), Ok(()));
    assert_eq!(b.validate(), Ok(()));

    a.swap(&mut b);
    assert!(a.is_empty());
    assert_eq!(collect(&b).len(), 5);
}

#[test]
fn clear_then_reuse() {
    init_logging();

    let mut map = five();
    map.clear();
    assert!(map.is_empty());
    assert_eq!(map.begin(), map.end());
    assert_eq!(map.rbegin(), map.rend());
    assert_eq!(map.first(), None);

    map.insert(1, "uno");
    assert_eq!(collect(&map), [(1, "uno")]);
    assert_eq!(map.validate(), Ok(()));
}

#[test]
fn clone_is_independent() {
    init_logging();

    let map = five();
    let mut copy = map.clone();
    assert_eq!(copy, map);

    copy.insert_or_assign(1, "diez");
    copy.remove(&5);
    assert_eq!(map[&1], "uno");
    assert_eq!(map.len(), 5);
    assert_eq!(copy.len(), 4);
    assert!(copy != map);

    let mut target = Map::new();
    target.insert(100, "cien");
    target.clone_from(&map);
    assert_eq!(target, map);
}

/// A key whose `clone` panics for the value 3.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Fragile(i32);

impl Clone for Fragile {
    fn clone(&self) -> Fragile {
        if self.0 == 3 { panic!("cannot clone 3"); }
        Fragile(self.0)
    }
}

#[test]
fn panicking_clone_leaves_target_untouched() {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    let source: Map<Fragile, ()> = (1..6).map(|k| (Fragile(k), ())).collect();
    let mut target: Map<Fragile, ()> = (100..103).map(|k| (Fragile(k), ())).collect();

    assert!(catch_unwind(AssertUnwindSafe(|| target.clone_from(&source))).is_err());
    assert_eq!(target.keys().map(|k| k.0).collect::<Vec<_>>(), [100, 101, 102]);
    assert_eq!(target.validate(), Ok(()));

    assert!(catch_unwind(AssertUnwindSafe(|| source.clone())).is_err());
    assert_eq!(source.keys().map(|k| k.0).collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
    assert_eq!(source.validate(), Ok(()));
}

#[test]
fn clear_and_clone_reset_hint_misses() {
    let mut map = five();
    let begin = map.begin();
    map.insert_hint(begin, 10, "diez");
    assert_eq!(map.hint_misses(), 1);

    let mut target = Map::new();
    target.clone_from(&map);
    assert_eq!(target.hint_misses(), 0);
    assert_eq!(map.clone().hint_misses(), 0);

    map.clear();
    assert_eq!(map.hint_misses(), 0);
}

#[test]
fn reverse_traversal() {
    let map = five();
    let mut keys = vec![];
    let mut cursor = map.rbegin();

    while cursor != map.rend() {
        keys.push(*map.get_at(cursor).0);
        cursor = map.prev(cursor);
    }

    assert_eq!(keys, [5, 4, 3, 2, 1]);
    assert_eq!(map.iter().rev().map(|e| *e.0).collect::<Vec<_>>(), keys);
}

#[test]
fn cursors_wrap_around() {
    let map = five();
    assert_eq!(map.next(map.end()), map.begin());
    assert_eq!(map.prev(map.end()), map.rbegin());
    assert_eq!(map.prev(map.begin()), map.end());
    assert_eq!(map.next(map.rbegin()), map.end());

    let empty: Map<i32, ()> = Map::new();
    assert_eq!(empty.begin(), empty.end());
    assert_eq!(empty.next(empty.end()), empty.end());
    assert_eq!(empty.prev(empty.end()), empty.end());
}

#[test]
fn good_hints_never_miss() {
    let mut map = Map::new();
    let names = ["uno", "dos", "tres", "cuatro", "cinco"];

    for (i, &name) in names.iter().enumerate() {
        let end = map.end();
        map.insert_hint(end, i as i32 + 1, name);
    }

    assert_eq!(collect(&map), collect(&five()));
    assert_eq!(map.hint_misses(), 0);

    // The lower bound of a key in a gap is a correct hint too.
    map.remove(&3);
    let four = map.find(&4);
    let three = map.insert_hint(four, 3, "tres");
    assert_eq!(map.next(three), four);
    assert_eq!(map.hint_misses(), 0);

    let before_begin = map.begin();
    map.insert_hint(before_begin, 0, "cero");
    assert_eq!(map.hint_misses(), 0);
    assert_eq!(map.validate(), Ok(()));
}

#[test]
fn bad_hints_still_insert() {
    init_logging();

    let mut map = Map::new();
    let middle = map.insert(50, 0);

    for i in 0..100 {
        map.insert_hint(middle, i, i);
    }
    assert_eq!(map[&50], 0);

    let five = map.find(&5);
    map.insert_or_assign_hint(five, 50, -50);
    map.insert_hint(Cursor::nil(), 1000, 1000);

    assert_eq!(map.len(), 101);
    assert_eq!(map[&50], -50);
    assert!(map.hint_misses() > 0);
    assert_eq!(map.validate(), Ok(()));
    assert!(map.keys().zip(map.keys().skip(1)).all(|(a, b)| a < b));
}

#[test]
#[should_panic]
fn stale_cursor_panics() {
    let mut map = five();
    let three = map.find(&3);
    map.erase(three);
    map.get_at(three);
}

#[test]
fn cursors_survive_rebalancing() {
    let mut map = Map::new();
    let cursors: Vec<_> = (0..256).map(|i| (i, map.insert(i, i * 3))).collect();

    for i in (0..256).filter(|i| i % 3 == 1) { map.remove(&i); }
    for i in 256..512 { map.insert(i, i * 3); }

    for (i, cursor) in cursors.into_iter().filter(|&(i, _)| i % 3 != 1) {
        assert_eq!(map.get_at(cursor), (&i, &(i * 3)));
    }
    assert_eq!(map.validate(), Ok(()));
}

#[test]
fn entry_api() {
    use rbmap::map::Entry;

    let mut map = five();

    match map.entry(2) {
        Entry::Occupied(mut e) => {
            assert_eq!(e.key(), &2);
            assert_eq!(e.insert("two"), "dos");
        }
        Entry::Vacant(_) => panic!("2 is in the map"),
    }

    match map.entry(6) {
        Entry::Vacant(e) => { *e.insert("seis") = "six"; }
        Entry::Occupied(_) => panic!("6 is not in the map"),
    }

    assert_eq!(map[&2], "two");
    assert_eq!(map[&6], "six");

    if let Entry::Occupied(e) = map.entry(4) { assert_eq!(e.remove(), (4, "cuatro")); }
    assert!(!map.contains_key(&4));
    assert_eq!(*map.entry(7).or_insert_with(|| "siete"), "siete");
    assert_eq!(map.validate(), Ok(()));
}

#[test]
fn pop_first_and_last() {
    let mut map = five();
    assert_eq!(map.pop_first(), Some((1, "uno")));
    assert_eq!(map.pop_last(), Some((5, "cinco")));
    assert_eq!(map.first(), Some((&2, &"dos")));
    assert_eq!(map.last(), Some((&4, &"cuatro")));
    assert_eq!(map.get_at(map.rbegin()), (&4, &"cuatro"));
}

#[test]
fn values_mut_and_keys() {
    let mut map: Map<_, _> = (1..6).map(|i| (i, i * 10)).collect();
    for v in map.values_mut() { *v += 1; }
    assert_eq!(map.values().cloned().collect::<Vec<_>>(), [11, 21, 31, 41, 51]);
    assert_eq!(map.keys().rev().cloned().collect::<Vec<_>>(), [5, 4, 3, 2, 1]);
}

#[test]
fn custom_comparator() {
    let mut map = Map::with_cmp(natural().rev());
    map.extend(vec![(1, "uno"), (3, "tres"), (2, "dos")]);

    assert_eq!(map.keys().cloned().collect::<Vec<_>>(), [3, 2, 1]);
    assert_eq!(map.get_at(map.lower_bound(&4)), (&3, &"tres"));
    assert_eq!(map.lower_bound(&0), map.end());
    assert!(map.cmp().compares_lt(&3, &1));
    assert_eq!(map.validate(), Ok(()));
}

#[test]
fn case_insensitive_equivalence() {
    let cmp = |l: &String, r: &String| l.to_lowercase().cmp(&r.to_lowercase());
    let mut map = Map::with_cmp(cmp);

    map.insert("Hello".to_string(), 1);
    map.insert("HELLO".to_string(), 2);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get_at(map.begin()), (&"Hello".to_string(), &1));

    map.insert_or_assign("hello".to_string(), 3);
    assert_eq!(map.get_at(map.begin()), (&"Hello".to_string(), &3));
}

#[test]
fn comparisons() {
    let a = five();
    let mut b = five();
    assert_eq!(a, b);
    assert_eq!(a.partial_cmp(&b), Some(std::cmp::Ordering::Equal));

    b.insert_or_assign(5, "zzz");
    assert!(a < b);

    b.remove(&5);
    assert!(b < a);
}

#[test]
fn violation_display() {
    let violation = Violation::BlackHeight { node: 3, left: 1, right: 2 };
    assert_eq!(violation.to_string(), "node 3 has black heights 1 (left) and 2 (right)");

    let error: Box<dyn std::error::Error> = Box::new(Violation::RedRoot);
    assert_eq!(error.to_string(), "root is red");
}

#[quickcheck]
fn len_matches_traversal(keys: Vec<u16>) -> bool {
    let mut map = Map::new();
    for k in keys { map.insert(k, ()); }

    let mut count = 0;
    let mut cursor = map.begin();
    while cursor != map.end() {
        count += 1;
        cursor = map.next(cursor);
    }

    count == map.len()
}

#[quickcheck]
fn removing_twice_returns_none(keys: Vec<u8>, key: u8) -> bool {
    let mut map: Map<u8, ()> = keys.into_iter().map(|k| (k, ())).collect();
    let present = map.contains_key(&key);
    map.remove(&key).is_some() == present && map.remove(&key).is_none()
}
