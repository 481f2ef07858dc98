use ::quickcheck::{quickcheck, Arbitrary, Gen, TestResult};
use super::{Color, Tree, HEADER, LEFT, RIGHT};
use crate::Map;

/// An operation on a `Map`.
#[derive(Clone, Debug)]
enum Op<K> where K: Clone + Ord {
    /// Insert a key into the map.
    Insert(K),
    /// Insert a key into the map, hinting at the entry at index `n % (map.len() + 1)`.
    InsertHint(K, usize),
    /// Remove the key at index `n % map.len()` from the map.
    Remove(usize),
}

impl<K> Arbitrary for Op<K> where K: Arbitrary + Ord {
    fn arbitrary(gen: &mut Gen) -> Op<K> {
        match u8::arbitrary(gen) % 3 {
            0 => Op::Insert(K::arbitrary(gen)),
            1 => Op::InsertHint(K::arbitrary(gen), usize::arbitrary(gen)),
            _ => Op::Remove(usize::arbitrary(gen)),
        }
    }
}

impl<K> Op<K> where K: Clone + Ord {
    /// Perform the operation on the given map.
    fn exec(self, map: &mut Map<K, ()>) {
        match self {
            Op::Insert(key) => { map.insert(key, ()); }
            Op::InsertHint(key, index) => {
                let mut hint = map.begin();
                for _ in 0..index % (map.len() + 1) { hint = map.next(hint); }
                map.insert_hint(hint, key, ());
            }
            Op::Remove(index) => if !map.is_empty() {
                let key = map.iter().nth(index % map.len()).unwrap().0.clone();
                map.remove(&key);
            },
        }
    }
}

/// Checks the red-black invariants by walking the links directly, and returns the black height.
fn assert_red_black<K, V>(tree: &Tree<K, V>) -> usize where K: Ord {
    fn check<K, V>(tree: &Tree<K, V>, id: Option<usize>, parent: usize) -> usize where K: Ord {
        let id = match id {
            None => return 0,
            Some(id) => id,
        };

        let node = tree.node(id);
        assert_eq!(node.parent, Some(parent));
        assert!(node.color != Color::Header);

        if node.color == Color::Red {
            assert!(!tree.is_red(node.child[LEFT]));
            assert!(!tree.is_red(node.child[RIGHT]));
        }

        if let Some(left) = node.child[LEFT] { assert!(tree.node(left).key() < node.key()); }
        if let Some(right) = node.child[RIGHT] { assert!(tree.node(right).key() > node.key()); }

        let left = check(tree, node.child[LEFT], id);
        let right = check(tree, node.child[RIGHT], id);
        assert_eq!(left, right);
        left + if node.color == Color::Black { 1 } else { 0 }
    }

    match tree.root() {
        None => 0,
        Some(root) => {
            assert_eq!(tree.node(root).color, Color::Black);
            check(tree, Some(root), HEADER)
        }
    }
}

/// Checks that stepping forward and backward around the header visits every entry in order.
fn assert_circular<K, V>(tree: &Tree<K, V>) where K: Ord {
    let ids = tree.ordered_ids();
    assert_eq!(ids.len(), tree.len());

    for pair in ids.windows(2) {
        assert!(tree.node(pair[0]).key() < tree.node(pair[1]).key());
        assert_eq!(tree.predecessor(pair[1]), pair[0]);
    }

    assert_eq!(tree.successor(HEADER), ids.first().cloned().unwrap_or(HEADER));
    assert_eq!(tree.predecessor(HEADER), ids.last().cloned().unwrap_or(HEADER));
    if let Some(&first) = ids.first() { assert_eq!(tree.predecessor(first), HEADER); }
}

#[test]
fn test_red_black() {
    fn check(ops: Vec<Op<u8>>) -> TestResult {
        let mut map = Map::new();
        for op in ops { op.exec(&mut map); }
        assert_red_black(map.tree());
        assert_circular(map.tree());
        assert_eq!(map.validate(), Ok(()));
        TestResult::passed()
    }

    quickcheck(check as fn(_) -> _);
}

#[test]
fn test_black_height_is_logarithmic() {
    let mut map = Map::new();
    for i in 0..1024u32 { map.insert(i, ()); }

    // A red-black tree with n nodes has a black height of at most log2(n + 1).
    assert!(assert_red_black(map.tree()) <= 10);
    for i in (0..1024u32).filter(|i| i % 2 == 0) { map.remove(&i); }
    assert!(assert_red_black(map.tree()) <= 9);
}

#[test]
fn test_empty_header() {
    let mut map = Map::new();
    assert_eq!(map.tree().first(), HEADER);
    assert_eq!(map.tree().last(), HEADER);
    assert_eq!(map.tree().successor(HEADER), HEADER);

    map.insert(1, ());
    map.remove(&1);
    assert_eq!(map.tree().root(), None);
    assert_eq!(map.tree().first(), HEADER);
    assert_eq!(map.tree().last(), HEADER);
    assert_eq!(map.validate(), Ok(()));
}

#[test]
fn test_search_hinted() {
    let map: Map<u32, ()> = (0..10).map(|i| (i * 10, ())).collect();
    let tree = map.tree();
    let cmp = map.cmp();

    let thirty = tree.find(cmp, &30);
    assert_eq!(tree.search_hinted(cmp, thirty, &30), Some(Ok(thirty)));
    assert_eq!(tree.search_hinted(cmp, thirty, &31), None);
    assert_eq!(tree.search_hinted(cmp, thirty, &19), None);

    let twenty = tree.find(cmp, &20);
    assert_eq!(tree.search_hinted(cmp, thirty, &20), Some(Ok(twenty)));

    match tree.search_hinted(cmp, thirty, &25) {
        Some(Err((parent, _))) => assert!(parent == thirty || parent == twenty),
        other => panic!("unexpected slot {:?}", other),
    }

    let first = tree.first();
    assert_eq!(tree.search_hinted(cmp, first, &0), Some(Ok(first)));
    assert!(tree.search_hinted(cmp, HEADER, &1000).is_some());
    assert_eq!(tree.search_hinted(cmp, HEADER, &50), None);
}
