//! An ordered map based on a red-black tree.

use compare::{Compare, Natural};
use log::{debug, trace};
use std::cmp::Ordering;
use std::cmp::Ordering::*;
use std::fmt::{self, Debug};
use std::hash::{self, Hash};
use std::iter;
use std::mem;
use std::ops;
use std::vec;
use super::error::Violation;
use super::node::{self, Cursor, NodeId, Slot, Tree, HEADER};

/// An ordered map based on a red-black tree.
///
/// Keys are ordered by a comparator, and two keys are considered the same key when the
/// comparator finds neither less than the other. The map never holds two such keys.
///
/// Positions in the map are exposed as [`Cursor`](struct.Cursor.html)s. A cursor stays valid
/// until the entry it refers to is erased; no other operation, including rebalancing, moves an
/// entry to a different position.
///
/// The behavior of this map is unspecified if a key's ordering relative to any other key changes
/// while the key is in the map. This is normally only possible through `Cell`, `RefCell`, or
/// unsafe code.
pub struct Map<K, V, C = Natural<K>> where C: Compare<K> {
    tree: Tree<K, V>,
    cmp: C,
    hint_misses: usize,
}

impl<K, V> Map<K, V> where K: Ord {
    /// Creates an empty map ordered according to the natural order of its keys.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut it = map.iter();
    /// assert_eq!(it.next(), Some((&1, &"a")));
    /// assert_eq!(it.next(), Some((&2, &"b")));
    /// assert_eq!(it.next(), Some((&3, &"c")));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn new() -> Self { Map::with_cmp(compare::natural()) }
}

impl<K, V, C> Map<K, V, C> where C: Compare<K> {
    /// Creates an empty map ordered according to the given comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// use compare::{Compare, natural};
    ///
    /// let mut map = rbmap::Map::with_cmp(natural().rev());
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut it = map.iter();
    /// assert_eq!(it.next(), Some((&3, &"c")));
    /// assert_eq!(it.next(), Some((&2, &"b")));
    /// assert_eq!(it.next(), Some((&1, &"a")));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn with_cmp(cmp: C) -> Self {
        Map { tree: Tree::new(), cmp: cmp, hint_misses: 0 }
    }

    /// Creates a map ordered according to the given comparator from a sequence of entries.
    ///
    /// Each entry is inserted with the past-the-end position as its hint, so a sequence that is
    /// already sorted is built in linear time. When a key appears more than once, the first
    /// occurrence wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use compare::{Compare, natural};
    ///
    /// let map = rbmap::Map::from_iter_with_cmp(vec![(1, "a"), (2, "b"), (1, "c")],
    ///                                          natural().rev());
    /// assert_eq!(map.iter().collect::<Vec<_>>(), [(&2, &"b"), (&1, &"a")]);
    /// ```
    pub fn from_iter_with_cmp<I>(it: I, cmp: C) -> Self where I: IntoIterator<Item=(K, V)> {
        let mut map = Map::with_cmp(cmp);
        map.extend(it);
        map
    }

    /// Checks if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    /// assert!(map.is_empty());
    ///
    /// map.insert(2, "b");
    /// assert!(!map.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool { self.tree.is_empty() }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    /// assert_eq!(map.len(), 0);
    ///
    /// map.insert(2, "b");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize { self.tree.len() }

    /// Returns a reference to the map's comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// use compare::{Compare, natural};
    ///
    /// let map: rbmap::Map<i32, &str> = rbmap::Map::new();
    /// assert!(map.cmp().compares_lt(&1, &2));
    ///
    /// let map: rbmap::Map<i32, &str, _> = rbmap::Map::with_cmp(natural().rev());
    /// assert!(map.cmp().compares_gt(&1, &2));
    /// ```
    pub fn cmp(&self) -> &C { &self.cmp }

    /// Returns the number of hinted insertions whose hint was not the lower bound of the
    /// inserted key and which therefore fell back to a full search.
    ///
    /// The count starts at zero when the map is created, cloned or cleared.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    ///
    /// let end = map.end();
    /// let one = map.insert_hint(end, 1, "a");
    /// map.insert_hint(one, 0, "z");
    /// assert_eq!(map.hint_misses(), 0);
    ///
    /// map.insert_hint(one, 2, "b");
    /// assert_eq!(map.hint_misses(), 1);
    /// ```
    pub fn hint_misses(&self) -> usize { self.hint_misses }

    /// Removes all entries from the map.
    ///
    /// Every cursor into the map except the past-the-end cursor is invalidated, and the
    /// [`hint_misses`](#method.hint_misses) counter starts over from zero.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.len(), 3);
    /// assert_eq!(map.iter().next(), Some((&1, &"a")));
    ///
    /// map.clear();
    ///
    /// assert_eq!(map.len(), 0);
    /// assert_eq!(map.iter().next(), None);
    /// ```
    pub fn clear(&mut self) {
        if !self.is_empty() { debug!("clearing map of {} entries", self.len()); }
        self.tree.clear();
        self.hint_misses = 0;
    }

    /// Swaps the contents of two maps, including their comparators, in constant time.
    ///
    /// Cursors to entries follow their entries into the other map. The past-the-end cursor is
    /// the same value for every map, so it keeps denoting the end of whichever map it is used
    /// with.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut a = rbmap::Map::new();
    /// let mut b = rbmap::Map::new();
    ///
    /// a.insert(1, "a");
    /// a.insert(2, "b");
    ///
    /// a.swap(&mut b);
    ///
    /// assert!(a.is_empty());
    /// assert_eq!(b.len(), 2);
    /// assert_eq!(b.at(&2), &"b");
    /// ```
    pub fn swap(&mut self, other: &mut Self) { mem::swap(self, other); }

    fn locate(&mut self, hint: Option<Cursor>, key: &K) -> Slot {
        if let Some(hint) = hint {
            let slot = hint.node().and_then(|id| self.tree.search_hinted(&self.cmp, id, key));
            if let Some(slot) = slot { return slot; }

            self.hint_misses += 1;
            trace!("insertion hint {:?} missed, falling back to a full search", hint);
        }

        self.tree.search(&self.cmp, key)
    }

    fn insert_at(&mut self, slot: Slot, key: K, value: V, assign: bool) -> Cursor {
        match slot {
            Ok(id) => {
                if assign { *self.tree.node_mut(id).key_value_mut().1 = value; }
                Cursor::at(id)
            }
            Err((parent, dir)) => Cursor::at(self.tree.attach(parent, dir, key, value)),
        }
    }

    /// Inserts an entry into the map unless the map already contains an equivalent key, and
    /// returns a cursor to the entry with that key.
    ///
    /// An existing entry is left untouched, and the given key and value are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    ///
    /// let one = map.insert(1, "a");
    /// assert_eq!(map.get_at(one), (&1, &"a"));
    ///
    /// assert_eq!(map.insert(1, "b"), one);
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Cursor {
        let slot = self.locate(None, &key);
        self.insert_at(slot, key, value, false)
    }

    /// Inserts an entry into the map as `insert` does, using `hint` to find its position.
    ///
    /// `hint` should be the position of the first entry whose key is not less than `key`, or
    /// the past-the-end position if there is none. Such a hint is verified with at most two
    /// comparisons, which makes inserting a sorted sequence at `end()` take amortized constant
    /// time per entry. Any other hint, including a nil cursor, is harmless: the insertion falls
    /// back to a full search and is counted by [`hint_misses`](#method.hint_misses).
    ///
    /// # Panics
    ///
    /// Panics if `hint` refers to an erased entry.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    ///
    /// for i in 0..10 {
    ///     let end = map.end();
    ///     map.insert_hint(end, i, i * 2);
    /// }
    ///
    /// assert_eq!(map.len(), 10);
    /// assert_eq!(map.hint_misses(), 0);
    ///
    /// let five = map.find(&5);
    /// map.insert_hint(five, 5, 0);
    /// assert_eq!(map[&5], 10);
    /// ```
    pub fn insert_hint(&mut self, hint: Cursor, key: K, value: V) -> Cursor {
        let slot = self.locate(Some(hint), &key);
        self.insert_at(slot, key, value, false)
    }

    /// Inserts an entry into the map, overwriting the value of an existing entry with an
    /// equivalent key, and returns a cursor to the entry.
    ///
    /// When the key is already present, the stored key is kept and the given one is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    ///
    /// map.insert(1, "uno");
    /// let one = map.insert_or_assign(1, "diez");
    ///
    /// assert_eq!(map.get_at(one), (&1, &"diez"));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Cursor {
        let slot = self.locate(None, &key);
        self.insert_at(slot, key, value, true)
    }

    /// Inserts or assigns an entry as `insert_or_assign` does, using `hint` as `insert_hint`
    /// does.
    ///
    /// # Panics
    ///
    /// Panics if `hint` refers to an erased entry.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    ///
    /// let one = map.insert(1, "uno");
    /// map.insert_or_assign_hint(one, 1, "diez");
    /// assert_eq!(map[&1], "diez");
    ///
    /// let begin = map.begin();
    /// map.insert_or_assign_hint(begin, 7, "siete");
    /// assert_eq!(map[&7], "siete");
    /// assert_eq!(map.hint_misses(), 1);
    /// ```
    pub fn insert_or_assign_hint(&mut self, hint: Cursor, key: K, value: V) -> Cursor {
        let slot = self.locate(Some(hint), &key);
        self.insert_at(slot, key, value, true)
    }

    /// Removes the entry at the given position and returns it, together with a cursor to the
    /// entry that followed it.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is nil, is the past-the-end position, or refers to an erased entry.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    ///
    /// map.insert(1, "a");
    /// let two = map.insert(2, "b");
    /// let three = map.insert(3, "c");
    ///
    /// assert_eq!(map.remove_at(two), ((2, "b"), three));
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn remove_at(&mut self, cursor: Cursor) -> ((K, V), Cursor) {
        let id = cursor.expect_node();
        assert!(id != HEADER, "attempted to erase the past-the-end position");

        // Removal relinks nodes rather than moving entries, so the successor keeps its slot.
        let next = self.tree.successor(id);
        let key_value = self.tree.detach(id);
        (key_value, Cursor::at(next))
    }

    /// Removes the entry at the given position and returns a cursor to the entry that followed
    /// it, or the past-the-end position if it was the last entry.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is nil, is the past-the-end position, or refers to an erased entry.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    ///
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// let seven = map.insert(7, "g");
    /// assert_eq!(map.erase(seven), map.end());
    ///
    /// let zero = map.insert(0, "z");
    /// assert_eq!(map.erase(zero), map.begin());
    /// ```
    pub fn erase(&mut self, cursor: Cursor) -> Cursor { self.remove_at(cursor).1 }

    /// Removes and returns the entry whose key is equivalent to the given key, returning
    /// `None` if the map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.len(), 3);
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.remove(&1), Some((1, "a")));
    ///
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.get(&1), None);
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q: ?Sized>(&mut self, key: &Q) -> Option<(K, V)> where C: Compare<Q, K> {
        match self.tree.find(&self.cmp, key) {
            HEADER => None,
            id => Some(self.tree.detach(id)),
        }
    }

    /// Removes the map's minimum key and returns it and its associated value, or `None` if the
    /// map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    /// assert_eq!(map.pop_first(), None);
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.pop_first(), Some((1, "a")));
    /// ```
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        match self.tree.first() {
            HEADER => None,
            id => Some(self.tree.detach(id)),
        }
    }

    /// Removes the map's maximum key and returns it and its associated value, or `None` if the
    /// map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    /// assert_eq!(map.pop_last(), None);
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.pop_last(), Some((3, "c")));
    /// ```
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        match self.tree.last() {
            HEADER => None,
            id => Some(self.tree.detach(id)),
        }
    }

    /// Returns the map's entry corresponding to the given key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut counts = rbmap::Map::new();
    ///
    /// for s in vec!["a", "b", "a", "c", "a", "b"] {
    ///     *counts.entry(s).or_insert(0) += 1;
    /// }
    ///
    /// assert_eq!(counts[&"a"], 3);
    /// assert_eq!(counts[&"b"], 2);
    /// assert_eq!(counts[&"c"], 1);
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        match self.tree.search(&self.cmp, &key) {
            Ok(id) => Entry::Occupied(OccupiedEntry { tree: &mut self.tree, node: id }),
            Err((parent, dir)) => Entry::Vacant(VacantEntry {
                tree: &mut self.tree,
                key: key,
                parent: parent,
                dir: dir,
            }),
        }
    }

    /// Checks if the map contains the given key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    /// assert!(!map.contains_key(&1));
    /// map.insert(1, "a");
    /// assert!(map.contains_key(&1));
    /// ```
    pub fn contains_key<Q: ?Sized>(&self, key: &Q) -> bool where C: Compare<Q, K> {
        self.tree.find(&self.cmp, key) != HEADER
    }

    /// Returns a reference to the value associated with the given key, or `None` if the
    /// map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    /// assert_eq!(map.get(&1), None);
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// ```
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&V> where C: Compare<Q, K> {
        match self.tree.find(&self.cmp, key) {
            HEADER => None,
            id => Some(self.tree.node(id).key_value().1),
        }
    }

    /// Returns a mutable reference to the value associated with the given key, or `None`
    /// if the map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    /// assert_eq!(map.get(&1), None);
    /// map.insert(1, "a");
    ///
    /// {
    ///     let value = map.get_mut(&1).unwrap();
    ///     assert_eq!(*value, "a");
    ///     *value = "b";
    /// }
    ///
    /// assert_eq!(map.get(&1), Some(&"b"));
    /// ```
    pub fn get_mut<Q: ?Sized>(&mut self, key: &Q) -> Option<&mut V> where C: Compare<Q, K> {
        match self.tree.find(&self.cmp, key) {
            HEADER => None,
            id => Some(self.tree.node_mut(id).key_value_mut().1),
        }
    }

    /// Returns a reference to the value associated with the given key.
    ///
    /// # Panics
    ///
    /// Panics if the map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    /// map.insert(1, "uno");
    /// assert_eq!(map.at(&1), &"uno");
    /// ```
    pub fn at<Q: ?Sized>(&self, key: &Q) -> &V where C: Compare<Q, K> {
        match self.get(key) {
            Some(value) => value,
            None => panic!("`Map::at` called with a key that is not in the map"),
        }
    }

    /// Returns a mutable reference to the value associated with the given key.
    ///
    /// # Panics
    ///
    /// Panics if the map does not contain the key.
    pub fn at_mut<Q: ?Sized>(&mut self, key: &Q) -> &mut V where C: Compare<Q, K> {
        match self.get_mut(key) {
            Some(value) => value,
            None => panic!("`Map::at_mut` called with a key that is not in the map"),
        }
    }

    /// Returns a mutable reference to the value associated with the given key, first inserting
    /// the default value if the map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map: rbmap::Map<&str, Vec<i32>> = rbmap::Map::new();
    ///
    /// map.get_or_insert_default("a").push(1);
    /// map.get_or_insert_default("a").push(2);
    ///
    /// assert_eq!(map[&"a"], [1, 2]);
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V where V: Default {
        self.entry(key).or_default()
    }

    /// Returns a reference to the map's minimum key and a reference to its associated value,
    /// or `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    /// assert_eq!(map.first(), None);
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.first(), Some((&1, &"a")));
    /// ```
    pub fn first(&self) -> Option<(&K, &V)> {
        match self.tree.first() {
            HEADER => None,
            id => Some(self.tree.node(id).key_value()),
        }
    }

    /// Returns a reference to the map's maximum key and a reference to its associated value,
    /// or `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    /// assert_eq!(map.last(), None);
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.last(), Some((&3, &"c")));
    /// ```
    pub fn last(&self) -> Option<(&K, &V)> {
        match self.tree.last() {
            HEADER => None,
            id => Some(self.tree.node(id).key_value()),
        }
    }

    /// Returns a cursor to the entry whose key is equivalent to the given key, or the
    /// past-the-end position if the map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    /// assert_eq!(map.find(&1), map.end());
    ///
    /// map.insert(1, "a");
    /// let one = map.find(&1);
    /// assert_eq!(map.get_at(one), (&1, &"a"));
    /// assert_eq!(map.find(&2), map.end());
    /// ```
    pub fn find<Q: ?Sized>(&self, key: &Q) -> Cursor where C: Compare<Q, K> {
        Cursor::at(self.tree.find(&self.cmp, key))
    }

    /// Returns a cursor to the first entry whose key is not less than the given key, or the
    /// past-the-end position if there is none.
    ///
    /// # Examples
    ///
    /// ```
    /// let map: rbmap::Map<_, _> = (1..6).map(|i| (i, i * 10)).collect();
    ///
    /// assert_eq!(map.get_at(map.lower_bound(&0)), (&1, &10));
    /// assert_eq!(map.get_at(map.lower_bound(&3)), (&3, &30));
    /// assert_eq!(map.lower_bound(&6), map.end());
    /// ```
    pub fn lower_bound<Q: ?Sized>(&self, key: &Q) -> Cursor where C: Compare<Q, K> {
        Cursor::at(self.tree.lower_bound(&self.cmp, key))
    }

    /// Returns a cursor to the map's first entry, or the past-the-end position if the map is
    /// empty.
    pub fn begin(&self) -> Cursor { Cursor::at(self.tree.first()) }

    /// Returns the map's past-the-end position.
    ///
    /// Stepping forward from the last entry, or backward from the first, lands here.
    pub fn end(&self) -> Cursor { Cursor::at(HEADER) }

    /// Returns a cursor to the map's last entry, where a backward traversal starts, or the
    /// past-the-end position if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let map: rbmap::Map<_, _> = vec![(1, "a"), (2, "b"), (3, "c")].into_iter().collect();
    ///
    /// let mut keys = vec![];
    /// let mut cursor = map.rbegin();
    /// while cursor != map.rend() {
    ///     keys.push(*map.get_at(cursor).0);
    ///     cursor = map.prev(cursor);
    /// }
    ///
    /// assert_eq!(keys, [3, 2, 1]);
    /// ```
    pub fn rbegin(&self) -> Cursor { Cursor::at(self.tree.last()) }

    /// Returns the position where a backward traversal ends, which is the past-the-end
    /// position.
    pub fn rend(&self) -> Cursor { self.end() }

    /// Returns a cursor to the entry following the given position.
    ///
    /// The entry following the last one is the past-the-end position, and the entry following
    /// the past-the-end position is the first one.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is nil or refers to an erased entry.
    ///
    /// # Examples
    ///
    /// ```
    /// let map: rbmap::Map<_, _> = vec![(1, "a"), (2, "b")].into_iter().collect();
    ///
    /// let mut cursor = map.begin();
    /// assert_eq!(map.get_at(cursor), (&1, &"a"));
    /// cursor = map.next(cursor);
    /// assert_eq!(map.get_at(cursor), (&2, &"b"));
    /// cursor = map.next(cursor);
    /// assert_eq!(cursor, map.end());
    /// assert_eq!(map.next(cursor), map.begin());
    /// ```
    pub fn next(&self, cursor: Cursor) -> Cursor {
        Cursor::at(self.tree.successor(cursor.expect_node()))
    }

    /// Returns a cursor to the entry preceding the given position.
    ///
    /// The entry preceding the first one is the past-the-end position, and the entry preceding
    /// the past-the-end position is the last one.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is nil or refers to an erased entry.
    pub fn prev(&self, cursor: Cursor) -> Cursor {
        Cursor::at(self.tree.predecessor(cursor.expect_node()))
    }

    /// Returns references to the key and value at the given position.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is nil, is the past-the-end position, or refers to an erased entry.
    pub fn get_at(&self, cursor: Cursor) -> (&K, &V) {
        self.tree.node(cursor.expect_node()).key_value()
    }

    /// Returns a reference to the key and a mutable reference to the value at the given
    /// position.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is nil, is the past-the-end position, or refers to an erased entry.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    ///
    /// let one = map.insert(1, "a");
    /// *map.get_at_mut(one).1 = "b";
    /// assert_eq!(map[&1], "b");
    /// ```
    pub fn get_at_mut(&mut self, cursor: Cursor) -> (&K, &mut V) {
        self.tree.node_mut(cursor.expect_node()).key_value_mut()
    }

    /// Returns an iterator over the map's entries with immutable references to the values.
    ///
    /// The iterator yields the entries in ascending order according to the map's comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut it = map.iter();
    /// assert_eq!(it.next(), Some((&1, &"a")));
    /// assert_eq!(it.next_back(), Some((&3, &"c")));
    /// assert_eq!(it.next(), Some((&2, &"b")));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> { Iter(node::Iter::new(&self.tree)) }

    /// Returns an iterator over the map's entries with mutable references to the values.
    ///
    /// The iterator yields the entries in ascending order according to the map's comparator.
    /// Creating it collects a reference to every entry up front, which allocates O(n) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    ///
    /// map.insert("b", 2);
    /// map.insert("a", 1);
    /// map.insert("c", 3);
    ///
    /// let mut i = 1;
    ///
    /// for (_, value) in map.iter_mut() {
    ///     assert_eq!(i, *value);
    ///     *value *= 2;
    ///     i += 1;
    /// }
    ///
    /// assert_eq!(map[&"a"], 2);
    /// assert_eq!(map[&"b"], 4);
    /// assert_eq!(map[&"c"], 6);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut(self.tree.ordered_entries_mut().into_iter())
    }

    /// Returns an iterator over the map's keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// let map: rbmap::Map<_, _> = vec![(2, "b"), (1, "a")].into_iter().collect();
    /// assert_eq!(map.keys().collect::<Vec<_>>(), [&1, &2]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V> { Keys(self.iter()) }

    /// Returns an iterator over the map's values in ascending order of their keys.
    ///
    /// # Examples
    ///
    /// ```
    /// let map: rbmap::Map<_, _> = vec![(2, "b"), (1, "a")].into_iter().collect();
    /// assert_eq!(map.values().collect::<Vec<_>>(), [&"a", &"b"]);
    /// ```
    pub fn values(&self) -> Values<'_, K, V> { Values(self.iter()) }

    /// Returns an iterator over mutable references to the map's values in ascending order of
    /// their keys.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> { ValuesMut(self.iter_mut()) }

    /// Checks the map's structural invariants.
    ///
    /// This walks the whole tree and is meant for tests and debugging. A map that is only
    /// manipulated through its public interface always validates.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    ///
    /// for i in 0..100 { map.insert(i, ()); }
    /// for i in (0..100).filter(|i| i % 3 == 0) { map.remove(&i); }
    ///
    /// assert_eq!(map.validate(), Ok(()));
    /// ```
    pub fn validate(&self) -> Result<(), Violation> { self.tree.validate(&self.cmp) }

    #[cfg(test)]
    pub(crate) fn tree(&self) -> &Tree<K, V> { &self.tree }
}

impl<K, V, C> Clone for Map<K, V, C> where K: Clone, V: Clone, C: Clone + Compare<K> {
    /// Rebuilds the map entry by entry in key order, hinting every insertion at the end, which
    /// takes linear time.
    fn clone(&self) -> Self {
        debug!("copying map of {} entries", self.len());
        let mut map = Map::with_cmp(self.cmp.clone());
        map.extend(self.iter().map(|(k, v)| (k.clone(), v.clone())));
        map
    }

    /// Replaces the map with a copy of `source` only once the copy is complete, so a panicking
    /// `clone` of a key or value leaves the map untouched.
    fn clone_from(&mut self, source: &Self) { *self = source.clone(); }
}

impl<K, V, C> Debug for Map<K, V, C> where K: Debug, V: Debug, C: Compare<K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;

        let mut it = self.iter();

        if let Some((k, v)) = it.next() {
            write!(f, "{:?}: {:?}", k, v)?;
            for (k, v) in it { write!(f, ", {:?}: {:?}", k, v)?; }
        }

        write!(f, "}}")
    }
}

impl<K, V, C> Default for Map<K, V, C> where C: Compare<K> + Default {
    fn default() -> Self { Map::with_cmp(Default::default()) }
}

impl<K, V, C> Extend<(K, V)> for Map<K, V, C> where C: Compare<K> {
    /// Inserts every entry with the past-the-end position as its hint. Keys already in the map
    /// keep their values.
    fn extend<I: IntoIterator<Item=(K, V)>>(&mut self, it: I) {
        for (k, v) in it {
            let end = self.end();
            self.insert_hint(end, k, v);
        }
    }
}

impl<K, V, C> iter::FromIterator<(K, V)> for Map<K, V, C>
    where C: Compare<K> + Default {

    fn from_iter<I: IntoIterator<Item=(K, V)>>(it: I) -> Self {
        let mut map: Self = Default::default();
        map.extend(it);
        map
    }
}

impl<K, V, C> Hash for Map<K, V, C> where K: Hash, V: Hash, C: Compare<K> {
    fn hash<H: hash::Hasher>(&self, h: &mut H) {
        for e in self.iter() { e.hash(h); }
    }
}

impl<'a, K, V, C, Q: ?Sized> ops::Index<&'a Q> for Map<K, V, C>
    where C: Compare<K> + Compare<Q, K> {

    type Output = V;
    fn index(&self, key: &Q) -> &V { self.get(key).expect("key not found") }
}

impl<'a, K, V, C> IntoIterator for &'a Map<K, V, C> where C: Compare<K> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Iter<'a, K, V> { self.iter() }
}

impl<'a, K, V, C> IntoIterator for &'a mut Map<K, V, C> where C: Compare<K> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> IterMut<'a, K, V> { self.iter_mut() }
}

impl<K, V, C> IntoIterator for Map<K, V, C> where C: Compare<K> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Returns an iterator that consumes the map.
    ///
    /// The iterator yields the entries in ascending order according to the map's comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbmap::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut it = map.into_iter();
    /// assert_eq!(it.next(), Some((1, "a")));
    /// assert_eq!(it.next(), Some((2, "b")));
    /// assert_eq!(it.next(), Some((3, "c")));
    /// assert_eq!(it.next(), None);
    /// ```
    fn into_iter(self) -> IntoIter<K, V> { IntoIter(node::IntoIter::new(self.tree)) }
}

impl<K, V, C> PartialEq for Map<K, V, C> where V: PartialEq, C: Compare<K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(l, r)| {
            self.cmp.compares_eq(&l.0, &r.0) && l.1 == r.1
        })
    }
}

impl<K, V, C> Eq for Map<K, V, C> where V: Eq, C: Compare<K> {}

impl<K, V, C> PartialOrd for Map<K, V, C> where V: PartialOrd, C: Compare<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let mut l = self.iter();
        let mut r = other.iter();

        loop {
            match (l.next(), r.next()) {
                (None, None) => return Some(Equal),
                (None, Some(_)) => return Some(Less),
                (Some(_), None) => return Some(Greater),
                (Some(l), Some(r)) => match self.cmp.compare(&l.0, &r.0) {
                    Equal => match l.1.partial_cmp(&r.1) {
                        Some(Equal) => {}
                        non_eq => return non_eq,
                    },
                    non_eq => return Some(non_eq),
                },
            }
        }
    }
}

impl<K, V, C> Ord for Map<K, V, C> where V: Ord, C: Compare<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut l = self.iter();
        let mut r = other.iter();

        loop {
            match (l.next(), r.next()) {
                (None, None) => return Equal,
                (None, Some(_)) => return Less,
                (Some(_), None) => return Greater,
                (Some(l), Some(r)) => match self.cmp.compare(&l.0, &r.0) {
                    Equal => match l.1.cmp(&r.1) {
                        Equal => {}
                        non_eq => return non_eq,
                    },
                    non_eq => return non_eq,
                },
            }
        }
    }
}

/// An iterator that consumes the map.
///
/// The iterator yields the entries in ascending order according to the map's comparator.
///
/// # Examples
///
/// Acquire through the `IntoIterator` trait:
///
/// ```
/// let mut map = rbmap::Map::new();
///
/// map.insert(2, "b");
/// map.insert(1, "a");
/// map.insert(3, "c");
///
/// for (key, value) in map {
///     println!("{:?}: {:?}", key, value);
/// }
/// ```
pub struct IntoIter<K, V>(node::IntoIter<K, V>);

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    fn next(&mut self) -> Option<(K, V)> { self.0.next() }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> { self.0.next_back() }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

/// An iterator over the map's entries with immutable references to the values.
///
/// The iterator yields the entries in ascending order according to the map's comparator.
///
/// # Examples
///
/// Acquire through [`Map::iter`](struct.Map.html#method.iter) or the `IntoIterator` trait:
///
/// ```
/// let mut map = rbmap::Map::new();
///
/// map.insert(2, "b");
/// map.insert(1, "a");
/// map.insert(3, "c");
///
/// for (key, value) in &map {
///     println!("{:?}: {:?}", key, value);
/// }
/// ```
pub struct Iter<'a, K: 'a, V: 'a>(node::Iter<'a, K, V>);

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Iter<'a, K, V> { Iter(self.0.clone()) }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<(&'a K, &'a V)> { self.0.next() }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> { self.0.next_back() }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

/// An iterator over the map's entries with mutable references to the values.
///
/// The iterator yields the entries in ascending order according to the map's comparator.
///
/// # Examples
///
/// Acquire through [`Map::iter_mut`](struct.Map.html#method.iter_mut) or the
/// `IntoIterator` trait:
///
/// ```
/// let mut map = rbmap::Map::new();
///
/// map.insert(2, "b");
/// map.insert(1, "a");
/// map.insert(3, "c");
///
/// for (_, value) in &mut map {
///     *value = "z";
/// }
///
/// assert_eq!(map.values().collect::<Vec<_>>(), [&"z", &"z", &"z"]);
/// ```
pub struct IterMut<'a, K: 'a, V: 'a>(vec::IntoIter<(&'a K, &'a mut V)>);

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    fn next(&mut self) -> Option<(&'a K, &'a mut V)> { self.0.next() }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a mut V)> { self.0.next_back() }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}

/// An iterator over the map's keys.
///
/// Acquire through [`Map::keys`](struct.Map.html#method.keys).
pub struct Keys<'a, K: 'a, V: 'a>(Iter<'a, K, V>);

impl<'a, K, V> Clone for Keys<'a, K, V> {
    fn clone(&self) -> Keys<'a, K, V> { Keys(self.0.clone()) }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;
    fn next(&mut self) -> Option<&'a K> { self.0.next().map(|e| e.0) }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a K> { self.0.next_back().map(|e| e.0) }
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}

/// An iterator over the map's values.
///
/// Acquire through [`Map::values`](struct.Map.html#method.values).
pub struct Values<'a, K: 'a, V: 'a>(Iter<'a, K, V>);

impl<'a, K, V> Clone for Values<'a, K, V> {
    fn clone(&self) -> Values<'a, K, V> { Values(self.0.clone()) }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    fn next(&mut self) -> Option<&'a V> { self.0.next().map(|e| e.1) }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for Values<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a V> { self.0.next_back().map(|e| e.1) }
}

impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}

/// An iterator over mutable references to the map's values.
///
/// Acquire through [`Map::values_mut`](struct.Map.html#method.values_mut).
pub struct ValuesMut<'a, K: 'a, V: 'a>(IterMut<'a, K, V>);

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;
    fn next(&mut self) -> Option<&'a mut V> { self.0.next().map(|e| e.1) }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for ValuesMut<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a mut V> { self.0.next_back().map(|e| e.1) }
}

impl<'a, K, V> ExactSizeIterator for ValuesMut<'a, K, V> {}

/// An entry in the map.
///
/// See [`Map::entry`](struct.Map.html#method.entry) for an example.
pub enum Entry<'a, K: 'a, V: 'a> {
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Returns a reference to the entry's key.
    pub fn key(&self) -> &K {
        match *self {
            Entry::Occupied(ref e) => e.key(),
            Entry::Vacant(ref e) => e.key(),
        }
    }

    /// Returns the entry's value, inserting the given default if the entry is vacant.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(default),
        }
    }

    /// Returns the entry's value, inserting the given function's result if the entry is vacant.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V where F: FnOnce() -> V {
        match self {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(default()),
        }
    }

    /// Returns the entry's value, inserting the default value if the entry is vacant.
    pub fn or_default(self) -> &'a mut V where V: Default {
        self.or_insert_with(V::default)
    }
}

/// An occupied entry.
///
/// See [`Map::entry`](struct.Map.html#method.entry) for an example.
pub struct OccupiedEntry<'a, K: 'a, V: 'a> {
    tree: &'a mut Tree<K, V>,
    node: NodeId,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Returns a reference to the entry's key.
    pub fn key(&self) -> &K { self.tree.node(self.node).key() }

    /// Returns a reference to the entry's value.
    pub fn get(&self) -> &V { self.tree.node(self.node).key_value().1 }

    /// Returns a mutable reference to the entry's value.
    pub fn get_mut(&mut self) -> &mut V { self.tree.node_mut(self.node).key_value_mut().1 }

    /// Returns a mutable reference to the entry's value with the same lifetime as the map.
    pub fn into_mut(self) -> &'a mut V {
        let tree = self.tree;
        tree.node_mut(self.node).key_value_mut().1
    }

    /// Returns a cursor to the entry.
    pub fn cursor(&self) -> Cursor { Cursor::at(self.node) }

    /// Replaces the entry's value with the given value, returning the old one.
    pub fn insert(&mut self, value: V) -> V { mem::replace(self.get_mut(), value) }

    /// Removes the entry from the map and returns its key and value.
    pub fn remove(self) -> (K, V) { self.tree.detach(self.node) }
}

/// A vacant entry.
///
/// See [`Map::entry`](struct.Map.html#method.entry) for an example.
pub struct VacantEntry<'a, K: 'a, V: 'a> {
    tree: &'a mut Tree<K, V>,
    key: K,
    parent: NodeId,
    dir: usize,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Returns a reference to the key that would be inserted.
    pub fn key(&self) -> &K { &self.key }

    /// Returns the key that would have been inserted.
    pub fn into_key(self) -> K { self.key }

    /// Inserts the entry into the map with its key and the given value, returning a mutable
    /// reference to the value with the same lifetime as the map.
    pub fn insert(self, value: V) -> &'a mut V {
        let tree = self.tree;
        let id = tree.attach(self.parent, self.dir, self.key, value);
        tree.node_mut(id).key_value_mut().1
    }
}
