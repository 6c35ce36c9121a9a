use std::collections::HashMap;

use quickcheck::{Arbitrary, Gen};

use versioned_map::{CompareAndSwapError, Config, VersionedMap};

// a small key space so that operations collide often
const KEY_SPACE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(pub u8);

fn range(g: &mut Gen, min_inclusive: usize, max_exclusive: usize) -> usize {
    assert!(max_exclusive > min_inclusive);
    let range = max_exclusive - min_inclusive;
    let generated = usize::arbitrary(g) % range;
    min_inclusive + generated
}

impl Arbitrary for Key {
    #![allow(clippy::cast_possible_truncation)]

    fn arbitrary(g: &mut Gen) -> Self {
        Key(range(g, 0, KEY_SPACE) as u8)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.0.shrink().map(Key))
    }
}

#[derive(Debug, Clone)]
pub enum Op {
    Insert(Key, u8),
    Get(Key),
    Remove(Key),
    Cas(Key, Option<u8>, Option<u8>),
    GetOrInsert(Key, u8),
    Snapshot,
    Clear,
}

use self::Op::*;

impl Arbitrary for Op {
    fn arbitrary(g: &mut Gen) -> Self {
        if range(g, 0, 20) == 0 {
            return Clear;
        }

        let choice = range(g, 0, 6);

        match choice {
            0 => Insert(Key::arbitrary(g), u8::arbitrary(g)),
            1 => Get(Key::arbitrary(g)),
            2 => Remove(Key::arbitrary(g)),
            3 => Cas(
                Key::arbitrary(g),
                Option::<u8>::arbitrary(g),
                Option::<u8>::arbitrary(g),
            ),
            4 => GetOrInsert(Key::arbitrary(g), u8::arbitrary(g)),
            5 => Snapshot,
            _ => panic!("impossible choice"),
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match *self {
            Insert(k, v) => Box::new(k.shrink().map(move |k| Insert(k, v))),
            Get(k) => Box::new(k.shrink().map(Get)),
            Remove(k) => Box::new(k.shrink().map(Remove)),
            Cas(k, old, new) => {
                Box::new(k.shrink().map(move |k| Cas(k, old, new)))
            }
            GetOrInsert(k, v) => {
                Box::new(k.shrink().map(move |k| GetOrInsert(k, v)))
            }
            Snapshot | Clear => Box::new(vec![].into_iter()),
        }
    }
}

pub fn prop_map_matches_hashmap(ops: Vec<Op>, track_stats: bool) -> bool {
    super::common::setup_logger();

    let map: VersionedMap<u8, u8> =
        Config::new().name("model".to_owned()).track_stats(track_stats).open();

    let mut reference: HashMap<u8, u8> = HashMap::new();
    let mut reference_version: u64 = 0;

    for op in ops {
        match op {
            Insert(Key(k), v) => {
                let old_actual = map.insert(k, v);
                let old_reference = reference.insert(k, v);
                reference_version += 1;
                assert_eq!(
                    old_actual, old_reference,
                    "when inserting key {:?}, expected old returned value \
                     to be {:?}\n{:?}",
                    k, old_reference, map
                );
            }
            Get(Key(k)) => {
                assert_eq!(map.get(&k), reference.get(&k).copied());
            }
            Remove(Key(k)) => {
                let old_actual = map.remove(&k);
                let old_reference = reference.remove(&k);
                if old_reference.is_some() {
                    reference_version += 1;
                }
                assert_eq!(old_actual, old_reference);
            }
            Cas(Key(k), old, new) => {
                let res = map.compare_and_swap(k, old.as_ref(), new);
                let current = reference.get(&k).copied();

                if current == old {
                    match new {
                        Some(v) => {
                            reference.insert(k, v);
                            reference_version += 1;
                        }
                        None => {
                            if reference.remove(&k).is_some() {
                                reference_version += 1;
                            }
                        }
                    }
                    assert_eq!(res, Ok(reference_version));
                } else {
                    assert_eq!(
                        res,
                        Err(CompareAndSwapError { current, proposed: new })
                    );
                }
            }
            GetOrInsert(Key(k), v) => {
                let actual = map.get_or_insert(k, v);
                let expected = *reference.entry(k).or_insert_with(|| {
                    reference_version += 1;
                    v
                });
                assert_eq!(actual, expected);
            }
            Snapshot => {
                let snapshot = map.snapshot();
                assert_eq!(snapshot.version(), reference_version);
                assert_eq!(snapshot.len(), reference.len());
                for (k, v) in &reference {
                    assert_eq!(snapshot.get(k), Some(v));
                }
            }
            Clear => {
                if !reference.is_empty() {
                    reference_version += 1;
                }
                reference.clear();
                map.clear();
            }
        }

        assert_eq!(map.version(), reference_version);
        assert_eq!(map.len(), reference.len());
    }

    let stats = map.stats();
    if track_stats {
        assert_eq!(stats.writes, reference_version);
    } else {
        assert_eq!(stats.reads, 0);
        assert_eq!(stats.writes, 0);
    }

    true
}
