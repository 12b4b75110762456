// Behavioral tests for the epoch queue

#[cfg(test)]
mod tests {
    use crate::*;
    use cid::Cid;
    use dealmarket_types::BitField;
    use fvm_ipld_blockstore::{Blockstore, MemoryBlockstore};
    use fvm_ipld_encoding::{BytesDe, BytesSer};
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::collections::BTreeMap;

    /// Store that counts writes and fails reads once a budget of successful
    /// reads runs out
    struct TestStore {
        inner: MemoryBlockstore,
        reads_left: Cell<Option<u32>>,
        writes: Cell<u64>,
    }

    impl TestStore {
        fn new() -> Self {
            TestStore {
                inner: MemoryBlockstore::new(),
                reads_left: Cell::new(None),
                writes: Cell::new(0),
            }
        }

        fn allow_reads(&self, n: u32) {
            self.reads_left.set(Some(n));
        }

        fn heal(&self) {
            self.reads_left.set(None);
        }

        fn writes(&self) -> u64 {
            self.writes.get()
        }
    }

    impl Blockstore for TestStore {
        fn get(&self, k: &Cid) -> anyhow::Result<Option<Vec<u8>>> {
            match self.reads_left.get() {
                Some(0) => Err(anyhow::anyhow!("store offline")),
                Some(n) => {
                    self.reads_left.set(Some(n - 1));
                    self.inner.get(k)
                }
                None => self.inner.get(k),
            }
        }

        fn put_keyed(&self, k: &Cid, block: &[u8]) -> anyhow::Result<()> {
            self.writes.set(self.writes.get() + 1);
            self.inner.put_keyed(k, block)
        }
    }

    fn keys(values: &[u64]) -> BitField {
        BitField::try_from_bits(values.iter().copied()).unwrap()
    }

    fn sample_queue<BS: Blockstore>(store: &BS) -> Cid {
        let mut queue = EpochQueue::new(store);
        queue.add(10, &keys(&[1, 2])).unwrap();
        queue.add(20, &keys(&[3])).unwrap();
        queue.add(30, &keys(&[4, 5])).unwrap();
        queue.root().unwrap()
    }

    #[test]
    fn test_pop_until_drains_due_epochs() {
        let store = MemoryBlockstore::new();
        let root = sample_queue(&store);
        let mut queue = EpochQueue::load(&store, &root).unwrap();

        let popped = queue.pop_until(20).unwrap();
        assert_eq!(popped, Some(keys(&[1, 2, 3])));
        assert_eq!(queue.entries().unwrap(), vec![(30, keys(&[4, 5]))]);

        // Nothing left at or before 20.
        assert_eq!(queue.pop_until(20).unwrap(), None);
        assert_eq!(queue.pop_until(30).unwrap(), Some(keys(&[4, 5])));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_pop_until_nothing_due_writes_nothing() {
        let store = TestStore::new();
        let root = sample_queue(&store);
        let mut queue = EpochQueue::load(&store, &root).unwrap();
        let writes = store.writes();

        assert_eq!(queue.pop_until(9).unwrap(), None);
        assert_eq!(store.writes(), writes);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.root().unwrap(), root);
    }

    #[test]
    fn test_empty_add_touches_nothing() {
        let store = TestStore::new();
        let root = sample_queue(&store);
        let mut queue = EpochQueue::load(&store, &root).unwrap();

        // Any read would fail.
        store.allow_reads(0);
        let writes = store.writes();
        queue.add(10, &BitField::new()).unwrap();
        queue.add_values(500, []).unwrap();
        assert_eq!(store.writes(), writes);

        store.heal();
        assert_eq!(queue.root().unwrap(), root);
    }

    #[test]
    fn test_readding_existing_keys_keeps_root() {
        let store = MemoryBlockstore::new();
        let root = sample_queue(&store);
        let mut queue = EpochQueue::load(&store, &root).unwrap();

        queue.add(10, &keys(&[2])).unwrap();
        queue.add(30, &keys(&[4, 5])).unwrap();

        assert_eq!(queue.root().unwrap(), root);
    }

    #[test]
    fn test_insertion_order_does_not_change_root() {
        let store = MemoryBlockstore::new();

        let mut a = EpochQueue::new(&store);
        a.add(7, &keys(&[1])).unwrap();
        a.add(3, &keys(&[2])).unwrap();
        a.add(7, &keys(&[5, 6])).unwrap();

        let mut b = EpochQueue::new(&store);
        b.add(7, &keys(&[6, 5, 1])).unwrap();
        b.add(3, &keys(&[2])).unwrap();

        assert_eq!(a.root().unwrap(), b.root().unwrap());
    }

    #[test]
    fn test_load_missing_root() {
        let store = MemoryBlockstore::new();
        let elsewhere = MemoryBlockstore::new();
        let missing = sample_queue(&elsewhere);

        match EpochQueue::load(&store, &missing) {
            Err(QueueError::Load { root, .. }) => assert_eq!(root, missing),
            Err(other) => panic!("expected load error, got {}", other),
            Ok(_) => panic!("loaded a root that is not in the store"),
        }
    }

    #[test]
    fn test_lookup_failure_leaves_queue_unchanged() {
        let store = TestStore::new();
        let root = sample_queue(&store);
        let mut queue = EpochQueue::load(&store, &root).unwrap();

        store.allow_reads(0);
        let err = queue.add(10, &keys(&[99])).unwrap_err();
        assert!(matches!(err, QueueError::Lookup { epoch: 10, .. }));
        assert!(err.store_error().is_some());

        store.heal();
        assert_eq!(queue.get(10).unwrap(), Some(keys(&[1, 2])));
        assert_eq!(queue.root().unwrap(), root);
    }

    #[test]
    fn test_pop_failures_leave_queue_unchanged() {
        let store = TestStore::new();
        let root = sample_queue(&store);
        let mut failures = 0;

        // Cut the store off after each possible number of reads; every
        // failing pop must leave the contents and root as they were.
        for budget in 0..32 {
            let mut queue = EpochQueue::load(&store, &root).unwrap();
            store.allow_reads(budget);
            let result = queue.pop_until(20);
            store.heal();

            match result {
                Ok(popped) => {
                    assert_eq!(popped, Some(keys(&[1, 2, 3])));
                    assert_eq!(queue.entries().unwrap(), vec![(30, keys(&[4, 5]))]);
                    break;
                }
                Err(err) => {
                    failures += 1;
                    assert!(err.store_error().is_some(), "unexpected error {}", err);
                    assert_eq!(queue.len(), 3);
                    assert_eq!(queue.entries().unwrap().len(), 3);
                    assert_eq!(queue.root().unwrap(), root);
                }
            }
        }
        assert!(failures > 0);
    }

    #[test]
    fn test_root_with_understated_count_is_rejected() {
        let store = MemoryBlockstore::new();
        let mut queue = EpochQueue::new(&store);
        queue.add(5, &keys(&[1, 0])).unwrap();
        let root = queue.root().unwrap();

        // Rewrite the root block in place claiming zero entries.
        type RootBlock = (u32, u32, u64, (BytesDe, Vec<Cid>, Vec<BitField>));
        let bytes = store.get(&root).unwrap().unwrap();
        let (bit_width, height, _, (bmap, links, values)): RootBlock =
            fvm_ipld_encoding::from_slice(&bytes).unwrap();
        let corrupt = fvm_ipld_encoding::to_vec(&(
            bit_width,
            height,
            0u64,
            (BytesSer(&bmap.0), links, values),
        ))
        .unwrap();
        store.put_keyed(&root, &corrupt).unwrap();

        match EpochQueue::load(&store, &root) {
            Err(QueueError::Load { .. }) => {}
            Err(other) => panic!("unexpected error {}", other),
            Ok(mut queue) => {
                assert_eq!(queue.len(), 0);
                assert!(matches!(
                    queue.pop_until(10),
                    Err(QueueError::CountMismatch { count: 0, found: 1 })
                ));
            }
        }
    }

    #[test]
    fn test_add_values_rejects_out_of_range_key() {
        let store = MemoryBlockstore::new();
        let mut queue = EpochQueue::new(&store);

        assert!(matches!(
            queue.add_values(1, [u64::MAX]),
            Err(QueueError::KeyOutOfRange)
        ));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_merged_key_count_is_exact() {
        let store = MemoryBlockstore::new();
        let mut queue = EpochQueue::new(&store);
        queue.add_values(3, 0..1000).unwrap();
        queue.add_values(3, 500..1500).unwrap();

        assert_eq!(queue.pop_until(3).unwrap().map(|k| k.len()), Some(1500));
    }

    proptest! {
        #[test]
        fn prop_pop_until_matches_model(
            adds in proptest::collection::vec((0i64..200, proptest::collection::vec(0u64..64, 0..5)), 0..40),
            thresholds in proptest::collection::vec(-5i64..220, 1..6),
        ) {
            let store = MemoryBlockstore::new();
            let mut queue = EpochQueue::new(&store);
            let mut model: BTreeMap<i64, BitField> = BTreeMap::new();

            for (epoch, values) in &adds {
                queue.add_values(*epoch, values.iter().copied()).unwrap();
                if !values.is_empty() {
                    let entry = model.entry(*epoch).or_default();
                    *entry = &*entry | &keys(values);
                }
            }
            // Exercise stored nodes as well as dirty ones.
            let root = queue.root().unwrap();
            let mut queue = EpochQueue::load(&store, &root).unwrap();

            for until in thresholds {
                let rest = model.split_off(&(until.max(-1) + 1));
                let due = std::mem::replace(&mut model, rest);
                let expected = if due.is_empty() {
                    None
                } else {
                    Some(BitField::union(due.values()))
                };

                prop_assert_eq!(queue.pop_until(until).unwrap(), expected);
                prop_assert_eq!(queue.len(), model.len() as u64);
            }
            prop_assert_eq!(
                queue.entries().unwrap(),
                model.into_iter().collect::<Vec<_>>()
            );
        }

        #[test]
        fn prop_add_is_order_independent(
            adds in proptest::collection::vec((0i64..100, proptest::collection::vec(0u64..32, 1..4)), 1..20),
        ) {
            let store = MemoryBlockstore::new();

            let mut forward = EpochQueue::new(&store);
            for (epoch, values) in &adds {
                forward.add_values(*epoch, values.iter().copied()).unwrap();
            }
            let mut backward = EpochQueue::new(&store);
            for (epoch, values) in adds.iter().rev() {
                backward.add_values(*epoch, values.iter().copied()).unwrap();
            }

            prop_assert_eq!(forward.root().unwrap(), backward.root().unwrap());
        }
    }
}
