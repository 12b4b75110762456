use cid::Cid;
use dealmarket_types::{BitField, ChainEpoch};
use fvm_ipld_amt::Amt;
use fvm_ipld_blockstore::Blockstore;

use crate::error::{QueueError, Result};

/// Queue of integer keys bucketed by epoch.
///
/// Wraps an AMT of [`BitField`]s indexed by epoch. Adding to an occupied
/// epoch merges with what is there. Entries are drained in ascending epoch
/// order by [`EpochQueue::pop_until`].
///
/// Changes are buffered until [`EpochQueue::root`] writes them and returns
/// the identifier to keep in actor state.
pub struct EpochQueue<'db, BS: Blockstore> {
    store: &'db BS,
    amt: Amt<BitField, &'db BS>,
}

impl<'db, BS: Blockstore> EpochQueue<'db, BS> {
    /// Create an empty queue with the default AMT bit width
    pub fn new(store: &'db BS) -> Self {
        EpochQueue {
            store,
            amt: Amt::new(store),
        }
    }

    pub fn new_with_bit_width(store: &'db BS, bit_width: u32) -> Self {
        EpochQueue {
            store,
            amt: Amt::new_with_bit_width(store, bit_width),
        }
    }

    /// Open a queue from a root previously returned by [`EpochQueue::root`]
    pub fn load(store: &'db BS, root: &Cid) -> Result<Self> {
        let amt = Amt::load(root, store).map_err(|source| QueueError::Load {
            root: *root,
            source,
        })?;
        Ok(EpochQueue { store, amt })
    }

    /// Write pending changes and return the queue root
    pub fn root(&mut self) -> Result<Cid> {
        self.amt.flush().map_err(QueueError::Flush)
    }

    /// Number of epochs with pending keys, as recorded in the root
    pub fn len(&self) -> u64 {
        self.amt.count()
    }

    pub fn is_empty(&self) -> bool {
        self.amt.count() == 0
    }

    fn index(epoch: ChainEpoch) -> Result<u64> {
        u64::try_from(epoch).map_err(|_| QueueError::InvalidEpoch(epoch))
    }

    /// Keys queued at exactly `epoch`
    pub fn get(&self, epoch: ChainEpoch) -> Result<Option<BitField>> {
        let i = Self::index(epoch)?;
        let keys = self
            .amt
            .get(i)
            .map_err(|source| QueueError::Lookup { epoch, source })?;
        Ok(keys.cloned())
    }

    /// Merge `keys` into the entry for `epoch`.
    /// An empty set is accepted and leaves the queue and store untouched.
    pub fn add(&mut self, epoch: ChainEpoch, keys: &BitField) -> Result<()> {
        if keys.is_empty() {
            tracing::trace!(epoch, "skipping empty queue insert");
            return Ok(());
        }
        let i = Self::index(epoch)?;

        let merged = match self
            .amt
            .get(i)
            .map_err(|source| QueueError::Lookup { epoch, source })?
        {
            Some(current) => current | keys,
            None => keys.clone(),
        };

        tracing::debug!(epoch, added = keys.len(), total = merged.len(), "queued keys");
        self.amt
            .set(i, merged)
            .map_err(|source| QueueError::Set { epoch, source })
    }

    /// Merge the listed values into the entry for `epoch`
    pub fn add_values(
        &mut self,
        epoch: ChainEpoch,
        values: impl IntoIterator<Item = u64>,
    ) -> Result<()> {
        let keys = BitField::try_from_bits(values).map_err(|_| QueueError::KeyOutOfRange)?;
        self.add(epoch, &keys)
    }

    /// Remove and return the union of every entry at or before `until`.
    ///
    /// Returns `None` when no epoch was due, in which case nothing is
    /// written. The scan stops at the first epoch past `until`.
    ///
    /// Deletion runs against a copy loaded from the flushed root and only
    /// replaces the live array once every delete has succeeded, so a
    /// failure leaves the queue as it was.
    pub fn pop_until(&mut self, until: ChainEpoch) -> Result<Option<BitField>> {
        let mut popped = BitField::new();
        let mut due: Vec<u64> = Vec::new();

        self.amt
            .for_each_while(|i, keys| {
                match ChainEpoch::try_from(i) {
                    Ok(epoch) if epoch <= until => {}
                    _ => return Ok(false),
                }
                due.push(i);
                popped = &popped | keys;
                Ok(true)
            })
            .map_err(QueueError::Iterate)?;

        if due.is_empty() {
            tracing::trace!(until, "nothing due in epoch queue");
            return Ok(None);
        }

        let count = self.amt.count();
        if due.len() as u64 > count {
            return Err(QueueError::CountMismatch {
                count,
                found: due.len() as u64,
            });
        }

        let delete_err = |source: fvm_ipld_amt::Error| QueueError::Delete {
            epochs: due.iter().map(|&i| i as ChainEpoch).collect(),
            source,
        };
        let root = self.amt.flush().map_err(QueueError::Flush)?;
        let mut staged = Amt::load(&root, self.store).map_err(delete_err)?;
        staged
            .batch_delete(due.iter().copied(), true)
            .map_err(delete_err)?;
        self.amt = staged;

        tracing::debug!(until, epochs = due.len(), keys = popped.len(), "popped epoch queue");
        Ok(Some(popped))
    }

    /// Visit every entry in ascending epoch order
    pub fn for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(ChainEpoch, &BitField),
    {
        self.amt
            .for_each(|i, keys| {
                f(i as ChainEpoch, keys);
                Ok(())
            })
            .map_err(QueueError::Iterate)
    }

    /// All entries in ascending epoch order
    pub fn entries(&self) -> Result<Vec<(ChainEpoch, BitField)>> {
        let mut out = Vec::new();
        self.for_each(|epoch, keys| out.push((epoch, keys.clone())))?;
        Ok(out)
    }
}
