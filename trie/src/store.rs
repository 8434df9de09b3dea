//! The external key/value store boundary.
//!
//! The tree itself is purely in-memory; persistence goes through
//! [`KeyValueStore`], which treats keys and values as opaque bytes. A
//! [`StoreBatch`] buffers writes and applies them in one call on commit;
//! dropping an uncommitted batch discards it.

use crate::committer::{KEY_LENGTH, STEM_LENGTH, VALUE_LENGTH};
use crate::error::VerkleError;
use crate::trie::VerkleTree;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// A single buffered write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

/// Ordered byte-keyed storage consumed by the tree for persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Applies a group of writes. Implementations should make the group
    /// atomic with respect to concurrent readers.
    fn apply(&self, ops: Vec<BatchOp>);

    /// All entries in ascending key order.
    fn entries(&self) -> Vec<(Vec<u8>, Vec<u8>)>;

    fn put(&self, key: &[u8], value: &[u8]) {
        self.apply(vec![BatchOp::Put(key.to_vec(), value.to_vec())]);
    }

    fn delete(&self, key: &[u8]) {
        self.apply(vec![BatchOp::Delete(key.to_vec())]);
    }

    /// Starts a write batch against this store.
    fn batch(&self) -> StoreBatch<'_, Self>
    where
        Self: Sized,
    {
        StoreBatch {
            store: self,
            ops: Vec::new(),
        }
    }
}

/// Buffered writes that reach the store only on [`commit`](Self::commit).
///
/// Dropping the batch without committing rolls everything back, since
/// nothing has been applied yet.
#[derive(Debug)]
pub struct StoreBatch<'a, S: KeyValueStore> {
    store: &'a S,
    ops: Vec<BatchOp>,
}

impl<S: KeyValueStore> StoreBatch<'_, S> {
    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.ops.push(BatchOp::Put(key.to_vec(), value.to_vec()));
    }

    pub fn delete(&mut self, key: &[u8]) {
        self.ops.push(BatchOp::Delete(key.to_vec()));
    }

    pub fn commit(self) {
        self.store.apply(self.ops);
    }
}

/// In-memory reference store.
///
/// Not a tree implementation, only the storage backend underneath one;
/// meant for tests, development and as a template for database-backed
/// stores. A [`RwLock`] makes it shareable across threads.
#[derive(Debug, Default)]
pub struct MemStore {
    kvs: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.kvs.read().expect("store lock poisoned").get(key).cloned()
    }

    fn apply(&self, ops: Vec<BatchOp>) {
        // one write lock for the whole group
        let mut kvs = self.kvs.write().expect("store lock poisoned");
        for op in ops {
            match op {
                BatchOp::Put(key, value) => {
                    kvs.insert(key, value);
                }
                BatchOp::Delete(key) => {
                    kvs.remove(&key);
                }
            }
        }
    }

    fn entries(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.kvs
            .read()
            .expect("store lock poisoned")
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl VerkleTree {
    /// Writes every stored leaf entry through one batch. Entry keys are
    /// the 32-byte tree keys (stem plus suffix).
    pub fn flush<S: KeyValueStore>(&self, store: &S) {
        let mut batch = store.batch();
        for node in &self.nodes {
            if let crate::node::Node::Leaf(leaf) = node {
                for (suffix, value) in leaf.values.iter().enumerate() {
                    if let Some(value) = value {
                        let mut key = [0u8; KEY_LENGTH];
                        key[..STEM_LENGTH].copy_from_slice(&leaf.stem);
                        key[KEY_LENGTH - 1] = suffix as u8;
                        batch.put(&key, value);
                    }
                }
            }
        }
        batch.commit();
    }

    /// Rebuilds a tree from a store previously written by
    /// [`flush`](Self::flush). Entries with malformed lengths are
    /// rejected.
    pub fn load<S: KeyValueStore>(store: &S) -> Result<VerkleTree, VerkleError> {
        let mut tree = VerkleTree::new();
        for (key, value) in store.entries() {
            if value.len() != VALUE_LENGTH {
                return Err(VerkleError::MalformedKey("value must be 32 bytes"));
            }
            tree.insert(&key, &value)?;
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_applies_on_commit_only() {
        let store = MemStore::new();
        let mut batch = store.batch();
        batch.put(b"a", b"1");
        batch.put(b"b", b"2");
        assert_eq!(store.get(b"a"), None);
        batch.commit();
        assert_eq!(store.get(b"a"), Some(b"1".to_vec()));
        assert_eq!(store.get(b"b"), Some(b"2".to_vec()));
    }

    #[test]
    fn dropped_batch_rolls_back() {
        let store = MemStore::new();
        store.put(b"a", b"1");
        {
            let mut batch = store.batch();
            batch.put(b"a", b"overwritten");
            batch.delete(b"a");
            // dropped without commit
        }
        assert_eq!(store.get(b"a"), Some(b"1".to_vec()));
    }

    #[test]
    fn entries_are_ordered() {
        let store = MemStore::new();
        store.put(b"b", b"2");
        store.put(b"a", b"1");
        store.put(b"c", b"3");
        let keys: Vec<Vec<u8>> = store.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn flush_then_load_round_trips_the_root() {
        let mut tree = VerkleTree::new();
        let mut key_a = [1u8; 32];
        key_a[31] = 4;
        let mut key_b = [9u8; 32];
        key_b[31] = 200;
        tree.insert(&key_a, &[0xaa; 32]).unwrap();
        tree.insert(&key_b, &[0xbb; 32]).unwrap();

        let store = MemStore::new();
        tree.flush(&store);

        let loaded = VerkleTree::load(&store).unwrap();
        assert_eq!(loaded.get(&key_a), Some([0xaa; 32]));
        assert_eq!(loaded.get(&key_b), Some([0xbb; 32]));
        assert_eq!(loaded.root_hash().unwrap(), tree.root_hash().unwrap());
    }
}
