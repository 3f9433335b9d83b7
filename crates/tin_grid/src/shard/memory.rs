//! In-memory shard storage.
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::shard::{ShardFields, ShardKey, ShardSource};

/// Registry of shard fields keyed by `(time_step, shard)`.
///
/// The base path of a [`ShardKey`] is not part of the lookup; one registry stands for one
/// output folder.
#[derive(Clone, Debug, Default)]
pub struct MemoryShardSource {
    shards: HashMap<(u32, u32), ShardFields>,
}

impl MemoryShardSource {
    /// Creates a new, empty source.
    pub fn new() -> Self {
        Self {
            shards: HashMap::new(),
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            shards: HashMap::with_capacity(n),
        }
    }

    /// Returns the number of stored shards across all time steps.
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    /// Returns `true` if no shards are stored.
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// Removes all stored shards.
    pub fn clear(&mut self) {
        self.shards.clear();
    }

    /// Stores the fields of one shard, replacing any previous entry.
    pub fn insert(&mut self, time_step: u32, shard: u32, fields: ShardFields) {
        self.shards.insert((time_step, shard), fields);
    }

    /// Removes one shard. Returns `true` if it was present.
    pub fn remove(&mut self, time_step: u32, shard: u32) -> bool {
        self.shards.remove(&(time_step, shard)).is_some()
    }

    pub fn contains(&self, time_step: u32, shard: u32) -> bool {
        self.shards.contains_key(&(time_step, shard))
    }

    /// Number of consecutive shards stored for `time_step`, starting at shard 0.
    pub fn shard_count(&self, time_step: u32) -> u32 {
        (0..).take_while(|&i| self.contains(time_step, i)).count() as u32
    }
}

impl ShardSource for MemoryShardSource {
    fn read_shard(&self, key: &ShardKey) -> Result<ShardFields> {
        self.shards
            .get(&(key.time_step, key.shard))
            .cloned()
            .ok_or_else(|| Error::data_unavailable(key, "shard not stored"))
    }
}
