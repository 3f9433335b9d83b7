//! Shard storage seam and the merge step that concatenates shards into one [`PointCloud`].
//!
//! A simulation run writes one file per worker process and time step. This module defines
//! how those partitions are addressed ([`ShardKey`]), what a reader must return
//! ([`ShardFields`]), and how they are merged:
//! - Implement [`ShardSource`] to plug in a storage backend.
//! - Use [`MemoryShardSource`] for in-process data and tests.
//! - Use `JsonShardSource` (feature `json`) for files on disk.
//! - Call [`merge_shards`] or [`ShardMerger::merge`] to build the merged cloud.
use std::fmt;
use std::path::{Path, PathBuf};

use glam::DVec3;
use tracing::debug;

use crate::cloud::PointCloud;
use crate::error::{Error, Result};

#[cfg(feature = "json")]
pub mod json;
pub mod memory;

#[cfg(feature = "json")]
pub use json::JsonShardSource;
pub use memory::MemoryShardSource;

/// Address of one shard of one time step under a run's output folder.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShardKey {
    /// Output folder of the simulation run.
    pub base_path: PathBuf,
    /// Time step index.
    pub time_step: u32,
    /// Shard (worker process) index.
    pub shard: u32,
}

impl ShardKey {
    pub fn new(base_path: impl Into<PathBuf>, time_step: u32, shard: u32) -> Self {
        Self {
            base_path: base_path.into(),
            time_step,
            shard,
        }
    }

    /// File stem shared by every storage format, e.g. `tin.time3.p1`.
    pub fn stem(&self) -> String {
        format!("tin.time{}.p{}", self.time_step, self.shard)
    }

    /// File name for the given extension, e.g. `tin.time3.p1.json`.
    pub fn file_name(&self, ext: &str) -> String {
        format!("{}.{}", self.stem(), ext)
    }

    /// Full path of the shard file for the given extension.
    pub fn path(&self, ext: &str) -> PathBuf {
        self.base_path.join(self.file_name(ext))
    }
}

impl fmt::Display for ShardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_path.join(self.stem()).display())
    }
}

/// A per-point scalar in the shape the writer stored it: flat `N` or column `N x 1`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum ScalarArray {
    Flat(Vec<f64>),
    Column(Vec<[f64; 1]>),
}

impl ScalarArray {
    /// Number of values regardless of shape.
    pub fn len(&self) -> usize {
        match self {
            ScalarArray::Flat(v) => v.len(),
            ScalarArray::Column(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattens the values into a plain vector.
    pub fn into_flat(self) -> Vec<f64> {
        match self {
            ScalarArray::Flat(v) => v,
            ScalarArray::Column(v) => v.into_iter().map(|[x]| x).collect(),
        }
    }
}

impl From<Vec<f64>> for ScalarArray {
    fn from(value: Vec<f64>) -> Self {
        ScalarArray::Flat(value)
    }
}

/// Fields read from one shard: TIN node coordinates plus cumulative change and discharge.
#[derive(Clone, Debug, PartialEq)]
pub struct ShardFields {
    /// Node coordinates `(x, y, z)`; `z` is elevation.
    pub coords: Vec<mint::Vector3<f64>>,
    /// Cumulative elevation change per node.
    pub cumdiff: ScalarArray,
    /// Flow discharge per node.
    pub discharge: ScalarArray,
}

impl ShardFields {
    pub fn new(
        coords: Vec<mint::Vector3<f64>>,
        cumdiff: impl Into<ScalarArray>,
        discharge: impl Into<ScalarArray>,
    ) -> Self {
        Self {
            coords,
            cumdiff: cumdiff.into(),
            discharge: discharge.into(),
        }
    }

    /// Number of nodes in the shard.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    fn into_cloud(self, key: &ShardKey) -> Result<PointCloud> {
        let n = self.coords.len();
        if self.cumdiff.len() != n || self.discharge.len() != n {
            return Err(Error::data_unavailable(
                key,
                format!(
                    "field lengths differ (coords {}, cumdiff {}, discharge {})",
                    n,
                    self.cumdiff.len(),
                    self.discharge.len()
                ),
            ));
        }
        let positions = self.coords.into_iter().map(DVec3::from).collect();
        PointCloud::try_from_parts(
            positions,
            self.discharge.into_flat(),
            self.cumdiff.into_flat(),
        )
    }
}

/// Storage backend that returns the fields of one shard.
///
/// Missing or unreadable shards must be reported as [`Error::DataUnavailable`], never as an
/// empty [`ShardFields`].
pub trait ShardSource: Send + Sync {
    fn read_shard(&self, key: &ShardKey) -> Result<ShardFields>;
}

/// Merges the shards of one time step read through a [`ShardSource`].
pub struct ShardMerger<'a> {
    source: &'a dyn ShardSource,
}

impl<'a> ShardMerger<'a> {
    pub fn new(source: &'a dyn ShardSource) -> Self {
        Self { source }
    }

    /// Reads shards `0..shard_count` of `time_step` and concatenates them.
    pub fn merge(&self, base_path: &Path, time_step: u32, shard_count: u32) -> Result<PointCloud> {
        merge_shards(self.source, base_path, time_step, shard_count)
    }
}

/// Reads shards `0..shard_count` of `time_step` under `base_path` and concatenates them in
/// shard order.
///
/// Coincident points from different shards are kept as independent samples. The merged cloud
/// is only returned once every shard has been read and checked.
pub fn merge_shards(
    source: &dyn ShardSource,
    base_path: &Path,
    time_step: u32,
    shard_count: u32,
) -> Result<PointCloud> {
    if !base_path.is_dir() {
        return Err(Error::InvalidConfig(format!(
            "output folder '{}' cannot be found",
            base_path.display()
        )));
    }
    if shard_count == 0 {
        return Err(Error::InvalidConfig("shard_count must be > 0".into()));
    }

    let mut merged = PointCloud::new();
    for shard in 0..shard_count {
        let key = ShardKey::new(base_path, time_step, shard);
        let part = source.read_shard(&key)?.into_cloud(&key)?;
        debug!("Read {} points from shard {}.", part.len(), key);
        merged.extend_from(&part);
    }
    Ok(merged)
}
