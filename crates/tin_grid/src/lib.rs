#![forbid(unsafe_code)]
//! tin_grid: resample sharded TIN surface outputs of landscape-evolution runs onto regular grids.
//!
//! Modules:
//! - shard: storage seam and the merge of per-process shards into one point cloud
//! - cloud: merged point cloud and bounding box
//! - resample: grid layout, nearest-neighbor index and inverse-distance weighting
//! - surface: immutable gridded snapshot, field selection and renderer views
//! - loader: configuration and time-step loading on top of the above
pub mod cloud;
pub mod error;
pub mod loader;
pub mod resample;
pub mod shard;
pub mod surface;

/// Convenient re-exports for common types. Import with `use tin_grid::prelude::*;`.
pub mod prelude {
    pub use crate::cloud::{BoundingBox, PointCloud};
    pub use crate::error::{Error, Result};
    pub use crate::loader::{LoadConfig, SurfaceLoader};
    pub use crate::resample::{
        interpolate_idw, resample, GridResampler, GridSpec, Mesh, NeighborIndex, Neighborhood,
        ResampleOptions, NEIGHBOR_COUNT,
    };
    #[cfg(feature = "json")]
    pub use crate::shard::JsonShardSource;
    pub use crate::shard::{
        merge_shards, MemoryShardSource, ScalarArray, ShardFields, ShardKey, ShardMerger,
        ShardSource,
    };
    pub use crate::surface::{FieldKind, SampledSurface, SurfaceGrids, SurfaceView};
}
