//! JSON shard files: `<base>/tin.time{t}.p{i}.json`.
//!
//! Each file holds one object:
//!
//! ```text
//! {
//!   "coords":    [[x, y, z], ...],
//!   "cumdiff":   [v, ...]  or  [[v], ...],
//!   "discharge": [v, ...]  or  [[v], ...]
//! }
//! ```
use std::fs::{self, File};
use std::io::{BufWriter, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::shard::{ScalarArray, ShardFields, ShardKey, ShardSource};

const EXTENSION: &str = "json";

#[derive(Serialize, Deserialize)]
struct ShardFile {
    coords: Vec<[f64; 3]>,
    cumdiff: ScalarArray,
    discharge: ScalarArray,
}

/// Reads and writes shards stored as JSON files next to each other in the output folder.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonShardSource;

impl JsonShardSource {
    pub fn new() -> Self {
        Self
    }

    /// Writes `fields` to the file addressed by `key`, creating or truncating it.
    pub fn write_shard(&self, key: &ShardKey, fields: &ShardFields) -> Result<()> {
        let file = ShardFile {
            coords: fields.coords.iter().map(|c| [c.x, c.y, c.z]).collect(),
            cumdiff: fields.cumdiff.clone(),
            discharge: fields.discharge.clone(),
        };
        let path = key.path(EXTENSION);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(&mut writer, &file)
            .map_err(|e| Error::Other(format!("failed to write '{}': {e}", path.display())))?;
        writer.flush()?;
        debug!("Wrote {} points to '{}'.", fields.len(), path.display());
        Ok(())
    }
}

impl ShardSource for JsonShardSource {
    fn read_shard(&self, key: &ShardKey) -> Result<ShardFields> {
        let path = key.path(EXTENSION);
        let text =
            fs::read_to_string(&path).map_err(|e| Error::data_unavailable(key, e.to_string()))?;
        let file: ShardFile = serde_json::from_str(&text)
            .map_err(|e| Error::data_unavailable(key, format!("malformed shard file: {e}")))?;

        let coords = file
            .coords
            .into_iter()
            .map(|[x, y, z]| mint::Vector3 { x, y, z })
            .collect();
        Ok(ShardFields {
            coords,
            cumdiff: file.cumdiff,
            discharge: file.discharge,
        })
    }
}
