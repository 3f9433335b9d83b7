//! High-level loader that merges and resamples one time step of a simulation run.
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::error::{Error, Result};
use crate::resample::{GridResampler, ResampleOptions};
use crate::shard::{merge_shards, ShardSource};
use crate::surface::{FieldKind, SurfaceGrids, SurfaceView};

/// Configuration for loading gridded surfaces from a run's output folder.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadConfig {
    /// Output folder of the simulation run.
    pub folder: PathBuf,
    /// Number of shards (worker processes) written per time step.
    pub shard_count: u32,
    /// Grid spacing in model units. Required.
    pub dx: Option<f64>,
    /// Time step loaded by [`SurfaceLoader::load`].
    pub time_step: u32,
    /// Optional `(lo, hi)` bounds for the cumulative change grid.
    pub clip_range: Option<(f64, f64)>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::new(),
            shard_count: 1,
            dx: None,
            time_step: 0,
            clip_range: None,
        }
    }
}

impl LoadConfig {
    /// Creates a new [`LoadConfig`] for the given output folder.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            ..Default::default()
        }
    }

    /// Sets the number of shards per time step.
    pub fn with_shard_count(mut self, shard_count: u32) -> Self {
        self.shard_count = shard_count;
        self
    }

    /// Sets the grid spacing.
    pub fn with_dx(mut self, dx: f64) -> Self {
        self.dx = Some(dx);
        self
    }

    /// Sets the time step to load.
    pub fn with_time_step(mut self, time_step: u32) -> Self {
        self.time_step = time_step;
        self
    }

    /// Sets the cumulative change clip range.
    pub fn with_clip_range(mut self, lo: f64, hi: f64) -> Self {
        self.clip_range = Some((lo, hi));
        self
    }

    /// Resampling options derived from this configuration.
    pub fn resample_options(&self) -> Result<ResampleOptions> {
        let dx = self
            .dx
            .ok_or_else(|| Error::InvalidConfig("discretization value dx is required".into()))?;
        let options = ResampleOptions {
            dx,
            clip_range: self.clip_range,
        };
        options.validate()?;
        Ok(options)
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.folder.is_dir() {
            return Err(Error::InvalidConfig(format!(
                "output folder '{}' cannot be found or the path is incomplete",
                self.folder.display()
            )));
        }
        if self.shard_count == 0 {
            return Err(Error::InvalidConfig("shard_count must be > 0".into()));
        }
        self.resample_options()?;
        Ok(())
    }
}

/// Loads time steps of one simulation run and keeps the latest gridded surface.
///
/// A failed load leaves the previously loaded surface in place.
pub struct SurfaceLoader {
    config: LoadConfig,
    source: Box<dyn ShardSource>,
    current: Option<Arc<SurfaceGrids>>,
}

impl SurfaceLoader {
    /// Validates `config` without reading any shard.
    pub fn try_new(config: LoadConfig, source: Box<dyn ShardSource>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            current: None,
        })
    }

    /// Like [`SurfaceLoader::try_new`] with a concrete source.
    pub fn try_new_with<S: ShardSource + 'static>(config: LoadConfig, source: S) -> Result<Self> {
        Self::try_new(config, Box::new(source))
    }

    /// Validates `config` and loads its time step.
    pub fn open(config: LoadConfig, source: Box<dyn ShardSource>) -> Result<Self> {
        let mut loader = Self::try_new(config, source)?;
        loader.load()?;
        Ok(loader)
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Time step of the configuration (and of the current surface once loaded).
    pub fn time_step(&self) -> u32 {
        self.config.time_step
    }

    /// The most recently loaded surface, if any.
    pub fn current(&self) -> Option<Arc<SurfaceGrids>> {
        self.current.clone()
    }

    /// Loads the configured time step, replacing the current surface on success.
    pub fn load(&mut self) -> Result<Arc<SurfaceGrids>> {
        let grids = Arc::new(self.build(self.config.time_step)?);
        self.current = Some(grids.clone());
        Ok(grids)
    }

    /// Loads `time_step` and makes it the configured time step on success.
    pub fn load_time_step(&mut self, time_step: u32) -> Result<Arc<SurfaceGrids>> {
        let grids = Arc::new(self.build(time_step)?);
        self.config.time_step = time_step;
        self.current = Some(grids.clone());
        Ok(grids)
    }

    /// View of the current surface for the field named by `selector` (`"z"`, `"d"` or `"c"`).
    pub fn view(&self, selector: &str) -> Result<SurfaceView<'_>> {
        let kind: FieldKind = selector.parse()?;
        let grids = self
            .current
            .as_deref()
            .ok_or_else(|| Error::InvalidConfig("no time step has been loaded".into()))?;
        Ok(grids.view(kind))
    }

    fn build(&self, time_step: u32) -> Result<SurfaceGrids> {
        let options = self.config.resample_options()?;
        info!(
            "Loading time step {} from {} shard(s) in '{}'.",
            time_step,
            self.config.shard_count,
            self.config.folder.display()
        );

        let cloud = merge_shards(
            self.source.as_ref(),
            &self.config.folder,
            time_step,
            self.config.shard_count,
        )?;
        let grids = GridResampler::try_new(options)?.build(&cloud)?;

        let (ny, nx) = grids.shape();
        info!(
            "Gridded {} points of time step {} onto {}x{} nodes.",
            cloud.len(),
            time_step,
            nx,
            ny
        );
        Ok(grids)
    }
}
