//! Resampling of a merged [`PointCloud`] onto a regular grid.
//!
//! [`GridResampler::build`] runs the whole pipeline for one time step:
//! 1. lay out a [`GridSpec`] over the cloud's bounding box at spacing `dx`,
//! 2. index the cloud's `(x, y)` positions in a [`NeighborIndex`],
//! 3. blend the [`NEIGHBOR_COUNT`] nearest samples of every node with [`interpolate_idw`],
//! 4. derive the log-discharge grid and clip cumulative change if requested.
//!
//! The index lives only for the duration of one build.
use ndarray::Array2;
use tracing::{debug, warn};

use crate::cloud::PointCloud;
use crate::error::{Error, Result};
use crate::surface::SurfaceGrids;

pub mod grid;
pub mod idw;
pub mod index;

pub use grid::{GridSpec, Mesh, MAX_NODES};
pub use idw::{idw_value, interpolate_idw};
pub use index::{NeighborIndex, Neighborhood, NEIGHBOR_COUNT};

/// Parameters of a resampling run.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResampleOptions {
    /// Grid spacing in both axes, in model units.
    pub dx: f64,
    /// Optional `(lo, hi)` bounds applied to the gridded cumulative change.
    pub clip_range: Option<(f64, f64)>,
}

impl ResampleOptions {
    /// Creates options with the given grid spacing and no clipping.
    pub fn new(dx: f64) -> Self {
        Self {
            dx,
            clip_range: None,
        }
    }

    /// Sets the cumulative change clip range.
    pub fn with_clip_range(mut self, lo: f64, hi: f64) -> Self {
        self.clip_range = Some((lo, hi));
        self
    }

    /// Validates the options, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !(self.dx.is_finite() && self.dx > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "dx must be finite and > 0, got {}",
                self.dx
            )));
        }
        if let Some((lo, hi)) = self.clip_range {
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return Err(Error::InvalidConfig(format!(
                    "clip range must satisfy lo <= hi, got ({lo}, {hi})"
                )));
            }
        }
        Ok(())
    }
}

/// Resamples point clouds onto regular grids with fixed options.
#[derive(Debug, Clone)]
pub struct GridResampler {
    options: ResampleOptions,
}

impl GridResampler {
    pub fn try_new(options: ResampleOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn new(options: ResampleOptions) -> Self {
        debug_assert!(options.validate().is_ok(), "invalid resample options");
        Self { options }
    }

    pub fn options(&self) -> &ResampleOptions {
        &self.options
    }

    /// Grids elevation, log-discharge and cumulative change of `cloud`.
    ///
    /// Calling this twice with the same cloud yields identical grids.
    pub fn build(&self, cloud: &PointCloud) -> Result<SurfaceGrids> {
        self.options.validate()?;

        let bbox = cloud
            .bounds()
            .ok_or_else(|| Error::data_unavailable("merged point cloud", "no points to grid"))?;
        if let Some((i, p)) = cloud
            .positions()
            .iter()
            .enumerate()
            .find(|(_, p)| !p.truncate().is_finite())
        {
            return Err(Error::InvalidConfig(format!(
                "point {i} has non-finite coordinates ({}, {})",
                p.x, p.y
            )));
        }
        let grid = GridSpec::covering(bbox, self.options.dx)?;
        debug!(
            "Resampling {} points onto {}x{} nodes (dx = {}).",
            cloud.len(),
            grid.nx,
            grid.ny,
            grid.dx
        );

        let mesh = grid.mesh();
        let queries = mesh.query_points();

        let index = NeighborIndex::build(cloud.positions());
        if index.len() < NEIGHBOR_COUNT {
            warn!(
                "Only {} source points; interpolating with fewer than {} neighbors.",
                index.len(),
                NEIGHBOR_COUNT
            );
        }
        let neighborhoods = index.query_all(&queries);

        let elevation = cloud.elevation();
        let mut fields = interpolate_idw(
            &neighborhoods,
            &[
                elevation.as_slice(),
                cloud.discharge(),
                cloud.cumulative_change(),
            ],
        )
        .into_iter();

        let shape = grid.shape();
        let mut next_grid = || -> Result<Array2<f64>> {
            let values = fields
                .next()
                .ok_or_else(|| Error::Other("interpolation produced too few fields".into()))?;
            Array2::from_shape_vec(shape, values)
                .map_err(|e| Error::Other(format!("cannot reshape interpolated field: {e}")))
        };
        let elevation = next_grid()?;
        let discharge = next_grid()?;
        let cumulative_change = next_grid()?;

        let discharge_log = discharge.mapv_into(|d| if d < 1.0 { 0.0 } else { d.ln() });
        let cumulative_change = match self.options.clip_range {
            Some((lo, hi)) => cumulative_change.mapv_into(|c| c.clamp(lo, hi)),
            None => cumulative_change,
        };

        Ok(SurfaceGrids::new(
            grid,
            mesh,
            elevation,
            discharge_log,
            cumulative_change,
        ))
    }
}

/// Builds grids for `cloud` with the given options.
pub fn resample(cloud: &PointCloud, options: ResampleOptions) -> Result<SurfaceGrids> {
    GridResampler::try_new(options)?.build(cloud)
}
