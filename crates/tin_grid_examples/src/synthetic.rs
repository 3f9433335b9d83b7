//! Synthetic sharded TIN outputs for the demos.
use std::path::Path;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tin_grid::prelude::*;

/// Parameters of a fake landscape-evolution output: a dome cut by a valley, split into
/// vertical stripes, one per shard.
#[derive(Clone, Debug)]
pub struct SyntheticRun {
    /// Side length of the square domain.
    pub extent: f64,
    /// Number of TIN nodes before partitioning.
    pub points: usize,
    /// Number of shards (stripes along X).
    pub shards: u32,
    /// Width of the band on each stripe edge copied into the neighbor stripe.
    pub overlap: f64,
    pub seed: u64,
}

impl Default for SyntheticRun {
    fn default() -> Self {
        Self {
            extent: 10_000.0,
            points: 40_000,
            shards: 4,
            overlap: 100.0,
            seed: 42,
        }
    }
}

impl SyntheticRun {
    /// Writes every shard of `time_step` as JSON into `dir`.
    pub fn write_json(&self, dir: &Path, time_step: u32) -> anyhow::Result<()> {
        let source = JsonShardSource::new();
        for (shard, fields) in synthetic_shards(self, time_step).into_iter().enumerate() {
            source.write_shard(&ShardKey::new(dir, time_step, shard as u32), &fields)?;
        }
        Ok(())
    }
}

/// Generates the shards of one time step. Later time steps carve the valley deeper.
pub fn synthetic_shards(run: &SyntheticRun, time_step: u32) -> Vec<ShardFields> {
    let mut rng = StdRng::seed_from_u64(run.seed);
    let shards = run.shards.max(1);
    let stripe = run.extent / shards as f64;
    let erosion = 1.0 + time_step as f64 * 0.5;

    let mut parts: Vec<ShardFields> = (0..shards)
        .map(|_| ShardFields::new(Vec::new(), Vec::<f64>::new(), Vec::<f64>::new()))
        .collect();

    for _ in 0..run.points {
        let x = rng.random::<f64>() * run.extent;
        let y = rng.random::<f64>() * run.extent;
        let (z, discharge, cumdiff) = landscape(x, y, run.extent, erosion);

        let owner = ((x / stripe) as u32).min(shards - 1);
        let mut targets = vec![owner];
        if owner > 0 && x - owner as f64 * stripe < run.overlap {
            targets.push(owner - 1);
        }
        if owner + 1 < shards && (owner + 1) as f64 * stripe - x < run.overlap {
            targets.push(owner + 1);
        }

        for t in targets {
            let part = &mut parts[t as usize];
            part.coords.push(mint::Vector3 { x, y, z });
            if let ScalarArray::Flat(v) = &mut part.cumdiff {
                v.push(cumdiff);
            }
            if let ScalarArray::Flat(v) = &mut part.discharge {
                v.push(discharge);
            }
        }
    }
    parts
}

/// Elevation, discharge and cumulative change at `(x, y)`.
fn landscape(x: f64, y: f64, extent: f64, erosion: f64) -> (f64, f64, f64) {
    let c = extent * 0.5;
    let r = ((x - c).powi(2) + (y - c).powi(2)).sqrt() / c;
    let dome = 800.0 * (1.0 - r.min(1.0)).powi(2);

    let valley_axis = c + 0.15 * extent * (x / extent * std::f64::consts::TAU).sin();
    let d = ((y - valley_axis) / (0.05 * extent)).powi(2);
    let incision = 150.0 * erosion * (-d).exp();

    let z = dome - incision;
    let discharge = 5_000.0 * (x / extent) * (-d).exp();
    let cumdiff = -incision * 0.2 + 10.0 * (1.0 - r.min(1.0)) * (-d * 4.0).exp();
    (z, discharge, cumdiff)
}
