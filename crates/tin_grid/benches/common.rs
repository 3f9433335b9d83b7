use std::time::Duration;

use criterion::{Criterion, Throughput};
use glam::DVec3;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tin_grid::cloud::PointCloud;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Random TIN-like cloud over `[0, extent]^2` with a smooth hill for elevation.
#[allow(dead_code)]
pub fn random_cloud(points: usize, extent: f64, seed: u64) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut cloud = PointCloud::with_capacity(points);
    for _ in 0..points {
        let x = rng.random::<f64>() * extent;
        let y = rng.random::<f64>() * extent;
        let r = ((x - extent * 0.5).powi(2) + (y - extent * 0.5).powi(2)).sqrt();
        let z = (extent * 0.5 - r).max(0.0);
        cloud.push(DVec3::new(x, y, z), rng.random::<f64>() * 100.0, rng.random_range(-5.0..5.0));
    }
    cloud
}
