//! PNG heatmaps of gridded surface fields.
use std::path::Path;

use anyhow::{ensure, Context};
use image::{Rgb, RgbImage};
use tin_grid::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Piecewise-linear color ramp over evenly spaced stops.
#[derive(Clone, Debug)]
pub struct ColorScale {
    stops: Vec<[u8; 3]>,
}

impl ColorScale {
    pub fn try_new(stops: Vec<[u8; 3]>) -> anyhow::Result<Self> {
        ensure!(!stops.is_empty(), "color scale needs at least one stop");
        Ok(Self { stops })
    }

    /// Yellow-green-blue ramp.
    pub fn yl_gn_bu() -> Self {
        Self {
            stops: vec![
                [255, 255, 217],
                [199, 233, 180],
                [65, 182, 196],
                [34, 94, 168],
                [8, 29, 88],
            ],
        }
    }

    /// Diverging blue-white-red ramp for erosion/deposition.
    pub fn rd_bu() -> Self {
        Self {
            stops: vec![[33, 102, 172], [247, 247, 247], [178, 24, 43]],
        }
    }

    pub fn reversed(mut self) -> Self {
        self.stops.reverse();
        self
    }

    /// Color at `t` in `[0, 1]`.
    pub fn sample(&self, t: f64) -> [u8; 3] {
        if self.stops.len() == 1 {
            return self.stops[0];
        }
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let pos = t * (self.stops.len() - 1) as f64;
        let i = (pos.floor() as usize).min(self.stops.len() - 2);
        let f = pos - i as f64;
        let (a, b) = (self.stops[i], self.stops[i + 1]);
        let mix = |k: usize| (a[k] as f64 + (b[k] as f64 - a[k] as f64) * f).round() as u8;
        [mix(0), mix(1), mix(2)]
    }
}

/// Options for [`render_view_to_png`].
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Pixels per grid node along each axis.
    pub pixels_per_node: u32,
    /// Keep every n-th row and column.
    pub subsample: usize,
    /// Value mapped to the ends of the color scale; defaults to the field's range.
    pub value_range: Option<(f64, f64)>,
    pub color_scale: ColorScale,
}

impl RenderConfig {
    pub fn new(color_scale: ColorScale) -> Self {
        Self {
            pixels_per_node: 1,
            subsample: 1,
            value_range: None,
            color_scale,
        }
    }

    pub fn with_pixels_per_node(mut self, pixels: u32) -> Self {
        self.pixels_per_node = pixels.max(1);
        self
    }

    pub fn with_subsample(mut self, step: usize) -> Self {
        self.subsample = step;
        self
    }

    pub fn with_value_range(mut self, lo: f64, hi: f64) -> Self {
        self.value_range = Some((lo, hi));
        self
    }
}

/// Writes the selected field of `view` as a heatmap with north (max y) at the top.
pub fn render_view_to_png(
    view: &SurfaceView<'_>,
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let sampled = view.subsample(config.subsample)?;
    let (lo, hi) = config
        .value_range
        .or_else(|| view.value_range())
        .context("field has no finite values to render")?;
    let span = if hi > lo { hi - lo } else { 1.0 };

    let (rows, cols) = sampled.values.dim();
    let scale = config.pixels_per_node;
    let img = RgbImage::from_fn(cols as u32 * scale, rows as u32 * scale, |px, py| {
        let col = (px / scale) as usize;
        let row = rows - 1 - (py / scale) as usize;
        let v = sampled.values[[row, col]];
        Rgb(config.color_scale.sample((v - lo) / span))
    });
    img.save(path)
        .with_context(|| format!("failed to write '{}'", path.display()))?;

    info!(
        "Rendered {} ({}x{} nodes, range [{:.3}, {:.3}]) to '{}'.",
        view.kind,
        cols,
        rows,
        lo,
        hi,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_color_scale_is_rejected() {
        assert!(ColorScale::try_new(Vec::new()).is_err());
        let single = ColorScale::try_new(vec![[1, 2, 3]]).unwrap();
        assert_eq!(single.sample(0.7), [1, 2, 3]);
    }

    #[test]
    fn scale_interpolates_between_stops() {
        let scale = ColorScale::try_new(vec![[0, 0, 0], [200, 100, 50]]).unwrap();
        assert_eq!(scale.sample(0.0), [0, 0, 0]);
        assert_eq!(scale.sample(0.5), [100, 50, 25]);
        assert_eq!(scale.sample(2.0), [200, 100, 50]);
        assert_eq!(scale.sample(f64::NAN), [0, 0, 0]);
        assert_eq!(scale.reversed().sample(0.0), [200, 100, 50]);
    }
}
