//! Regular output grid covering a point cloud's bounding box.
//!
//! [`GridSpec`] derives the node counts from the box and spacing; [`Mesh`] holds the explicit
//! x and y coordinate of every node as `(ny, nx)` arrays.
use glam::DVec2;
use ndarray::Array2;

use crate::cloud::BoundingBox;
use crate::error::{Error, Result};

/// Largest number of nodes [`GridSpec::covering`] lays out.
pub const MAX_NODES: usize = u32::MAX as usize;

/// Layout of a regular lattice of `nx * ny` nodes spanning a bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    /// Box covered by the grid; first and last nodes sit on its edges.
    pub bbox: BoundingBox,
    /// Requested node spacing in both axes.
    pub dx: f64,
    /// Node count along X.
    pub nx: usize,
    /// Node count along Y.
    pub ny: usize,
}

impl GridSpec {
    /// Lays out a grid over `bbox` with `nx = floor((xmax - xmin) / dx) + 1` and `ny` alike.
    pub fn covering(bbox: BoundingBox, dx: f64) -> Result<Self> {
        if !(dx.is_finite() && dx > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "grid spacing must be finite and > 0, got {dx}"
            )));
        }
        if bbox.is_empty() || !bbox.min.is_finite() || !bbox.max.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "cannot lay out a grid over bounding box {:?}",
                bbox.to_array()
            )));
        }

        let extent = bbox.extent();
        let too_large = || {
            Error::InvalidConfig(format!(
                "grid over {:?} at spacing {dx} exceeds {MAX_NODES} nodes",
                bbox.to_array()
            ))
        };
        let nx = axis_nodes(extent.x, dx).ok_or_else(too_large)?;
        let ny = axis_nodes(extent.y, dx).ok_or_else(too_large)?;
        match nx.checked_mul(ny) {
            Some(n) if n <= MAX_NODES => Ok(Self { bbox, dx, nx, ny }),
            _ => Err(too_large()),
        }
    }

    /// Array shape `(ny, nx)` shared by the mesh and every gridded field.
    pub fn shape(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nx * self.ny
    }

    /// Evenly spaced node positions along X.
    pub fn x_axis(&self) -> Vec<f64> {
        linspace(self.bbox.min.x, self.bbox.max.x, self.nx)
    }

    /// Evenly spaced node positions along Y.
    pub fn y_axis(&self) -> Vec<f64> {
        linspace(self.bbox.min.y, self.bbox.max.y, self.ny)
    }

    /// Full coordinate mesh of the grid.
    pub fn mesh(&self) -> Mesh {
        let xs = self.x_axis();
        let ys = self.y_axis();
        Mesh {
            x: Array2::from_shape_fn(self.shape(), |(_, i)| xs[i]),
            y: Array2::from_shape_fn(self.shape(), |(j, _)| ys[j]),
        }
    }
}

/// X and Y coordinate of every grid node, both shaped `(ny, nx)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub x: Array2<f64>,
    pub y: Array2<f64>,
}

impl Mesh {
    /// Node positions flattened in row-major order (X varies fastest).
    pub fn query_points(&self) -> Vec<DVec2> {
        self.x
            .iter()
            .zip(self.y.iter())
            .map(|(&x, &y)| DVec2::new(x, y))
            .collect()
    }
}

/// `floor(extent / dx) + 1`, or `None` past [`MAX_NODES`].
fn axis_nodes(extent: f64, dx: f64) -> Option<usize> {
    let steps = (extent / dx).floor();
    if !(steps.is_finite() && steps < MAX_NODES as f64) {
        return None;
    }
    (steps as usize).checked_add(1)
}

/// `n` evenly spaced values from `start` to `stop`. The last value is exactly `stop`.
pub(crate) fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            values[n - 1] = stop;
            values
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> BoundingBox {
        BoundingBox {
            min: DVec2::new(xmin, ymin),
            max: DVec2::new(xmax, ymax),
        }
    }

    #[test]
    fn node_counts_floor_extent_over_spacing() {
        let grid = GridSpec::covering(bbox(0.0, 0.0, 10.0, 4.5), 2.0).unwrap();
        assert_eq!((grid.nx, grid.ny), (6, 3));
        assert_eq!(grid.shape(), (3, 6));
        assert_eq!(grid.node_count(), 18);
    }

    #[test]
    fn degenerate_extent_yields_single_column() {
        let grid = GridSpec::covering(bbox(3.0, 0.0, 3.0, 2.0), 1.0).unwrap();
        assert_eq!((grid.nx, grid.ny), (1, 3));
        assert_eq!(grid.x_axis(), vec![3.0]);
    }

    #[test]
    fn non_positive_spacing_is_rejected() {
        for dx in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = GridSpec::covering(bbox(0.0, 0.0, 1.0, 1.0), dx).unwrap_err();
            assert!(err.is_config(), "dx = {dx}");
        }
    }

    #[test]
    fn oversized_grids_are_rejected() {
        let err = GridSpec::covering(bbox(0.0, 0.0, 1.0, 1.0), 1e-300).unwrap_err();
        assert!(err.is_config());

        // each axis fits but the product does not
        let err = GridSpec::covering(bbox(0.0, 0.0, 1e5, 1e5), 1e-3).unwrap_err();
        assert!(err.is_config());

        let grid = GridSpec::covering(bbox(0.0, 0.0, 1e5, 0.0), 1.0).unwrap();
        assert_eq!((grid.nx, grid.ny), (100_001, 1));
    }

    #[test]
    fn axes_hit_both_edges() {
        let grid = GridSpec::covering(bbox(-1.0, 2.0, 0.95, 3.0), 0.3).unwrap();
        let xs = grid.x_axis();
        assert_eq!(xs.len(), 7);
        assert_eq!(xs[0], -1.0);
        assert_eq!(xs[6], 0.95);
    }

    #[test]
    fn mesh_rows_share_y_and_columns_share_x() {
        let grid = GridSpec::covering(bbox(0.0, 10.0, 2.0, 11.0), 1.0).unwrap();
        let mesh = grid.mesh();
        assert_eq!(mesh.x.dim(), (2, 3));
        assert_eq!(mesh.x.row(1).to_vec(), vec![0.0, 1.0, 2.0]);
        assert_eq!(mesh.y.column(2).to_vec(), vec![10.0, 11.0]);

        let q = mesh.query_points();
        assert_eq!(q.len(), 6);
        assert_eq!(q[1], DVec2::new(1.0, 10.0));
        assert_eq!(q[3], DVec2::new(0.0, 11.0));
    }

    #[test]
    fn linspace_handles_small_counts() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(5.0, 9.0, 1), vec![5.0]);
        assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
    }
}
