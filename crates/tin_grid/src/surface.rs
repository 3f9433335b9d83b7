//! Gridded surface snapshot and the read-only views handed to renderers.
//!
//! [`SurfaceGrids`] is produced by [`crate::resample::GridResampler::build`] and never mutated
//! afterwards. A renderer picks one field with [`FieldKind`] (parsed from `"z"`, `"d"` or
//! `"c"`) and receives a [`SurfaceView`] borrowing the mesh and the selected grid.
use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView2, AxisDescription, Slice};

use crate::cloud::BoundingBox;
use crate::error::{Error, Result};
use crate::resample::grid::{GridSpec, Mesh};

/// Selects one of the gridded fields of a [`SurfaceGrids`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldKind {
    /// Surface elevation.
    Elevation,
    /// Natural log of discharge floored at 1.
    DischargeLog,
    /// Cumulative erosion/deposition, clipped when a clip range was configured.
    CumulativeChange,
}

impl FieldKind {
    pub const ALL: [FieldKind; 3] = [
        FieldKind::Elevation,
        FieldKind::DischargeLog,
        FieldKind::CumulativeChange,
    ];

    /// Short selector accepted by [`FromStr`].
    pub fn selector(self) -> &'static str {
        match self {
            FieldKind::Elevation => "z",
            FieldKind::DischargeLog => "d",
            FieldKind::CumulativeChange => "c",
        }
    }

    /// Plot caption for the field at `time_step`.
    pub fn title(self, time_step: u32) -> String {
        match self {
            FieldKind::Elevation => format!("Model elevation at timestep:{time_step}"),
            FieldKind::DischargeLog => {
                format!("Model discharge (log-scale) at timestep:{time_step}")
            }
            FieldKind::CumulativeChange => {
                format!("Model cumulative elevation change at timestep:{time_step}")
            }
        }
    }
}

impl FromStr for FieldKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "z" | "elevation" => Ok(FieldKind::Elevation),
            "d" | "discharge" => Ok(FieldKind::DischargeLog),
            "c" | "cumchange" | "cumulative_change" => Ok(FieldKind::CumulativeChange),
            other => Err(Error::UnknownField {
                id: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Elevation => "elevation",
            FieldKind::DischargeLog => "discharge",
            FieldKind::CumulativeChange => "cumchange",
        };
        f.write_str(name)
    }
}

/// Immutable result of resampling one time step onto a regular grid.
///
/// Every array has shape `(ny, nx)` and is aligned with the mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceGrids {
    grid: GridSpec,
    mesh: Mesh,
    elevation: Array2<f64>,
    discharge_log: Array2<f64>,
    cumulative_change: Array2<f64>,
}

impl SurfaceGrids {
    pub(crate) fn new(
        grid: GridSpec,
        mesh: Mesh,
        elevation: Array2<f64>,
        discharge_log: Array2<f64>,
        cumulative_change: Array2<f64>,
    ) -> Self {
        debug_assert_eq!(mesh.x.dim(), grid.shape());
        debug_assert_eq!(elevation.dim(), grid.shape());
        debug_assert_eq!(discharge_log.dim(), grid.shape());
        debug_assert_eq!(cumulative_change.dim(), grid.shape());
        Self {
            grid,
            mesh,
            elevation,
            discharge_log,
            cumulative_change,
        }
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn bbox(&self) -> BoundingBox {
        self.grid.bbox
    }

    /// `(ny, nx)`.
    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    /// X coordinate of every node.
    pub fn x(&self) -> &Array2<f64> {
        &self.mesh.x
    }

    /// Y coordinate of every node.
    pub fn y(&self) -> &Array2<f64> {
        &self.mesh.y
    }

    pub fn elevation(&self) -> &Array2<f64> {
        &self.elevation
    }

    pub fn discharge_log(&self) -> &Array2<f64> {
        &self.discharge_log
    }

    pub fn cumulative_change(&self) -> &Array2<f64> {
        &self.cumulative_change
    }

    /// The grid selected by `kind`.
    pub fn field(&self, kind: FieldKind) -> &Array2<f64> {
        match kind {
            FieldKind::Elevation => &self.elevation,
            FieldKind::DischargeLog => &self.discharge_log,
            FieldKind::CumulativeChange => &self.cumulative_change,
        }
    }

    /// Read-only view of the mesh and the grid selected by `kind`.
    pub fn view(&self, kind: FieldKind) -> SurfaceView<'_> {
        SurfaceView {
            kind,
            bbox: self.grid.bbox,
            x: self.mesh.x.view(),
            y: self.mesh.y.view(),
            values: self.field(kind).view(),
        }
    }
}

/// Borrowed mesh plus one selected field, as consumed by a surface renderer.
#[derive(Clone, Debug)]
pub struct SurfaceView<'a> {
    pub kind: FieldKind,
    pub bbox: BoundingBox,
    pub x: ArrayView2<'a, f64>,
    pub y: ArrayView2<'a, f64>,
    pub values: ArrayView2<'a, f64>,
}

/// Owned copy of every `step`-th row and column of a [`SurfaceView`].
#[derive(Clone, Debug, PartialEq)]
pub struct SampledSurface {
    pub x: Array2<f64>,
    pub y: Array2<f64>,
    pub values: Array2<f64>,
}

impl SurfaceView<'_> {
    /// Keeps every `step`-th row and column, starting with the first.
    pub fn subsample(&self, step: usize) -> Result<SampledSurface> {
        if step == 0 {
            return Err(Error::InvalidConfig("subsample step must be > 0".into()));
        }
        let every = |_: AxisDescription| Slice::new(0, None, step as isize);
        Ok(SampledSurface {
            x: self.x.slice_each_axis(every).to_owned(),
            y: self.y.slice_each_axis(every).to_owned(),
            values: self.values.slice_each_axis(every).to_owned(),
        })
    }

    /// Smallest and largest finite value of the selected field, or `None` if there are none.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// X and Y axis ranges with equal span, padding the shorter side around the bounding box.
    pub fn axis_ranges(&self) -> ([f64; 2], [f64; 2]) {
        let [xmin, ymin, xmax, ymax] = self.bbox.to_array();
        let (dx, dy) = (xmax - xmin, ymax - ymin);
        if dx >= dy {
            let pad = 0.5 * (dx - dy);
            ([xmin, xmax], [ymin - pad, ymax + pad])
        } else {
            let pad = 0.5 * (dy - dx);
            ([xmin - pad, xmax + pad], [ymin, ymax])
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;

    fn sample_grids() -> SurfaceGrids {
        let bbox = BoundingBox {
            min: DVec2::new(0.0, 0.0),
            max: DVec2::new(4.0, 2.0),
        };
        let grid = GridSpec::covering(bbox, 1.0).unwrap();
        let mesh = grid.mesh();
        let elevation = Array2::from_shape_fn(grid.shape(), |(j, i)| (j * 10 + i) as f64);
        let discharge_log = Array2::zeros(grid.shape());
        let cumulative_change = Array2::from_elem(grid.shape(), -0.5);
        SurfaceGrids::new(grid, mesh, elevation, discharge_log, cumulative_change)
    }

    #[test]
    fn selectors_parse_short_and_long_names() {
        assert_eq!("z".parse::<FieldKind>().unwrap(), FieldKind::Elevation);
        assert_eq!("d".parse::<FieldKind>().unwrap(), FieldKind::DischargeLog);
        assert_eq!(
            "cumchange".parse::<FieldKind>().unwrap(),
            FieldKind::CumulativeChange
        );
        for kind in FieldKind::ALL {
            assert_eq!(kind.selector().parse::<FieldKind>().unwrap(), kind);
            assert_eq!(kind.to_string().parse::<FieldKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_selector_is_config_error() {
        let err = "q".parse::<FieldKind>().unwrap_err();
        assert!(err.is_config());
        assert!(matches!(err, Error::UnknownField { ref id } if id == "q"));
    }

    #[test]
    fn view_selects_requested_field() {
        let grids = sample_grids();
        let view = grids.view(FieldKind::CumulativeChange);
        assert_eq!(view.values.dim(), (3, 5));
        assert!(view.values.iter().all(|&v| v == -0.5));
        assert_eq!(view.x[[0, 4]], 4.0);
        assert_eq!(view.y[[2, 0]], 2.0);
    }

    #[test]
    fn subsample_keeps_first_and_every_nth() {
        let grids = sample_grids();
        let sampled = grids.view(FieldKind::Elevation).subsample(2).unwrap();
        assert_eq!(sampled.values.dim(), (2, 3));
        assert_eq!(sampled.values.row(1).to_vec(), vec![20.0, 22.0, 24.0]);
        assert_eq!(sampled.x.row(0).to_vec(), vec![0.0, 2.0, 4.0]);

        let coarse = grids.view(FieldKind::Elevation).subsample(3).unwrap();
        assert_eq!(coarse.values.dim(), (1, 2));
        assert_eq!(coarse.values.row(0).to_vec(), vec![0.0, 3.0]);
        assert_eq!(coarse.y.column(1).to_vec(), vec![0.0]);

        let single = grids.view(FieldKind::Elevation).subsample(10).unwrap();
        assert_eq!(single.values.dim(), (1, 1));

        let err = grids.view(FieldKind::Elevation).subsample(0).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn value_range_spans_selected_field() {
        let grids = sample_grids();
        assert_eq!(
            grids.view(FieldKind::Elevation).value_range(),
            Some((0.0, 24.0))
        );
    }

    #[test]
    fn axis_ranges_pad_the_shorter_side() {
        let grids = sample_grids();
        let (xr, yr) = grids.view(FieldKind::Elevation).axis_ranges();
        assert_eq!(xr, [0.0, 4.0]);
        assert_eq!(yr, [-1.0, 3.0]);
    }

    #[test]
    fn titles_name_the_time_step() {
        assert_eq!(
            FieldKind::DischargeLog.title(7),
            "Model discharge (log-scale) at timestep:7"
        );
    }
}
