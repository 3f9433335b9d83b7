//! Merged point cloud of TIN nodes and their co-indexed scalar fields.
//!
//! A [`PointCloud`] is produced by [`crate::shard::merge_shards`] and consumed read-only by
//! [`crate::resample::GridResampler`]. [`BoundingBox`] tracks the planar extent used to lay
//! out the output grid.
use glam::{DVec2, DVec3};

use crate::error::{Error, Result};

/// Axis-aligned planar extent `(xmin, ymin) .. (xmax, ymax)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl BoundingBox {
    /// Creates an empty box that any update will overwrite.
    pub fn empty() -> Self {
        Self {
            min: DVec2::splat(f64::INFINITY),
            max: DVec2::splat(f64::NEG_INFINITY),
        }
    }

    /// Grows the box to contain `p`.
    pub fn update(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Returns `true` until at least one point has been added.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Width and height of the box.
    pub fn extent(&self) -> DVec2 {
        self.max - self.min
    }

    /// The box as `[xmin, ymin, xmax, ymax]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }
}

/// TIN nodes with elevation carried in `z`, plus discharge and cumulative elevation change.
///
/// All three arrays share the same length and index alignment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloud {
    positions: Vec<DVec3>,
    discharge: Vec<f64>,
    cumulative_change: Vec<f64>,
}

impl PointCloud {
    /// Creates an empty cloud.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            positions: Vec::with_capacity(n),
            discharge: Vec::with_capacity(n),
            cumulative_change: Vec::with_capacity(n),
        }
    }

    /// Builds a cloud from pre-assembled arrays, rejecting misaligned lengths.
    pub fn try_from_parts(
        positions: Vec<DVec3>,
        discharge: Vec<f64>,
        cumulative_change: Vec<f64>,
    ) -> Result<Self> {
        let n = positions.len();
        if discharge.len() != n || cumulative_change.len() != n {
            return Err(Error::InvalidConfig(format!(
                "point cloud arrays must share one length (positions {}, discharge {}, cumulative change {})",
                n,
                discharge.len(),
                cumulative_change.len()
            )));
        }
        Ok(Self {
            positions,
            discharge,
            cumulative_change,
        })
    }

    /// Appends a single sample.
    pub fn push(&mut self, position: DVec3, discharge: f64, cumulative_change: f64) {
        self.positions.push(position);
        self.discharge.push(discharge);
        self.cumulative_change.push(cumulative_change);
    }

    /// Appends all samples of `other`, keeping its order after the existing samples.
    pub fn extend_from(&mut self, other: &PointCloud) {
        self.positions.extend_from_slice(&other.positions);
        self.discharge.extend_from_slice(&other.discharge);
        self.cumulative_change
            .extend_from_slice(&other.cumulative_change);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    pub fn discharge(&self) -> &[f64] {
        &self.discharge
    }

    pub fn cumulative_change(&self) -> &[f64] {
        &self.cumulative_change
    }

    /// Elevations, i.e. the `z` component of every position.
    pub fn elevation(&self) -> Vec<f64> {
        self.positions.iter().map(|p| p.z).collect()
    }

    /// Planar extent of the cloud, or `None` when it holds no points.
    pub fn bounds(&self) -> Option<BoundingBox> {
        if self.positions.is_empty() {
            return None;
        }
        let mut bbox = BoundingBox::empty();
        for p in &self.positions {
            bbox.update(p.truncate());
        }
        Some(bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_from_parts_rejects_misaligned_arrays() {
        let err = PointCloud::try_from_parts(vec![DVec3::ZERO; 2], vec![1.0], vec![0.0, 0.0])
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn bounds_ignore_elevation() {
        let mut cloud = PointCloud::new();
        cloud.push(DVec3::new(2.0, -1.0, 100.0), 1.0, 0.0);
        cloud.push(DVec3::new(-3.0, 4.0, -50.0), 1.0, 0.0);

        let bbox = cloud.bounds().expect("non-empty cloud has bounds");
        assert_eq!(bbox.to_array(), [-3.0, -1.0, 2.0, 4.0]);
        assert_eq!(bbox.extent(), DVec2::new(5.0, 5.0));
    }

    #[test]
    fn empty_cloud_has_no_bounds() {
        assert!(PointCloud::new().bounds().is_none());
        assert!(BoundingBox::empty().is_empty());
    }

    #[test]
    fn extend_keeps_arrays_aligned() {
        let mut a = PointCloud::new();
        a.push(DVec3::new(0.0, 0.0, 1.0), 0.5, -1.0);
        let mut b = PointCloud::new();
        b.push(DVec3::new(0.0, 1.0, 4.0), 10.0, 5.0);

        a.extend_from(&b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.elevation(), vec![1.0, 4.0]);
        assert_eq!(a.discharge(), &[0.5, 10.0]);
        assert_eq!(a.cumulative_change(), &[-1.0, 5.0]);
    }
}
