//! Nearest-neighbor index over the planar positions of a point cloud.
use glam::{DVec2, DVec3};
use rstar::primitives::GeomWithData;
use rstar::RTree;

/// Number of source points blended into each grid node.
pub const NEIGHBOR_COUNT: usize = 3;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Up to [`NEIGHBOR_COUNT`] source points around a query, ordered by ascending distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighborhood {
    indices: [usize; NEIGHBOR_COUNT],
    distances: [f64; NEIGHBOR_COUNT],
    len: usize,
}

impl Neighborhood {
    /// Collects the first [`NEIGHBOR_COUNT`] `(index, distance)` pairs, which must already be
    /// sorted by distance.
    pub fn from_sorted<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let mut out = Self {
            indices: [0; NEIGHBOR_COUNT],
            distances: [0.0; NEIGHBOR_COUNT],
            len: 0,
        };
        for (index, distance) in pairs.into_iter().take(NEIGHBOR_COUNT) {
            debug_assert!(out.len == 0 || out.distances[out.len - 1] <= distance);
            out.indices[out.len] = index;
            out.distances[out.len] = distance;
            out.len += 1;
        }
        out
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The closest source point and its distance.
    pub fn nearest(&self) -> Option<(usize, f64)> {
        self.iter().next()
    }

    /// `(index, distance)` pairs from nearest to farthest.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices[..self.len]
            .iter()
            .copied()
            .zip(self.distances[..self.len].iter().copied())
    }
}

/// R*-tree over the `(x, y)` of each source point; `z` is ignored.
pub struct NeighborIndex {
    tree: RTree<IndexedPoint>,
}

impl NeighborIndex {
    /// Bulk-loads the index. Point `i` of `positions` is reported as index `i`.
    ///
    /// Every `x` and `y` must be finite.
    pub fn build(positions: &[DVec3]) -> Self {
        let points = positions
            .iter()
            .enumerate()
            .map(|(i, p)| GeomWithData::new([p.x, p.y], i))
            .collect();
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// The [`NEIGHBOR_COUNT`] nearest source points to `q` with Euclidean distances.
    pub fn nearest(&self, q: DVec2) -> Neighborhood {
        Neighborhood::from_sorted(
            self.tree
                .nearest_neighbor_iter_with_distance_2(&[q.x, q.y])
                .map(|(p, d2)| (p.data, d2.sqrt())),
        )
    }

    /// Runs [`NeighborIndex::nearest`] for every query point, preserving order.
    pub fn query_all(&self, queries: &[DVec2]) -> Vec<Neighborhood> {
        queries.iter().map(|&q| self.nearest(q)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_with_center() -> Vec<DVec3> {
        vec![
            DVec3::new(0.0, 0.0, 10.0),
            DVec3::new(4.0, 0.0, 20.0),
            DVec3::new(0.0, 4.0, 30.0),
            DVec3::new(4.0, 4.0, 40.0),
            DVec3::new(2.0, 2.0, 50.0),
        ]
    }

    #[test]
    fn nearest_returns_three_sorted_neighbors() {
        let index = NeighborIndex::build(&square_with_center());
        assert_eq!(index.len(), 5);

        let n = index.nearest(DVec2::new(0.5, 0.0));
        assert_eq!(n.len(), NEIGHBOR_COUNT);
        let (first, d0) = n.nearest().unwrap();
        assert_eq!(first, 0);
        assert_eq!(d0, 0.5);

        let distances: Vec<f64> = n.iter().map(|(_, d)| d).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(n.iter().nth(1).unwrap().0, 4);
    }

    #[test]
    fn exact_hit_reports_zero_distance() {
        let index = NeighborIndex::build(&square_with_center());
        let (i, d) = index.nearest(DVec2::new(4.0, 4.0)).nearest().unwrap();
        assert_eq!((i, d), (3, 0.0));
    }

    #[test]
    fn small_clouds_return_fewer_neighbors() {
        let index = NeighborIndex::build(&[DVec3::new(1.0, 1.0, 0.0), DVec3::new(2.0, 1.0, 0.0)]);
        let n = index.nearest(DVec2::ZERO);
        assert_eq!(n.len(), 2);

        let empty = NeighborIndex::build(&[]);
        assert!(empty.is_empty());
        assert!(empty.nearest(DVec2::ZERO).is_empty());
    }

    #[test]
    fn query_all_preserves_query_order() {
        let index = NeighborIndex::build(&square_with_center());
        let hits = index.query_all(&[DVec2::new(4.0, 0.0), DVec2::new(0.0, 4.0)]);
        assert_eq!(hits[0].nearest().unwrap().0, 1);
        assert_eq!(hits[1].nearest().unwrap().0, 2);
    }
}
