//! Inverse-distance weighting over precomputed neighborhoods.
//!
//! Each value is `sum(v_i / d_i) / sum(1 / d_i)` over the neighbors of a node. When the nearest
//! neighbor lies exactly on the node the weights are undefined, so the value of that neighbor
//! is returned unchanged.
use crate::resample::index::Neighborhood;

/// Interpolates every field at every neighborhood.
///
/// Returns one vector per entry of `fields`, each aligned with `neighborhoods`. Field slices
/// are indexed by the source indices stored in the neighborhoods.
pub fn interpolate_idw(neighborhoods: &[Neighborhood], fields: &[&[f64]]) -> Vec<Vec<f64>> {
    fields
        .iter()
        .map(|values| {
            neighborhoods
                .iter()
                .map(|n| idw_value(n, values))
                .collect()
        })
        .collect()
}

/// IDW estimate for a single neighborhood; `NaN` when it has no neighbors.
#[inline]
pub fn idw_value(neighborhood: &Neighborhood, values: &[f64]) -> f64 {
    match neighborhood.nearest() {
        None => return f64::NAN,
        Some((i, d)) if d == 0.0 => return values[i],
        Some(_) => {}
    }

    let mut weighted = 0.0;
    let mut total = 0.0;
    for (i, d) in neighborhood.iter() {
        let w = 1.0 / d;
        weighted += w * values[i];
        total += w;
    }
    weighted / total
}
