//! Polygon ring geometry

use crate::error::{DomainError, DomainResult};
use crate::types::{LonLat, Vertex};

/// Minimum number of entries in a closed ring (3 distinct + closing vertex)
pub const MIN_RING_LEN: usize = 4;

/// Minimum number of distinct vertices in a ring
pub const MIN_DISTINCT_VERTICES: usize = 3;

/// Representative point of a ring: the arithmetic mean of every vertex.
///
/// The closing vertex is counted like any other, so a square ring weighs its
/// first corner twice.
pub fn centroid(ring: &[Vertex]) -> DomainResult<LonLat> {
    if ring.is_empty() {
        return Err(DomainError::InvalidGeometry(
            "ring must contain at least one vertex".to_string(),
        ));
    }

    let n = ring.len() as f64;
    let (lon_sum, lat_sum) = ring
        .iter()
        .fold((0.0, 0.0), |(lon, lat), v| (lon + v[0], lat + v[1]));

    Ok(LonLat::new(lon_sum / n, lat_sum / n))
}

/// Validate that a ring is closed, long enough and within WGS84 bounds
pub fn validate_ring(ring: &[Vertex]) -> DomainResult<()> {
    if ring.len() < MIN_RING_LEN {
        return Err(DomainError::validation(
            "coordinates",
            format!(
                "ring needs at least {} vertices, got {}",
                MIN_RING_LEN,
                ring.len()
            ),
        ));
    }

    for v in ring {
        if !v[0].is_finite() || !v[1].is_finite() {
            return Err(DomainError::validation(
                "coordinates",
                "coordinates must be finite numbers",
            ));
        }
        if !(-180.0..=180.0).contains(&v[0]) || !(-90.0..=90.0).contains(&v[1]) {
            return Err(DomainError::validation(
                "coordinates",
                format!("vertex [{}, {}] is outside longitude/latitude bounds", v[0], v[1]),
            ));
        }
    }

    if ring.first() != ring.last() {
        return Err(DomainError::validation(
            "coordinates",
            "ring must be closed (first vertex equal to last)",
        ));
    }

    if distinct_vertices(ring) < MIN_DISTINCT_VERTICES {
        return Err(DomainError::validation(
            "coordinates",
            format!("ring needs at least {} distinct vertices", MIN_DISTINCT_VERTICES),
        ));
    }

    Ok(())
}

/// Count pairwise distinct vertices
fn distinct_vertices(points: &[Vertex]) -> usize {
    let mut seen: Vec<&Vertex> = Vec::with_capacity(points.len());
    for p in points {
        if !seen.contains(&p) {
            seen.push(p);
        }
    }
    seen.len()
}

/// Close an open drawing by repeating its first vertex.
///
/// Already-closed input is returned unchanged. Drawings with fewer than three
/// distinct points are rejected, matching the map's "finish polygon" rule.
pub fn close_ring(points: &[Vertex]) -> DomainResult<Vec<Vertex>> {
    let already_closed = points.len() > 1 && points.first() == points.last();
    let open = if already_closed {
        &points[..points.len() - 1]
    } else {
        points
    };

    if distinct_vertices(open) < MIN_DISTINCT_VERTICES {
        return Err(DomainError::validation(
            "coordinates",
            "a polygon needs at least 3 distinct points",
        ));
    }

    let mut ring = points.to_vec();
    if !already_closed {
        ring.push(points[0]);
    }
    Ok(ring)
}
