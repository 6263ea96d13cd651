//! Iso-level contour and zone extraction
//!
//! Marching squares over the binary field `C >= L` with linear edge
//! interpolation, segment chaining into closed rings, counter-clockwise
//! orientation and shoelace areas in projected metres. Vertices are
//! materialised in WGS-84 through the plume rotation on emission.
//!
//! Radial zones for the thermal and blast fields come from a bisection on
//! the radial effect function to one-metre tolerance.

use rustc_hash::FxHashMap;

use crate::core_types::geo::{self, GeoPoint};
use crate::core_types::math::bisect_to;
use crate::core_types::output::{Contour, ContourType, DispersionGrid};

/// Bisection tolerance for radial zones (m).
const ZONE_TOLERANCE: f64 = 1.0;

/// Vertex count of an emitted radial-zone ring.
const ZONE_RING_VERTICES: usize = 72;

/// One concentration level to contour.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSpec {
    /// Threshold in mg/m³
    pub level: f64,
    /// Caller-facing label
    pub label: String,
    /// Semantics of the level
    pub contour_type: ContourType,
}

/// Extract contours for every requested level and every time step.
pub fn extract_contours(grid: &DispersionGrid, levels: &[LevelSpec]) -> Vec<Contour> {
    let mut out = Vec::new();
    for spec in levels {
        for t in 0..grid.times.len() {
            out.extend(contours_for_plane(grid, t, spec));
        }
    }
    out
}

/// Contours of one level on one time plane.
fn contours_for_plane(grid: &DispersionGrid, t: usize, spec: &LevelSpec) -> Vec<Contour> {
    let n_x = grid.xs.len();
    let n_y = grid.ys.len();
    let plane_offset = t * n_x * n_y;
    let field = &grid.concentrations[plane_offset..plane_offset + n_x * n_y];

    let rings = extract_rings(field, &grid.xs, &grid.ys, spec.level);
    rings
        .into_iter()
        .filter_map(|ring| {
            let area = shoelace_area(&ring);
            if ring.len() < 4 || area < 1.0 {
                return None;
            }
            let ring = orient_ccw(ring);
            let max_downwind = ring.iter().map(|p| p.0).fold(0.0, f64::max);
            let vertices = ring
                .iter()
                .map(|&(x, y)| {
                    let (east, north) = geo::plume_to_east_north(x, y, grid.downwind_azimuth);
                    geo::offset_geodetic(&grid.origin, east, north)
                })
                .collect();
            Some(Contour {
                level: spec.level,
                label: spec.label.clone(),
                contour_type: spec.contour_type,
                time_index: t,
                vertices,
                area_m2: area,
                max_downwind_m: max_downwind,
            })
        })
        .collect()
}

/// Marching-squares ring extraction in local coordinates.
///
/// The field is `[ix][iy]` flattened; a point is inside when its value
/// reaches `level`. Open chains (contours cut by the grid edge) are closed
/// with a straight segment.
pub fn extract_rings(
    field: &[f64],
    xs: &[f64],
    ys: &[f64],
    level: f64,
) -> Vec<Vec<(f64, f64)>> {
    let n_x = xs.len();
    let n_y = ys.len();
    let value = |ix: usize, iy: usize| field[ix * n_y + iy] - level;

    let mut segments: Vec<((f64, f64), (f64, f64))> = Vec::new();
    for ix in 0..n_x.saturating_sub(1) {
        for iy in 0..n_y.saturating_sub(1) {
            // Corners: a bottom-left, b bottom-right, c top-right, d top-left
            let a = value(ix, iy);
            let b = value(ix + 1, iy);
            let c = value(ix + 1, iy + 1);
            let d = value(ix, iy + 1);

            let case = u8::from(a >= 0.0)
                | (u8::from(b >= 0.0) << 1)
                | (u8::from(c >= 0.0) << 2)
                | (u8::from(d >= 0.0) << 3);
            if case == 0 || case == 15 {
                continue;
            }

            let (x0, x1) = (xs[ix], xs[ix + 1]);
            let (y0, y1) = (ys[iy], ys[iy + 1]);
            let interp = |u: f64, v: f64| if (u - v).abs() < 1e-300 { 0.5 } else { u / (u - v) };

            // Crossing points on the four cell edges
            let bottom = (x0 + interp(a, b) * (x1 - x0), y0);
            let right = (x1, y0 + interp(b, c) * (y1 - y0));
            let top = (x0 + interp(d, c) * (x1 - x0), y1);
            let left = (x0, y0 + interp(a, d) * (y1 - y0));

            match case {
                1 | 14 => segments.push((left, bottom)),
                2 | 13 => segments.push((bottom, right)),
                3 | 12 => segments.push((left, right)),
                4 | 11 => segments.push((right, top)),
                6 | 9 => segments.push((bottom, top)),
                7 | 8 => segments.push((left, top)),
                5 => {
                    segments.push((left, bottom));
                    segments.push((right, top));
                }
                10 => {
                    segments.push((bottom, right));
                    segments.push((top, left));
                }
                _ => {}
            }
        }
    }

    chain_segments(&segments)
}

/// Quantised endpoint key for segment chaining.
fn key(p: (f64, f64)) -> (i64, i64) {
    ((p.0 * 1024.0).round() as i64, (p.1 * 1024.0).round() as i64)
}

/// Chain loose segments into rings by walking shared endpoints.
fn chain_segments(segments: &[((f64, f64), (f64, f64))]) -> Vec<Vec<(f64, f64)>> {
    let mut adjacency: FxHashMap<(i64, i64), Vec<usize>> = FxHashMap::default();
    for (i, seg) in segments.iter().enumerate() {
        adjacency.entry(key(seg.0)).or_default().push(i);
        adjacency.entry(key(seg.1)).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut rings = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut ring = vec![segments[start].0, segments[start].1];

        // Walk forward from the tail until the ring closes or dead-ends
        loop {
            let tail = *ring.last().expect("ring is never empty");
            if key(tail) == key(ring[0]) && ring.len() > 2 {
                break;
            }
            let next = adjacency
                .get(&key(tail))
                .into_iter()
                .flatten()
                .copied()
                .find(|&i| !used[i]);
            match next {
                Some(i) => {
                    used[i] = true;
                    let seg = segments[i];
                    if key(seg.0) == key(tail) {
                        ring.push(seg.1);
                    } else {
                        ring.push(seg.0);
                    }
                }
                None => break,
            }
        }

        // Close the ring (straight segment across any grid-edge cut)
        if key(*ring.last().expect("ring is never empty")) != key(ring[0]) {
            ring.push(ring[0]);
        } else {
            let first = ring[0];
            *ring.last_mut().expect("ring is never empty") = first;
        }
        rings.push(ring);
    }

    rings
}

/// Unsigned shoelace area of a closed ring (m²).
pub fn shoelace_area(ring: &[(f64, f64)]) -> f64 {
    signed_area(ring).abs()
}

fn signed_area(ring: &[(f64, f64)]) -> f64 {
    let mut sum = 0.0;
    for pair in ring.windows(2) {
        sum += pair[0].0 * pair[1].1 - pair[1].0 * pair[0].1;
    }
    0.5 * sum
}

/// Reverse the ring when its signed area is clockwise.
fn orient_ccw(ring: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    if signed_area(&ring) < 0.0 {
        ring.into_iter().rev().collect()
    } else {
        ring
    }
}

/// Radius (m) where a monotone radial effect function crosses `threshold`.
///
/// Searches `[bracket_lo, bracket_hi]` to one metre; `None` when the
/// threshold is never reached inside the bracket.
pub fn radial_zone<F: Fn(f64) -> f64>(
    effect: F,
    threshold: f64,
    bracket_lo: f64,
    bracket_hi: f64,
) -> Option<f64> {
    if effect(bracket_lo) < threshold {
        return None;
    }
    if effect(bracket_hi) >= threshold {
        return Some(bracket_hi);
    }
    bisect_to(effect, threshold, bracket_lo, bracket_hi, ZONE_TOLERANCE)
}

/// Circular zone polygon around the source.
pub fn circle_contour(
    origin: &GeoPoint,
    radius: f64,
    level: f64,
    label: &str,
    contour_type: ContourType,
) -> Contour {
    let mut vertices = Vec::with_capacity(ZONE_RING_VERTICES + 1);
    let mut local = Vec::with_capacity(ZONE_RING_VERTICES + 1);
    for i in 0..=ZONE_RING_VERTICES {
        // CCW from east
        let theta = 2.0 * std::f64::consts::PI * i as f64 / ZONE_RING_VERTICES as f64;
        let (x, y) = (radius * theta.cos(), radius * theta.sin());
        local.push((x, y));
        vertices.push(geo::offset_geodetic(origin, x, y));
    }
    Contour {
        level,
        label: label.to_owned(),
        contour_type,
        time_index: 0,
        vertices,
        area_m2: shoelace_area(&local),
        max_downwind_m: radius,
    }
}
