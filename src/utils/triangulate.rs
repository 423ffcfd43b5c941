//! Triangulator.

use anyhow::{bail, Context};
use glam::{DVec2, DVec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

/// Returns smallest direction.
fn smallest_direction(v: &DVec3) -> Axis {
    match () {
        () if v.x < v.y && v.z < v.x => Axis::Z,
        () if v.x < v.y => Axis::X,
        () if v.z < v.y => Axis::Z,
        () => Axis::Y,
    }
}

/// Triangulate.
///
/// `points` are the polygon's corner positions in winding order. Triangles
/// are pushed as corner numbers (`0..points.len()`), keeping the winding.
pub fn triangulate(points: &[DVec3], triangles: &mut Vec<[usize; 3]>) -> anyhow::Result<()> {
    let n = points.len();

    match points {
        // Not a polygon.
        [] | [_] | [_, _] => bail!("A polygon of size {n} cannot be triangulated"),

        // Got a triangle, no need of triangulation.
        [_, _, _] => triangles.push([0, 1, 2]),

        &[p0, p1, p2, p3] => {
            // n1: Normal vector calculated with two edges of the angle1.
            // n3: Normal vector calculated with two edges of the angle3.
            let n1 = (p0 - p1).cross(p1 - p2);
            let n3 = (p2 - p3).cross(p3 - p0);

            // If both angle1 and angle3 are convex, n1 and n3 point the same
            // way and `n1.dot(n3)` is positive. If one of them is concave,
            // they point in opposite directions.
            // Non-planar quads get an inaccurate cut whichever diagonal is
            // chosen, so they need no special case.
            if n1.dot(n3) >= 0.0 {
                // Cut from p0 to p2.
                triangles.extend_from_slice(&[[0, 1, 2], [2, 3, 0]]);
            } else {
                // Either angle1 or angle3 is concave. Cut from p1 to p3.
                triangles.extend_from_slice(&[[0, 1, 3], [3, 1, 2]]);
            }
        }
        points => {
            let points_2d: Vec<_> = {
                // Project onto the plane of the two widest axes.
                // This helps treat points which are not on a single plane.
                let (min, max) = bounding_box(points).context("polygon has no points")?;

                let width = max - min;

                match smallest_direction(&width) {
                    Axis::X => points.iter().map(|v| DVec2::new(v.y, v.z)).collect(),
                    Axis::Y => points.iter().map(|v| DVec2::new(v.x, v.z)).collect(),
                    Axis::Z => points.iter().map(|v| DVec2::new(v.x, v.y)).collect(),
                }
            };
            // Normal directions.
            let normal_directions = {
                // 0 ... n-1
                let iter_cur = points_2d.iter();

                // n-1, 0, ... n-2
                let iter_prev = points_2d.iter().cycle().skip(n - 1);

                // 1, ... n-1, 0
                let iter_next = points_2d.iter().cycle().skip(1);

                iter_cur
                    .zip(iter_prev)
                    .zip(iter_next)
                    .map(|((cur, prev), next)| {
                        let prev_cur = *prev - *cur;
                        let cur_next = *cur - *next;
                        prev_cur.perp_dot(cur_next) > 0.0
                    })
                    .collect::<Vec<_>>()
            };
            debug_assert_eq!(normal_directions.len(), n);

            let dirs_true_count = normal_directions.iter().filter(|&&v| v).count();

            if dirs_true_count <= 1 || dirs_true_count >= n - 1 {
                // Zero or one angles are concave.
                let minor_sign = dirs_true_count <= 1;

                // If there are no concave angles, use 0 as center.
                let center = normal_directions
                    .iter()
                    .position(|&sign| sign == minor_sign)
                    .unwrap_or(0);

                let iter1 = (0..n).cycle().skip(center + 1).take(n - 2);
                let iter2 = (0..n).cycle().skip(center + 2);

                for (c1, c2) in iter1.zip(iter2) {
                    triangles.push([center, c1, c2]);
                }
            } else {
                bail!("Unsupported polygon: {n}-gon with two or more concave angles");
            }
        }
    }
    Ok(())
}

/// Returns bounding box as `(min, max)`.
fn bounding_box<'a>(points: impl IntoIterator<Item = &'a DVec3>) -> Option<(DVec3, DVec3)> {
    points.into_iter().fold(None, |minmax, point| {
        minmax.map_or_else(
            || Some((*point, *point)),
            |(min, max)| Some((min.min(*point), max.max(*point))),
        )
    })
}
