//! Closest-point projection of a query point onto a single triangle.
//!
//! Results are barycentric weights `(x, y, z)` for the triangle's vertices
//! `(v1, v2, v3)`. The planar weights come from Heidrich's formulation
//! ("Computing the Barycentric Coordinates of a Projected Point",
//! Journal of Graphics Tools, 2005): one cross product for the normal and
//! two signed-area ratios, without normalizing anything.
//!
//! # Clamping
//!
//! When the planar projection falls outside the triangle, the weights are
//! clamped onto a single edge chosen in a fixed order:
//!
//! 1. `x < 0`: edge `v2-v3`
//! 2. else `y < 0`: edge `v3-v1`
//! 3. else (`z < 0`): edge `v1-v2`
//!
//! The query point is projected onto that edge's line and the edge parameter
//! clamped to `[0, 1]`. There is no second pass. In the corner regions where
//! two planar weights are negative, the first negative weight decides the
//! edge, which can miss a closer point on the other edge. The result is
//! always a point on the triangle, just not always the nearest one there.
//!
//! # Degenerate triangles
//!
//! Zero-area triangles are not handled. The normal's squared length is zero,
//! so the planar weights come out NaN. NaN fails every sign test, so
//! [`project`] falls through to the `v1-v2` edge clamp; if that edge has
//! zero length as well, the weights stay NaN.
//!
//! # Sign tests
//!
//! Weights are compared with `>= 0.0` and `< 0.0`, not by sign bit. Negative
//! zero is therefore inside. A NaN is neither inside nor negative whatever
//! its sign bit, so it reaches the final `v1-v2` branch. A sign-bit test
//! (`is_sign_negative`) would instead clamp `-0.0` weights and send a
//! sign-set NaN to edge `v2-v3`, tying the degenerate path to how the
//! platform signs the NaN from `0 * inf`.

use nalgebra::{Point3, Vector3};

/// Clamp `value` to the closed interval `[low, high]`.
///
/// `low` must not exceed `high`; this is checked in debug builds.
#[inline]
#[must_use]
pub fn clamp(value: f32, low: f32, high: f32) -> f32 {
    debug_assert!(low <= high, "clamp bounds inverted: {low} > {high}");
    if value < low {
        low
    } else if high < value {
        high
    } else {
        value
    }
}

/// Barycentric weights of the projection of `query` onto the triangle's plane.
///
/// The weights always sum to one (up to rounding) but may be negative when
/// the projection lies outside the triangle.
#[must_use]
pub fn planar_barycentric(
    v1: &Point3<f32>,
    v2: &Point3<f32>,
    v3: &Point3<f32>,
    query: &Point3<f32>,
) -> Vector3<f32> {
    let side1 = v2 - v1;
    let side2 = v3 - v1;
    let normal = side1.cross(&side2);
    let one_over_4area_sq = 1.0 / normal.dot(&normal);

    let to_query = query - v1;

    let z = side1.cross(&to_query).dot(&normal) * one_over_4area_sq;
    let y = to_query.cross(&side2).dot(&normal) * one_over_4area_sq;
    let x = 1.0 - y - z;

    Vector3::new(x, y, z)
}

/// Barycentric weights of the point on the triangle closest to `query`.
///
/// Interior projections are returned as is; exterior ones are clamped onto
/// an edge or vertex as described in the [module docs](self). A query that
/// coincides exactly with a vertex yields that vertex's unit weights.
///
/// # Example
///
/// ```
/// use mesh_closest::project::project;
/// use nalgebra::Point3;
///
/// let v1 = Point3::new(0.0, 0.0, 0.0);
/// let v2 = Point3::new(1.0, 0.0, 0.0);
/// let v3 = Point3::new(0.0, 1.0, 0.0);
///
/// // Above the interior: the plane projection is the answer.
/// let w = project(&v1, &v2, &v3, &Point3::new(0.25, 0.25, 3.0));
/// assert!((w.x - 0.5).abs() < 1e-6);
/// assert!((w.y - 0.25).abs() < 1e-6);
/// assert!((w.z - 0.25).abs() < 1e-6);
///
/// // Beyond the hypotenuse: clamped onto edge v2-v3.
/// let w = project(&v1, &v2, &v3, &Point3::new(1.0, 1.0, 0.0));
/// assert_eq!(w.x, 0.0);
/// assert!((w.y - 0.5).abs() < 1e-6);
/// ```
#[must_use]
pub fn project(
    v1: &Point3<f32>,
    v2: &Point3<f32>,
    v3: &Point3<f32>,
    query: &Point3<f32>,
) -> Vector3<f32> {
    if query == v1 {
        return Vector3::x();
    }
    if query == v2 {
        return Vector3::y();
    }
    if query == v3 {
        return Vector3::z();
    }

    clamp_to_triangle(v1, v2, v3, query, planar_barycentric(v1, v2, v3, query))
}

/// Clamp planar `weights` of `query` onto the triangle, per the
/// [module docs](self).
fn clamp_to_triangle(
    v1: &Point3<f32>,
    v2: &Point3<f32>,
    v3: &Point3<f32>,
    query: &Point3<f32>,
    mut weights: Vector3<f32>,
) -> Vector3<f32> {
    if weights.x >= 0.0 && weights.y >= 0.0 && weights.z >= 0.0 {
        return weights;
    }

    if weights.x < 0.0 {
        // Edge v2-v3
        let t = edge_parameter(v2, v3, query);
        weights.x = 0.0;
        weights.z = t;
        weights.y = 1.0 - t;
    } else if weights.y < 0.0 {
        // Edge v3-v1
        let t = edge_parameter(v3, v1, query);
        weights.x = t;
        weights.y = 0.0;
        weights.z = 1.0 - t;
    } else {
        // Edge v1-v2
        let t = edge_parameter(v1, v2, query);
        weights.y = t;
        weights.x = 1.0 - t;
        weights.z = 0.0;
    }

    weights
}

/// Clamped parameter of the projection of `query` onto segment `from-to`.
#[inline]
fn edge_parameter(from: &Point3<f32>, to: &Point3<f32>, query: &Point3<f32>) -> f32 {
    let edge = to - from;
    let projected = (query - from).dot(&edge) / edge.norm_squared();
    clamp(projected, 0.0, 1.0)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn right_triangle() -> (Point3<f32>, Point3<f32>, Point3<f32>) {
        (
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )
    }

    fn point_at(
        v: &(Point3<f32>, Point3<f32>, Point3<f32>),
        w: &Vector3<f32>,
    ) -> Point3<f32> {
        Point3::from(v.0.coords * w.x + v.1.coords * w.y + v.2.coords * w.z)
    }

    #[test]
    fn clamp_behaves_like_closed_interval() {
        assert_eq!(clamp(-1.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(2.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(0.25, 0.0, 1.0), 0.25);
        assert_eq!(clamp(1.0, 0.0, 1.0), 1.0);
    }

    #[test]
    fn planar_weights_sum_to_one() {
        let (a, b, c) = right_triangle();
        let w = planar_barycentric(&a, &b, &c, &Point3::new(3.0, -2.0, 7.0));
        assert_relative_eq!(w.sum(), 1.0, epsilon = 1e-5);
        assert!(w.y > 0.0 && w.z < 0.0);
    }

    #[test]
    fn vertex_fast_path_returns_unit_weights() {
        let (a, b, c) = right_triangle();
        assert_eq!(project(&a, &b, &c, &a), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(project(&a, &b, &c, &b), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(project(&a, &b, &c, &c), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn interior_projection_drops_normal_component() {
        let tri = right_triangle();
        let query = Point3::new(0.2, 0.3, -4.0);
        let w = project(&tri.0, &tri.1, &tri.2, &query);

        assert_relative_eq!(w.x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(w.y, 0.2, epsilon = 1e-6);
        assert_relative_eq!(w.z, 0.3, epsilon = 1e-6);

        let p = point_at(&tri, &w);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn point_on_edge_has_one_zero_weight() {
        let (a, b, c) = right_triangle();
        let w = project(&a, &b, &c, &Point3::new(0.5, 0.0, 0.0));
        assert_eq!(w.z, 0.0);
        assert_relative_eq!(w.x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(w.y, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn clamps_onto_edge_opposite_first_vertex() {
        let tri = right_triangle();
        let w = project(&tri.0, &tri.1, &tri.2, &Point3::new(1.0, 1.0, 2.0));

        assert_eq!(w.x, 0.0);
        assert_relative_eq!(w.y, 0.5, epsilon = 1e-6);
        assert_relative_eq!(w.z, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn clamps_onto_edge_opposite_second_vertex() {
        let tri = right_triangle();
        let w = project(&tri.0, &tri.1, &tri.2, &Point3::new(-1.0, 0.5, 0.0));

        assert_eq!(w.y, 0.0);
        assert_relative_eq!(w.x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(w.z, 0.5, epsilon = 1e-6);
        assert_eq!(point_at(&tri, &w), Point3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn clamps_onto_edge_opposite_third_vertex() {
        let tri = right_triangle();
        let w = project(&tri.0, &tri.1, &tri.2, &Point3::new(0.25, -3.0, 1.0));

        assert_eq!(w.z, 0.0);
        assert_relative_eq!(w.x, 0.75, epsilon = 1e-6);
        assert_relative_eq!(w.y, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn clamps_past_edge_end_to_vertex() {
        let tri = right_triangle();
        // x is negative and the parameter along v2-v3 falls below zero.
        let w = project(&tri.0, &tri.1, &tri.2, &Point3::new(3.0, -0.5, 0.0));
        assert_eq!(w, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn fixed_order_picks_first_negative_weight() {
        // Planar weights for (-1, 2) are x = 0, y = -1, z = 2: only y is
        // negative, so edge v3-v1 is clamped and lands on v3.
        let tri = right_triangle();
        let w = project(&tri.0, &tri.1, &tri.2, &Point3::new(-1.0, 2.0, 0.0));
        assert_eq!(point_at(&tri, &w), tri.2);

        // For (2, 2) only x is negative, so the hypotenuse decides.
        let w = project(&tri.0, &tri.1, &tri.2, &Point3::new(2.0, 2.0, 0.0));
        assert_eq!(w.x, 0.0);
        assert_relative_eq!(w.y + w.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn double_negative_region_can_pick_suboptimal_edge() {
        // Obtuse at v3; the query sits beyond both edges meeting there.
        let v1 = Point3::new(0.0, 0.0, 0.0);
        let v2 = Point3::new(4.0, 0.0, 0.0);
        let v3 = Point3::new(2.0, 0.5, 0.0);
        let query = Point3::new(1.5, 1.0, 0.0);

        let planar = planar_barycentric(&v1, &v2, &v3, &query);
        assert!(planar.x < 0.0 && planar.y < 0.0);

        // x is tested first, so edge v2-v3 is used and clamps to v3.
        let w = project(&v1, &v2, &v3, &query);
        assert_eq!(w, Vector3::new(0.0, 0.0, 1.0));

        // Edge v3-v1 holds a strictly closer point.
        let t = edge_parameter(&v3, &v1, &query);
        assert!(t > 0.0 && t < 1.0);
        let better = v3 + (v1 - v3) * t;
        assert!((better - query).norm_squared() < (v3 - query).norm_squared());
    }

    #[test]
    fn degenerate_triangle_yields_non_finite_weights() {
        let v1 = Point3::new(0.0, 0.0, 0.0);
        let v2 = Point3::new(1.0, 0.0, 0.0);
        let v3 = Point3::new(2.0, 0.0, 0.0);

        let w = planar_barycentric(&v1, &v2, &v3, &Point3::new(0.5, 1.0, 0.0));
        assert!(!w.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn degenerate_triangle_falls_through_to_first_edge() {
        let v1 = Point3::new(0.0, 0.0, 0.0);
        let v2 = Point3::new(1.0, 0.0, 0.0);
        let v3 = Point3::new(2.0, 0.0, 0.0);

        let w = project(&v1, &v2, &v3, &Point3::new(0.5, 1.0, 0.0));
        assert_eq!(w.z, 0.0);
        assert_relative_eq!(w.x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(w.y, 0.5, epsilon = 1e-6);

        // Collapsed first edge: nothing finite survives.
        let w = project(&v1, &v1, &v3, &Point3::new(0.5, 1.0, 0.0));
        assert!(w.x.is_nan() && w.y.is_nan());
    }

    #[test]
    fn negative_zero_weight_counts_as_inside() {
        let (v1, v2, v3) = right_triangle();
        let q = Point3::new(0.0, 0.25, 0.0);

        let w = clamp_to_triangle(&v1, &v2, &v3, &q, Vector3::new(0.75, -0.0, 0.25));
        assert_eq!(w, Vector3::new(0.75, -0.0, 0.25));
    }

    #[test]
    fn nan_weights_clamp_to_first_edge_regardless_of_sign() {
        let (v1, v2, v3) = right_triangle();
        let q = Point3::new(0.25, -1.0, 0.0);

        for nan in [f32::NAN, -f32::NAN] {
            assert!(nan.is_nan());
            let w = clamp_to_triangle(&v1, &v2, &v3, &q, Vector3::new(nan, nan, nan));
            assert_eq!(w.z, 0.0);
            assert_relative_eq!(w.x, 0.75, epsilon = 1e-6);
            assert_relative_eq!(w.y, 0.25, epsilon = 1e-6);
        }
    }
}
