//! Rein-mathematische Geometrie-Funktionen: Headings, Winkel, Schnittpunkte
//! und die Gleichwinkel-Konstruktion.
//!
//! Koordinaten sind projizierte (Ost, Nord)-Paare als `DVec2` (x = Ost, y = Nord).
//! Alle Funktionen sind zustandslos und deterministisch.

use glam::DVec2;
use std::f64::consts::TAU;

/// Relative Toleranz, unter der zwei Geraden als parallel gelten.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Normalisiert ein Heading (Grad) in das Intervall `[-180, 180)`.
pub fn fix_heading(mut degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return degrees;
    }
    // Große Werte erst grob reduzieren, danach schrittweise wie gewohnt
    if degrees.abs() > 3600.0 {
        degrees %= 360.0;
    }
    while degrees < -180.0 {
        degrees += 360.0;
    }
    while degrees >= 180.0 {
        degrees -= 360.0;
    }
    degrees
}

/// Peilung von `a` nach `b` in Radiant, im Uhrzeigersinn ab Nord, Bereich `[0, 2π)`.
pub fn bearing(a: DVec2, b: DVec2) -> f64 {
    let delta = b - a;
    let angle = delta.x.atan2(delta.y);
    if angle < 0.0 {
        angle + TAU
    } else {
        angle
    }
}

/// Planare Distanz zwischen zwei Punkten.
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    a.distance(b)
}

/// Screen-orientiertes Heading (Grad) des Abschnitts `a → b`.
///
/// 0° = Ost; Nord liegt bei -90°. Die Vorzeichen-Konvention bestimmt die
/// Sweep-Richtung der Winkelbögen und darf nicht verändert werden.
pub fn heading(a: DVec2, b: DVec2) -> f64 {
    fix_heading(-90.0 + bearing(a, b).to_degrees())
}

/// Vorzeichenbehafteter Abbiegewinkel (Grad) zwischen zwei Headings.
pub fn turn_angle(prev_heading: f64, heading: f64) -> f64 {
    fix_heading(heading - prev_heading)
}

/// Winkel (Radiant) des gerichteten Abschnitts `p → q`, gemessen ab der Ost-Achse.
pub fn segment_angle(p: DVec2, q: DVec2) -> f64 {
    (q.y - p.y).atan2(q.x - p.x)
}

/// Dreht `point` um `pivot`. Positive Winkel drehen im Uhrzeigersinn.
pub fn rotate_about(point: DVec2, pivot: DVec2, angle: f64) -> DVec2 {
    let (sin, cos) = angle.sin_cos();
    let d = point - pivot;
    DVec2::new(cos * d.x + sin * d.y, -sin * d.x + cos * d.y) + pivot
}

/// Schnittpunkt der unendlichen Geraden durch (p1, p2) und (p3, p4).
///
/// Liefert `None`, wenn die Geraden (numerisch) parallel sind oder eine
/// der beiden Geraden degeneriert ist.
pub fn line_line_intersection(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> Option<DVec2> {
    let d1 = p1 - p2;
    let d2 = p3 - p4;
    let det = d1.perp_dot(d2);
    let scale = d1.length() * d2.length();
    if scale == 0.0 || det.abs() <= PARALLEL_EPSILON * scale {
        return None;
    }

    let c1 = p1.perp_dot(p2);
    let c2 = p3.perp_dot(p4);
    Some(DVec2::new(
        (c1 * d2.x - d1.x * c2) / det,
        (c1 * d2.y - d1.y * c2) / det,
    ))
}

/// Korrigiert einen Index für (ggf. geschlossene) Polylinien.
///
/// `count` ist die Anzahl der *unterschiedlichen* Vertices (ohne doppelten
/// Schluss-Vertex). Offene Polylinien liefern außerhalb des Bereichs `None`,
/// geschlossene werden modulo `count` umgebrochen.
pub fn fix_index(count: usize, closed: bool, index: isize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    if index >= 0 && (index as usize) < count {
        return Some(index as usize);
    }
    if !closed {
        return None;
    }
    Some(index.rem_euclid(count as isize) as usize)
}

/// Kürzeste Distanz von `point` zum Abschnitt `a`–`b`.
pub fn distance_to_segment(point: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f64::EPSILON {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// Worauf sich die Gleichwinkel-Konstruktion bezieht (Indizes in die Polylinie).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleAnchor {
    /// Vertex an diesem Index; seine beiden Nachbarn bleiben fest.
    Vertex(usize),
    /// Abschnitt zwischen `index` und `index + 1`.
    Segment(usize),
}

/// Berechnet den Punkt, an dem die Abbiegewinkel zu beiden Nachbarn gleich werden.
///
/// `points` ist die vollständige Vertex-Folge (bei geschlossenen Polylinien
/// inklusive doppeltem Schluss-Vertex). Die beiden angrenzenden Abschnitte
/// werden um je ein Drittel der Richtungsabweichung gedreht und als unendliche
/// Geraden geschnitten. Das Drittel ist eine Näherung erster Ordnung, keine
/// exakte Gleichbogen-Konstruktion.
///
/// `None`, wenn nicht genug Nachbarn existieren (offene Polylinie nahe am Ende)
/// oder die gedrehten Geraden parallel sind.
pub fn equal_angle_point(points: &[DVec2], closed: bool, anchor: AngleAnchor) -> Option<DVec2> {
    let real_count = if closed {
        points.len().saturating_sub(1)
    } else {
        points.len()
    };

    let (index1, index2) = match anchor {
        AngleAnchor::Vertex(i) => (i as isize - 1, i as isize + 1),
        AngleAnchor::Segment(i) => (i as isize, i as isize + 1),
    };

    let i11 = fix_index(real_count, closed, index1 - 1)?;
    let i12 = fix_index(real_count, closed, index1)?;
    let i21 = fix_index(real_count, closed, index2)?;
    let i22 = fix_index(real_count, closed, index2 + 1)?;

    let (p11, p12, p21, p22) = (points[i11], points[i12], points[i21], points[i22]);

    let a1 = segment_angle(p11, p12);
    let a2 = segment_angle(p21, p22);
    let a = fix_heading((a2 - a1).to_degrees()).to_radians() / 3.0;

    let p1r = rotate_about(p11, p12, -a);
    let p2r = rotate_about(p22, p21, a);

    line_line_intersection(p1r, p12, p21, p2r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn fix_heading_wraps_into_half_open_range() {
        assert_relative_eq!(fix_heading(180.0), -180.0);
        assert_relative_eq!(fix_heading(-180.0), -180.0);
        assert_relative_eq!(fix_heading(190.0), -170.0);
        assert_relative_eq!(fix_heading(-190.0), 170.0);
        assert_relative_eq!(fix_heading(720.0 + 45.0), 45.0);
        assert_relative_eq!(fix_heading(0.0), 0.0);
    }

    proptest! {
        #[test]
        fn fix_heading_stays_in_range_and_congruent(x in -1.0e5f64..1.0e5) {
            let h = fix_heading(x);
            prop_assert!((-180.0..180.0).contains(&h));
            let k = ((x - h) / 360.0).round();
            prop_assert!((x - h - k * 360.0).abs() < 1e-6);
        }

        #[test]
        fn turn_angle_is_antisymmetric_except_at_half_turn(a in -180.0f64..180.0, b in -180.0f64..180.0) {
            let forward = turn_angle(a, b);
            let backward = turn_angle(b, a);
            prop_assume!((forward.abs() - 180.0).abs() > 1e-9);
            prop_assert!((forward + backward).abs() < 1e-9);
        }
    }

    #[test]
    fn heading_uses_screen_convention() {
        let origin = DVec2::ZERO;
        assert_relative_eq!(heading(origin, DVec2::new(1.0, 0.0)), 0.0, epsilon = 1e-12);
        assert_relative_eq!(heading(origin, DVec2::new(0.0, 1.0)), -90.0, epsilon = 1e-12);
        assert_relative_eq!(heading(origin, DVec2::new(0.0, -1.0)), 90.0, epsilon = 1e-12);
        assert_relative_eq!(heading(origin, DVec2::new(-1.0, 0.0)), -180.0, epsilon = 1e-12);
    }

    #[test]
    fn bearing_is_clockwise_from_north() {
        let origin = DVec2::ZERO;
        assert_relative_eq!(bearing(origin, DVec2::new(0.0, 5.0)), 0.0);
        assert_relative_eq!(bearing(origin, DVec2::new(5.0, 0.0)), std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(bearing(origin, DVec2::new(-5.0, 0.0)), 1.5 * std::f64::consts::PI);
    }

    #[test]
    fn straight_line_has_zero_turn() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(10.0, 0.0);
        let c = DVec2::new(20.0, 0.0);
        assert_relative_eq!(turn_angle(heading(a, b), heading(b, c)), 0.0);
    }

    #[test]
    fn rotate_about_turns_clockwise() {
        let rotated = rotate_about(DVec2::new(1.0, 0.0), DVec2::ZERO, std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(rotated.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(rotated.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn intersection_of_crossing_lines() {
        let p = line_line_intersection(
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
            DVec2::new(10.0, 0.0),
        )
        .expect("Schnittpunkt erwartet");
        assert_relative_eq!(p.x, 5.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn parallel_lines_have_no_intersection() {
        let p = line_line_intersection(
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(10.0, 1.0),
        );
        assert!(p.is_none());
    }

    #[test]
    fn fix_index_wraps_only_closed() {
        assert_eq!(fix_index(4, false, -1), None);
        assert_eq!(fix_index(4, false, 4), None);
        assert_eq!(fix_index(4, false, 2), Some(2));
        assert_eq!(fix_index(4, true, -1), Some(3));
        assert_eq!(fix_index(4, true, 4), Some(0));
        assert_eq!(fix_index(4, true, 9), Some(1));
        assert_eq!(fix_index(0, true, 0), None);
    }

    #[test]
    fn distance_to_segment_clamps_to_endpoints() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(10.0, 0.0);
        assert_relative_eq!(distance_to_segment(DVec2::new(5.0, 3.0), a, b), 3.0);
        assert_relative_eq!(distance_to_segment(DVec2::new(-4.0, 3.0), a, b), 5.0);
        assert_relative_eq!(distance_to_segment(DVec2::new(1.0, 1.0), a, a), 2f64.sqrt());
    }

    /// p11 → p12 nach Osten, p21 → p22 nach Norden: Abweichung 90°, also je 30°.
    fn right_angle_corner() -> Vec<DVec2> {
        vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(20.0, 0.0),
            DVec2::new(20.0, 10.0),
            DVec2::new(20.0, 20.0),
        ]
    }

    #[test]
    fn equal_angle_point_for_vertex_equalizes_turns() {
        let points = right_angle_corner();
        let p = equal_angle_point(&points, false, AngleAnchor::Vertex(2)).expect("Punkt erwartet");

        let offset = 10.0 * (3f64.sqrt() - 1.0);
        assert_relative_eq!(p.x, 10.0 + offset * 30f64.to_radians().cos(), epsilon = 1e-9);
        assert_relative_eq!(p.y, offset * 0.5, epsilon = 1e-9);

        let (p11, p12, p21, p22) = (points[0], points[1], points[3], points[4]);
        let turn_in = turn_angle(heading(p11, p12), heading(p12, p));
        let turn_at = turn_angle(heading(p12, p), heading(p, p21));
        let turn_out = turn_angle(heading(p, p21), heading(p21, p22));
        assert_relative_eq!(turn_in, turn_out, epsilon = 1e-9);
        assert_relative_eq!(turn_in, turn_at, epsilon = 1e-9);
    }

    #[test]
    fn equal_angle_point_for_segment_uses_outer_neighbours() {
        let points = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(20.0, 10.0),
            DVec2::new(20.0, 20.0),
        ];
        let p = equal_angle_point(&points, false, AngleAnchor::Segment(1)).expect("Punkt erwartet");
        let turn_in = turn_angle(heading(points[0], points[1]), heading(points[1], p));
        let turn_out = turn_angle(heading(p, points[2]), heading(points[2], points[3]));
        assert_relative_eq!(turn_in, turn_out, epsilon = 1e-9);
    }

    #[test]
    fn equal_angle_point_needs_neighbours_on_open_polyline() {
        let points = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(20.0, 0.0),
        ];
        assert!(equal_angle_point(&points, false, AngleAnchor::Vertex(1)).is_none());
        assert!(equal_angle_point(&points, false, AngleAnchor::Segment(0)).is_none());
    }

    #[test]
    fn equal_angle_point_on_straight_line_is_degenerate() {
        let points: Vec<DVec2> = (0..5).map(|i| DVec2::new(i as f64 * 10.0, 0.0)).collect();
        assert!(equal_angle_point(&points, false, AngleAnchor::Vertex(2)).is_none());
    }

    #[test]
    fn equal_angle_point_wraps_on_closed_polyline() {
        let square = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
            DVec2::new(0.0, 0.0),
        ];
        // Abschnitt 0→1: Nachbarn sind (0,10)→(0,0) und (10,0)→(10,10)
        let p = equal_angle_point(&square, true, AngleAnchor::Segment(0)).expect("Punkt erwartet");
        // Abweichung 180° wird zu -180° normalisiert → Drehung um -60°
        assert_relative_eq!(p.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 5.0 * 30f64.to_radians().tan(), epsilon = 1e-9);
    }
}
