//! Diagnose-Geometrie für die Zeichenhilfen: Abbiegewinkel, Abschnittslängen,
//! Mittelsenkrechte und Hilfslinien zu kreuzenden Wegen.
//!
//! Hier wird nur berechnet, gezeichnet wird vom Host. Winkel und Längen kommen
//! aus Weltkoordinaten, Beschriftungspositionen liegen in Screen-Pixeln.

use glam::DVec2;

use super::candidate::{Candidate, InteractionSnapshot};
use super::helpers::HelperFlags;
use crate::core::geometry::{self, fix_index};
use crate::core::{Projection, WayRepository};
use crate::shared::HelperStyle;

/// Abbiegewinkel an einem Vertex samt Bogen und Beschriftung.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnMarker {
    /// Vertex-Position (Screen)
    pub vertex_screen: DVec2,
    /// Vorzeichenbehafteter Abbiegewinkel in Grad
    pub signed_turn_deg: f64,
    /// Startwinkel des Bogens in Grad
    pub arc_start_deg: f64,
    /// Bogenlänge in Grad (= vorzeichenbehafteter Abbiegewinkel)
    pub arc_extent_deg: f64,
    /// Richtung der Beschriftung (Radiant, Screen)
    pub label_angle_rad: f64,
    /// Position der Beschriftung (Screen)
    pub label_screen: DVec2,
}

impl TurnMarker {
    /// Betrag des Abbiegewinkels in Grad
    pub fn turn_deg(&self) -> f64 {
        self.signed_turn_deg.abs()
    }

    /// Beschriftungstext, z.B. "30 °"
    pub fn label(&self) -> String {
        format!("{:.0} °", self.turn_deg())
    }
}

/// Länge eines Abschnitts samt Beschriftung.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentLength {
    /// Länge in Welteinheiten
    pub length: f64,
    /// Mittelpunkt des Abschnitts (Screen)
    pub midpoint_screen: DVec2,
    /// Richtung der Beschriftung (Radiant, Screen)
    pub label_angle_rad: f64,
    /// Position der Beschriftung (Screen)
    pub label_screen: DVec2,
}

impl SegmentLength {
    /// Beschriftungstext, z.B. "12 m"
    pub fn label(&self) -> String {
        format!("{:.0} m", self.length)
    }
}

/// Abbiegewinkel und Abschnittslängen eines Wegs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WayDiagnostics {
    pub turns: Vec<TurnMarker>,
    pub segments: Vec<SegmentLength>,
}

/// Wie der Vorschau-Punkt in die Folge eingesetzt wird.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreviewSubstitution {
    /// Unveränderte Geometrie
    Original,
    /// Neuer Punkt vor dem zweiten Endpunkt der Kandidaten-Kante
    InsertBefore { vertex_id: u64, point: DVec2 },
    /// Kandidat-Vertex an neuer Position
    Replace { vertex_id: u64, point: DVec2 },
    /// Kandidat-Vertex entfällt
    Omit { vertex_id: u64 },
}

impl PreviewSubstitution {
    /// Leitet die Ersetzung aus dem Snapshot ab.
    pub fn from_snapshot(
        snapshot: &InteractionSnapshot,
        repo: &dyn WayRepository,
        target_polyline_id: u64,
        use_original: bool,
    ) -> Self {
        if use_original {
            return Self::Original;
        }
        let modifiers = snapshot.modifiers;
        let point = snapshot.resolve_target_point(repo, target_polyline_id);
        match (snapshot.candidate, point) {
            (Some(Candidate::Segment(edge)), Some(point)) if modifiers.insert => repo
                .polyline(edge.polyline_id)
                .and_then(|p| p.edge_endpoints(edge.index))
                .map_or(Self::Original, |(_, second)| Self::InsertBefore {
                    vertex_id: second,
                    point,
                }),
            (Some(Candidate::Vertex(vertex_id)), _) if modifiers.delete_mode() => {
                Self::Omit { vertex_id }
            }
            (Some(Candidate::Vertex(vertex_id)), Some(point))
                if !modifiers.insert && !modifiers.delete =>
            {
                Self::Replace { vertex_id, point }
            }
            _ => Self::Original,
        }
    }
}

/// Punkt der Diagnose-Folge: Weltposition und Schleifenindex.
struct SequencePoint {
    world: DVec2,
    loop_index: usize,
}

/// Baut die Folge der zu vermessenden Punkte.
///
/// Geschlossene Wege besuchen den zweiten Vertex erneut, damit auch der
/// Start-/End-Vertex einen Abbiegewinkel erhält.
fn diagnostic_sequence(
    vertex_ids: &[u64],
    positions: &[DVec2],
    closed: bool,
    preview: PreviewSubstitution,
) -> Vec<SequencePoint> {
    let count = vertex_ids.len();
    let end = if closed { count + 1 } else { count };
    let mut sequence = Vec::with_capacity(end + 1);
    let mut inserted = false;
    let mut i = 0;

    while i < end {
        let index = if i == count { 1 } else { i };
        let vertex_id = vertex_ids[index];
        let world = match preview {
            PreviewSubstitution::InsertBefore {
                vertex_id: second,
                point,
            } if !inserted && vertex_id == second => {
                inserted = true;
                sequence.push(SequencePoint {
                    world: point,
                    loop_index: i,
                });
                // gleichen Vertex danach normal besuchen
                continue;
            }
            PreviewSubstitution::Replace {
                vertex_id: candidate,
                point,
            } if vertex_id == candidate => point,
            PreviewSubstitution::Omit {
                vertex_id: candidate,
            } if vertex_id == candidate => {
                i += 1;
                continue;
            }
            _ => positions[index],
        };
        sequence.push(SequencePoint {
            world,
            loop_index: i,
        });
        i += 1;
    }
    sequence
}

/// Punkt in `distance` Pixeln Abstand unter `angle` (Screen-Radiant).
fn displaced(anchor: DVec2, distance: f64, angle: f64) -> DVec2 {
    anchor + distance * DVec2::new(angle.cos(), angle.sin())
}

/// Berechnet Abbiegewinkel und Abschnittslängen der Ziel-Polylinie.
pub fn way_diagnostics(
    repo: &dyn WayRepository,
    target_polyline_id: u64,
    preview: PreviewSubstitution,
    projection: &dyn Projection,
    style: &HelperStyle,
) -> Option<WayDiagnostics> {
    let polyline = repo.polyline(target_polyline_id)?;
    let positions = repo.polyline_positions(target_polyline_id)?;
    let sequence = diagnostic_sequence(
        polyline.vertex_ids(),
        &positions,
        polyline.is_closed(),
        preview,
    );
    let count = polyline.len();

    let mut result = WayDiagnostics::default();
    let mut last_heading = 0.0;
    for (k, pair) in sequence.windows(2).enumerate() {
        let (last, current) = (&pair[0], &pair[1]);
        let heading = geometry::heading(last.world, current.world);
        let last_screen = projection.world_to_screen(last.world);

        if k >= 1 {
            let fixed = geometry::turn_angle(last_heading, heading);
            let side = if fixed >= 0.0 { 90.0 } else { -90.0 };
            let label_angle_rad = (last_heading + fixed / 2.0 + side).to_radians();
            result.turns.push(TurnMarker {
                vertex_screen: last_screen,
                signed_turn_deg: fixed,
                arc_start_deg: -heading + side,
                arc_extent_deg: fixed,
                label_angle_rad,
                label_screen: displaced(last_screen, style.turn_text_distance_px, label_angle_rad),
            });
        }

        // erste Kante geschlossener Wege nicht doppelt beschriften
        if current.loop_index != count {
            let midpoint_screen = (last_screen + projection.world_to_screen(current.world)) * 0.5;
            let label_angle_rad = (heading + 90.0).to_radians();
            result.segments.push(SegmentLength {
                length: geometry::distance(last.world, current.world),
                midpoint_screen,
                label_angle_rad,
                label_screen: displaced(
                    midpoint_screen,
                    style.distance_text_distance_px,
                    label_angle_rad,
                ),
            });
        }
        last_heading = heading;
    }
    Some(result)
}

/// Endpunkte für die Mittelsenkrechte (Welt).
///
/// Kante → ihre Endpunkte; Vertex → seine beiden Nachbarn im Ziel-Weg.
pub fn candidate_endpoints(
    repo: &dyn WayRepository,
    target_polyline_id: u64,
    candidate: Candidate,
) -> Option<(DVec2, DVec2)> {
    let polyline = repo.polyline(target_polyline_id)?;
    let (first, second) = match candidate {
        Candidate::Segment(edge) => repo.polyline(edge.polyline_id)?.edge_endpoints(edge.index)?,
        Candidate::Vertex(vertex_id) => {
            let distinct = polyline.distinct_ids();
            let index = polyline.index_of(vertex_id)? as isize;
            let closed = polyline.is_closed();
            let prev = fix_index(distinct.len(), closed, index - 1)?;
            let next = fix_index(distinct.len(), closed, index + 1)?;
            (distinct[prev], distinct[next])
        }
    };
    Some((repo.vertex(first)?.position, repo.vertex(second)?.position))
}

/// Mittelsenkrechte zwischen zwei Screen-Punkten mit halber Länge `half_length`.
pub fn half_distance_line(p1: DVec2, p2: DVec2, half_length: f64) -> (DVec2, DVec2) {
    let half = (p1 + p2) * 0.5;
    let delta = p2 - p1;
    let angle = delta.y.atan2(delta.x) + std::f64::consts::FRAC_PI_2;
    let offset = half_length * DVec2::new(angle.cos(), angle.sin());
    (half + offset, half - offset)
}

/// Hilfslinien vom neuen Punkt zu den Nachbarn des Kandidat-Vertex in
/// allen anderen Wegen (Welt).
pub fn intersecting_way_helper_lines(
    repo: &dyn WayRepository,
    target_polyline_id: u64,
    vertex_id: u64,
    new_point: DVec2,
) -> Vec<(DVec2, DVec2)> {
    let mut lines = Vec::new();
    for polyline_id in repo.referrers(vertex_id) {
        if polyline_id == target_polyline_id {
            continue;
        }
        let Some(polyline) = repo.polyline(polyline_id) else {
            continue;
        };
        let ids = polyline.vertex_ids();
        for (i, _) in ids.iter().enumerate().filter(|(_, id)| **id == vertex_id) {
            let neighbours = [i.checked_sub(1), (i + 1 < ids.len()).then_some(i + 1)];
            for neighbour in neighbours.into_iter().flatten() {
                if let Some(vertex) = repo.vertex(ids[neighbour]) {
                    lines.push((new_point, vertex.position));
                }
            }
        }
    }
    lines
}

/// Alles, was der Host für die Hilfen eines Frames zeichnen muss (Screen).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HelperOverlay {
    /// Abbiegewinkel und Längen (nur bei aktiven Hilfen)
    pub diagnostics: Option<WayDiagnostics>,
    /// Mittelsenkrechte (nur bei aktiven Hilfen, nicht im Lösch-Modus)
    pub half_distance_line: Option<(DVec2, DVec2)>,
    /// Gleichwinkel-Punkt und Kreisdurchmesser (nur bei aktiven Hilfen)
    pub equal_angle_circle: Option<(DVec2, f64)>,
    /// Hilfslinien zu kreuzenden Wegen (Verschieben)
    pub intersecting_lines: Vec<(DVec2, DVec2)>,
}

/// Baut das Overlay für den aktuellen Frame.
pub fn build_overlay(
    repo: &dyn WayRepository,
    target_polyline_id: u64,
    snapshot: &InteractionSnapshot,
    projection: &dyn Projection,
    style: &HelperStyle,
    flags: HelperFlags,
) -> HelperOverlay {
    let mut overlay = HelperOverlay::default();
    let modifiers = snapshot.modifiers;

    if let (Some(Candidate::Vertex(vertex_id)), false, false) =
        (snapshot.candidate, modifiers.insert, modifiers.delete)
    {
        if let Some(point) = snapshot.resolve_target_point(repo, target_polyline_id) {
            overlay.intersecting_lines =
                intersecting_way_helper_lines(repo, target_polyline_id, vertex_id, point)
                    .into_iter()
                    .map(|(a, b)| (projection.world_to_screen(a), projection.world_to_screen(b)))
                    .collect();
        }
    }

    if !flags.enabled {
        return overlay;
    }

    if !modifiers.delete_mode() {
        overlay.half_distance_line = snapshot
            .candidate
            .and_then(|c| candidate_endpoints(repo, target_polyline_id, c))
            .map(|(a, b)| {
                half_distance_line(
                    projection.world_to_screen(a),
                    projection.world_to_screen(b),
                    style.perpendicular_length_px,
                )
            });
    }

    let preview =
        PreviewSubstitution::from_snapshot(snapshot, repo, target_polyline_id, flags.use_original);
    overlay.diagnostics = way_diagnostics(repo, target_polyline_id, preview, projection, style);

    overlay.equal_angle_circle = snapshot
        .equal_angle_point(repo, target_polyline_id)
        .map(|p| (projection.world_to_screen(p), style.equal_angle_circle_radius_px));

    overlay
}
