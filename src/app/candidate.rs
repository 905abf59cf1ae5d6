//! Kandidaten-Verwaltung: welcher Vertex oder welche Kante gerade bearbeitet wird.
//!
//! Der Tracker liest nur aus dem Repository und mutiert ausschließlich seinen
//! eigenen Zustand. Für die Planung wird ein unveränderlicher
//! `InteractionSnapshot` erzeugt.

use glam::DVec2;

use crate::core::geometry::{self, distance_to_segment, AngleAnchor};
use crate::core::{EdgeRef, Projection, WayRepository};
use crate::shared::ImproveWayOptions;

/// Vom Host abstrahierte Modifikatoren (Rohtasten werden außerhalb gemappt).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Einfügen-Modus angefordert
    pub insert: bool,
    /// Löschen-Modus angefordert
    pub delete: bool,
    /// Auf Gleichwinkel-Punkt einrasten
    pub equal_angle_snap: bool,
}

impl Modifiers {
    /// Einfügen aktiv (und nicht gleichzeitig Löschen)
    pub fn insert_mode(&self) -> bool {
        self.insert && !self.delete
    }

    /// Löschen aktiv (und nicht gleichzeitig Einfügen)
    pub fn delete_mode(&self) -> bool {
        self.delete && !self.insert
    }
}

/// Aktuelles Bearbeitungsziel: Vertex oder Kante, nie beides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// Kandidat-Vertex
    Vertex(u64),
    /// Kandidat-Kante
    Segment(EdgeRef),
}

/// Unveränderlicher Zustand eines Interaktions-Frames.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionSnapshot {
    /// Modifikatoren zum Zeitpunkt des Frames
    pub modifiers: Modifiers,
    /// Mausposition in Weltkoordinaten
    pub pointer_world: Option<DVec2>,
    /// Aktueller Kandidat
    pub candidate: Option<Candidate>,
}

impl InteractionSnapshot {
    /// Gleichwinkel-Punkt für den aktuellen Kandidaten auf der Ziel-Polylinie.
    pub fn equal_angle_point(
        &self,
        repo: &dyn WayRepository,
        target_polyline_id: u64,
    ) -> Option<DVec2> {
        let polyline = repo.polyline(target_polyline_id)?;
        let anchor = match self.candidate? {
            Candidate::Vertex(vertex_id) => AngleAnchor::Vertex(polyline.index_of(vertex_id)?),
            Candidate::Segment(edge) if edge.polyline_id == target_polyline_id => {
                AngleAnchor::Segment(edge.index)
            }
            Candidate::Segment(_) => return None,
        };
        let positions = repo.polyline_positions(target_polyline_id)?;
        geometry::equal_angle_point(&positions, polyline.is_closed(), anchor)
    }

    /// Zielpunkt für die nächste Operation.
    ///
    /// Mit Gleichwinkel-Modifikator der Gleichwinkel-Punkt, sonst (oder wenn
    /// dieser nicht definiert ist) die projizierte Mausposition.
    pub fn resolve_target_point(
        &self,
        repo: &dyn WayRepository,
        target_polyline_id: u64,
    ) -> Option<DVec2> {
        if self.modifiers.equal_angle_snap {
            if let Some(point) = self.equal_angle_point(repo, target_polyline_id) {
                return Some(point);
            }
            log::debug!("Gleichwinkel-Punkt nicht definiert, verwende Mausposition");
        }
        self.pointer_world
    }
}

/// Hält den transienten Kandidaten-Zustand.
#[derive(Debug, Clone, Default)]
pub struct CandidateTracker {
    candidate: Option<Candidate>,
    modifiers: Modifiers,
    pointer_world: Option<DVec2>,
}

impl CandidateTracker {
    /// Erstellt einen leeren Tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Aktueller Kandidat
    pub fn candidate(&self) -> Option<Candidate> {
        self.candidate
    }

    /// Aktuelle Modifikatoren
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Verwirft Kandidat und Mausposition
    pub fn clear(&mut self) {
        self.candidate = None;
        self.pointer_world = None;
    }

    /// Berechnet den Kandidaten für die Mausposition neu.
    ///
    /// Im Einfügen-Modus wird nur nach Kanten gesucht. Sonst zuerst der nächste
    /// Vertex innerhalb des Vertex-Radius, danach die nächste Kante innerhalb des
    /// Kanten-Radius. Idempotent; das Repository wird nicht verändert.
    pub fn update(
        &mut self,
        pointer_screen: Option<DVec2>,
        modifiers: Modifiers,
        target_polyline_id: u64,
        repo: &dyn WayRepository,
        projection: &dyn Projection,
        options: &ImproveWayOptions,
    ) {
        self.modifiers = modifiers;
        let Some(screen) = pointer_screen else {
            self.clear();
            return;
        };
        self.pointer_world = Some(projection.screen_to_world(screen));

        let candidate = if modifiers.insert_mode() {
            nearest_segment(screen, target_polyline_id, repo, projection, options)
                .map(Candidate::Segment)
        } else {
            nearest_vertex(screen, target_polyline_id, repo, projection, options)
                .map(Candidate::Vertex)
                .or_else(|| {
                    nearest_segment(screen, target_polyline_id, repo, projection, options)
                        .map(Candidate::Segment)
                })
        };

        if candidate != self.candidate {
            log::debug!("Kandidat gewechselt: {:?} → {:?}", self.candidate, candidate);
        }
        self.candidate = candidate;
    }

    /// Unveränderlicher Snapshot für die Planung
    pub fn snapshot(&self) -> InteractionSnapshot {
        InteractionSnapshot {
            modifiers: self.modifiers,
            pointer_world: self.pointer_world,
            candidate: self.candidate,
        }
    }

    /// Zielpunkt auf Basis des aktuellen Zustands
    pub fn resolve_target_point(
        &self,
        repo: &dyn WayRepository,
        target_polyline_id: u64,
    ) -> Option<DVec2> {
        self.snapshot().resolve_target_point(repo, target_polyline_id)
    }
}

/// Nächster Vertex der Ziel-Polylinie innerhalb des Vertex-Pick-Radius.
fn nearest_vertex(
    screen: DVec2,
    target_polyline_id: u64,
    repo: &dyn WayRepository,
    projection: &dyn Projection,
    options: &ImproveWayOptions,
) -> Option<u64> {
    let polyline = repo.polyline(target_polyline_id)?;
    let world = projection.screen_to_world(screen);
    let radius = projection.pixels_to_world(screen, options.node_pick_radius_px);

    repo.vertices_within_radius(world, radius)
        .into_iter()
        .find(|hit| polyline.contains(hit.vertex_id))
        .map(|hit| hit.vertex_id)
}

/// Nächste Kante der Ziel-Polylinie innerhalb des Kanten-Pick-Radius (Screen-Abstand).
fn nearest_segment(
    screen: DVec2,
    target_polyline_id: u64,
    repo: &dyn WayRepository,
    projection: &dyn Projection,
    options: &ImproveWayOptions,
) -> Option<EdgeRef> {
    let positions = repo.polyline_positions(target_polyline_id)?;
    let screen_points: Vec<DVec2> = positions
        .iter()
        .map(|p| projection.world_to_screen(*p))
        .collect();

    let mut best: Option<(f64, usize)> = None;
    for (index, pair) in screen_points.windows(2).enumerate() {
        let dist = distance_to_segment(screen, pair[0], pair[1]);
        if dist > options.segment_pick_radius_px {
            continue;
        }
        if best.is_none_or(|(d, _)| dist < d) {
            best = Some((dist, index));
        }
    }
    best.map(|(_, index)| EdgeRef::new(target_polyline_id, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MapView, Polyline, Vertex, WayMap};

    /// Offene Linie A(0,0) – B(100,0) – C(200,0), Ansicht 1:1 um (100,0)
    fn setup() -> (WayMap, MapView) {
        let mut map = WayMap::new();
        map.add_vertex(Vertex::new(1, DVec2::new(0.0, 0.0)));
        map.add_vertex(Vertex::new(2, DVec2::new(100.0, 0.0)));
        map.add_vertex(Vertex::new(3, DVec2::new(200.0, 0.0)));
        map.add_polyline(Polyline::new(10, vec![1, 2, 3]))
            .expect("Polylinie gültig");

        let mut view = MapView::new(DVec2::new(400.0, 400.0));
        view.look_at(DVec2::new(100.0, 0.0));
        // 1 Pixel = 1 Welteinheit
        view.zoom = 2.0 * MapView::BASE_WORLD_EXTENT / 400.0;
        (map, view)
    }

    fn screen_of(view: &MapView, x: f64, y: f64) -> DVec2 {
        view.world_to_screen(DVec2::new(x, y))
    }

    #[test]
    fn picks_vertex_within_radius() {
        let (map, view) = setup();
        let mut tracker = CandidateTracker::new();
        tracker.update(
            Some(screen_of(&view, 103.0, 2.0)),
            Modifiers::default(),
            10,
            &map,
            &view,
            &ImproveWayOptions::default(),
        );
        assert_eq!(tracker.candidate(), Some(Candidate::Vertex(2)));
    }

    #[test]
    fn falls_back_to_segment_outside_vertex_radius() {
        let (map, view) = setup();
        let mut tracker = CandidateTracker::new();
        tracker.update(
            Some(screen_of(&view, 150.0, 5.0)),
            Modifiers::default(),
            10,
            &map,
            &view,
            &ImproveWayOptions::default(),
        );
        assert_eq!(tracker.candidate(), Some(Candidate::Segment(EdgeRef::new(10, 1))));
    }

    #[test]
    fn clears_candidate_far_away() {
        let (map, view) = setup();
        let mut tracker = CandidateTracker::new();
        let options = ImproveWayOptions::default();
        tracker.update(Some(screen_of(&view, 100.0, 0.0)), Modifiers::default(), 10, &map, &view, &options);
        assert!(tracker.candidate().is_some());

        tracker.update(Some(screen_of(&view, 100.0, 80.0)), Modifiers::default(), 10, &map, &view, &options);
        assert_eq!(tracker.candidate(), None);
        assert!(tracker.snapshot().pointer_world.is_some());
    }

    #[test]
    fn insert_mode_prefers_segment_even_near_vertex() {
        let (map, view) = setup();
        let mut tracker = CandidateTracker::new();
        let modifiers = Modifiers {
            insert: true,
            ..Default::default()
        };
        tracker.update(
            Some(screen_of(&view, 98.0, 1.0)),
            modifiers,
            10,
            &map,
            &view,
            &ImproveWayOptions::default(),
        );
        assert_eq!(tracker.candidate(), Some(Candidate::Segment(EdgeRef::new(10, 0))));
    }

    #[test]
    fn vertices_of_other_polylines_are_ignored() {
        let (mut map, view) = setup();
        map.add_vertex(Vertex::new(4, DVec2::new(100.0, 3.0)));
        map.add_vertex(Vertex::new(5, DVec2::new(100.0, 50.0)));
        map.add_polyline(Polyline::new(20, vec![4, 5])).expect("Polylinie gültig");

        let mut tracker = CandidateTracker::new();
        tracker.update(
            Some(screen_of(&view, 100.0, 3.0)),
            Modifiers::default(),
            10,
            &map,
            &view,
            &ImproveWayOptions::default(),
        );
        assert_eq!(tracker.candidate(), Some(Candidate::Vertex(2)));
    }

    #[test]
    fn update_is_idempotent_and_read_only() {
        let (map, view) = setup();
        let before = map.clone();
        let mut tracker = CandidateTracker::new();
        let options = ImproveWayOptions::default();
        let screen = Some(screen_of(&view, 150.0, 5.0));
        tracker.update(screen, Modifiers::default(), 10, &map, &view, &options);
        let first = tracker.snapshot();
        tracker.update(screen, Modifiers::default(), 10, &map, &view, &options);
        assert_eq!(tracker.snapshot(), first);
        assert_eq!(map.vertex(2), before.vertex(2));
        assert_eq!(map.polyline(10), before.polyline(10));
    }

    #[test]
    fn missing_pointer_yields_no_target_point() {
        let (map, _view) = setup();
        let tracker = CandidateTracker::new();
        assert_eq!(tracker.resolve_target_point(&map, 10), None);
    }

    #[test]
    fn equal_angle_snap_falls_back_to_pointer() {
        let (map, view) = setup();
        let mut tracker = CandidateTracker::new();
        let modifiers = Modifiers {
            equal_angle_snap: true,
            ..Default::default()
        };
        let screen = screen_of(&view, 101.0, 1.0);
        tracker.update(Some(screen), modifiers, 10, &map, &view, &ImproveWayOptions::default());

        // Offene 3er-Linie: keine äußeren Nachbarn → Mausposition
        let point = tracker.resolve_target_point(&map, 10).expect("Zielpunkt erwartet");
        let expected = view.screen_to_world(screen);
        assert!((point - expected).length() < 1e-9);
    }
}
