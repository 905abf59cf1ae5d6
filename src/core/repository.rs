//! Lese-Vertrag des Vertex-/Polylinien-Repositories.

use glam::DVec2;

use super::{Polyline, SpatialMatch, Vertex};

/// Read-only Zugriff auf das geometrische Modell des Hosts.
///
/// Mutationen laufen ausschließlich über `EditBatch`es.
pub trait WayRepository {
    /// Vertex per ID
    fn vertex(&self, id: u64) -> Option<&Vertex>;
    /// Polylinie per ID
    fn polyline(&self, id: u64) -> Option<&Polyline>;
    /// IDs aller Polylinien, die den Vertex referenzieren (stabile Reihenfolge)
    fn referrers(&self, vertex_id: u64) -> Vec<u64>;
    /// Vertices innerhalb eines Radius, aufsteigend nach Distanz
    fn vertices_within_radius(&self, query: DVec2, radius: f64) -> Vec<SpatialMatch>;
    /// Nächste freie Vertex-ID
    fn next_vertex_id(&self) -> u64;
    /// Nächstgelegene Polylinie innerhalb von `max_distance` (Welteinheiten)
    fn nearest_polyline(&self, query: DVec2, max_distance: f64) -> Option<u64>;

    /// Geordnete Kantenliste einer Polylinie
    fn node_pairs(&self, polyline_id: u64) -> Vec<(u64, u64)> {
        self.polyline(polyline_id)
            .map(Polyline::node_pairs)
            .unwrap_or_default()
    }

    /// Positionen aller Einträge einer Polylinie (inkl. Schluss-Vertex).
    ///
    /// `None`, wenn die Polylinie oder einer ihrer Vertices fehlt.
    fn polyline_positions(&self, polyline_id: u64) -> Option<Vec<DVec2>> {
        self.polyline(polyline_id)?
            .vertex_ids()
            .iter()
            .map(|id| self.vertex(*id).map(|v| v.position))
            .collect()
    }

    /// Gesamtzahl der Referenzen auf den Vertex über alle Referrer.
    fn reference_count(&self, vertex_id: u64) -> usize {
        self.referrers(vertex_id)
            .into_iter()
            .filter_map(|pid| self.polyline(pid))
            .map(|p| p.occurrences(vertex_id))
            .sum()
    }
}
