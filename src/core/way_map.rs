//! Die zentrale WayMap-Datenstruktur: Vertex-Arena, Polylinien, Referrer-Index
//! und Spatial-Index. Dient als In-Memory-Repository und Referenz-Host.

use super::geometry::distance_to_segment;
use super::{
    CommandSink, EditBatch, EditOperation, Polyline, SpatialIndex, SpatialMatch, Vertex,
    WayRepository,
};
use anyhow::{bail, Context, Result};
use glam::DVec2;
use indexmap::IndexSet;
use std::collections::HashMap;

/// In-Memory-Modell aller Vertices und Polylinien
#[derive(Debug, Clone)]
pub struct WayMap {
    /// Alle Vertices, indexiert nach ihrer ID
    vertices: HashMap<u64, Vertex>,
    /// Alle Polylinien, indexiert nach ihrer ID
    polylines: HashMap<u64, Polyline>,
    /// Vertex-ID → referenzierende Polylinien (in Einfügereihenfolge)
    referrers: HashMap<u64, IndexSet<u64>>,
    /// Persistenter Spatial-Index fuer schnelle Vertex-Abfragen
    spatial_index: SpatialIndex,
}

impl Default for WayMap {
    fn default() -> Self {
        Self::new()
    }
}

impl WayMap {
    /// Erstellt eine neue leere WayMap
    pub fn new() -> Self {
        Self {
            vertices: HashMap::new(),
            polylines: HashMap::new(),
            referrers: HashMap::new(),
            spatial_index: SpatialIndex::empty(),
        }
    }

    /// Fügt einen Vertex hinzu (ersetzt einen bestehenden mit gleicher ID)
    pub fn add_vertex(&mut self, vertex: Vertex) {
        self.vertices.insert(vertex.id, vertex);
        self.rebuild_spatial_index();
    }

    /// Fügt eine Polylinie hinzu.
    ///
    /// Alle referenzierten Vertices müssen existieren; offene Polylinien brauchen
    /// mindestens 2, geschlossene mindestens 3 unterschiedliche Vertices.
    pub fn add_polyline(&mut self, polyline: Polyline) -> Result<()> {
        if self.polylines.contains_key(&polyline.id) {
            bail!("Polylinie {} existiert bereits", polyline.id);
        }
        self.validate_sequence(polyline.id, polyline.vertex_ids())?;
        let id = polyline.id;
        self.polylines.insert(id, polyline);
        self.index_polyline(id);
        Ok(())
    }

    /// Vertex per ID
    pub fn vertex(&self, id: u64) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// Polylinie per ID
    pub fn polyline(&self, id: u64) -> Option<&Polyline> {
        self.polylines.get(&id)
    }

    /// Iterator über alle Polylinien (read-only).
    pub fn polylines_iter(&self) -> impl Iterator<Item = &Polyline> {
        self.polylines.values()
    }

    /// Gibt die Anzahl der Vertices zurück
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Gibt die Anzahl der Polylinien zurück
    pub fn polyline_count(&self) -> usize {
        self.polylines.len()
    }

    /// Baut den persistenten Spatial-Index aus den aktuellen Vertices neu auf.
    pub fn rebuild_spatial_index(&mut self) {
        self.spatial_index = SpatialIndex::from_vertices(self.vertices.values());
    }

    /// Wendet einen Batch transaktional an: entweder alle Operationen oder keine.
    pub fn apply_batch(&mut self, batch: &EditBatch) -> Result<()> {
        let mut staged = self.clone();
        for (i, op) in batch.operations.iter().enumerate() {
            staged
                .apply_operation(op)
                .with_context(|| format!("Operation {} von '{}' fehlgeschlagen", i, batch.label))?;
        }
        staged.rebuild_spatial_index();
        *self = staged;
        log::info!(
            "Batch '{}' angewendet ({} Operation(en))",
            batch.label,
            batch.operations.len()
        );
        Ok(())
    }

    fn apply_operation(&mut self, op: &EditOperation) -> Result<()> {
        match op {
            EditOperation::AddVertex { vertex } => {
                if self.vertices.contains_key(&vertex.id) {
                    bail!("Vertex {} existiert bereits", vertex.id);
                }
                self.vertices.insert(vertex.id, vertex.clone());
            }
            EditOperation::InsertVertex { edge, vertex_id } => {
                if !self.vertices.contains_key(vertex_id) {
                    bail!("Vertex {} fehlt", vertex_id);
                }
                let polyline = self.polyline_or_err(edge.polyline_id)?;
                if edge.upper_index() >= polyline.len() {
                    bail!(
                        "Kante {} liegt außerhalb von Polylinie {}",
                        edge.index,
                        edge.polyline_id
                    );
                }
                let ids = polyline.with_vertex_inserted(edge.upper_index(), *vertex_id);
                self.replace_sequence(edge.polyline_id, ids)?;
            }
            EditOperation::RemoveVertexFromPolyline {
                polyline_id,
                vertex_id,
            } => {
                let ids = self.polyline_or_err(*polyline_id)?.spliced_without(*vertex_id);
                self.replace_sequence(*polyline_id, ids)?;
            }
            EditOperation::MoveVertex { vertex_id, delta } => {
                let Some(vertex) = self.vertices.get_mut(vertex_id) else {
                    bail!("Vertex {} fehlt", vertex_id);
                };
                vertex.position += *delta;
            }
            EditOperation::ReplacePolylineVertices {
                polyline_id,
                vertex_ids,
            } => {
                self.replace_sequence(*polyline_id, vertex_ids.clone())?;
            }
            EditOperation::DeleteVertex { vertex_id } => {
                if self.referrers.get(vertex_id).is_some_and(|r| !r.is_empty()) {
                    bail!("Vertex {} wird noch referenziert", vertex_id);
                }
                if self.vertices.remove(vertex_id).is_none() {
                    bail!("Vertex {} fehlt", vertex_id);
                }
                self.referrers.remove(vertex_id);
            }
            EditOperation::DeletePolyline { polyline_id } => {
                self.polyline_or_err(*polyline_id)?;
                self.unindex_polyline(*polyline_id);
                self.polylines.remove(polyline_id);
            }
        }
        Ok(())
    }

    fn polyline_or_err(&self, polyline_id: u64) -> Result<&Polyline> {
        self.polylines
            .get(&polyline_id)
            .with_context(|| format!("Polylinie {} fehlt", polyline_id))
    }

    fn replace_sequence(&mut self, polyline_id: u64, vertex_ids: Vec<u64>) -> Result<()> {
        self.validate_sequence(polyline_id, &vertex_ids)?;
        self.unindex_polyline(polyline_id);
        if let Some(polyline) = self.polylines.get_mut(&polyline_id) {
            polyline.set_vertex_ids(vertex_ids);
        }
        self.index_polyline(polyline_id);
        Ok(())
    }

    fn validate_sequence(&self, polyline_id: u64, vertex_ids: &[u64]) -> Result<()> {
        if vertex_ids.len() < 2 {
            bail!("Polylinie {} braucht mindestens 2 Vertices", polyline_id);
        }
        if let Some(missing) = vertex_ids.iter().find(|id| !self.vertices.contains_key(id)) {
            bail!("Polylinie {} referenziert fehlenden Vertex {}", polyline_id, missing);
        }
        let closed = vertex_ids.len() >= 3 && vertex_ids.first() == vertex_ids.last();
        if closed {
            let distinct: IndexSet<u64> = vertex_ids.iter().copied().collect();
            if distinct.len() < 3 {
                bail!(
                    "Geschlossene Polylinie {} braucht mindestens 3 unterschiedliche Vertices",
                    polyline_id
                );
            }
        }
        Ok(())
    }

    fn index_polyline(&mut self, polyline_id: u64) {
        let Some(polyline) = self.polylines.get(&polyline_id) else {
            return;
        };
        for &vid in polyline.vertex_ids() {
            self.referrers.entry(vid).or_default().insert(polyline_id);
        }
    }

    fn unindex_polyline(&mut self, polyline_id: u64) {
        let Some(polyline) = self.polylines.get(&polyline_id) else {
            return;
        };
        for vid in polyline.vertex_ids() {
            if let Some(set) = self.referrers.get_mut(vid) {
                set.shift_remove(&polyline_id);
            }
        }
    }
}

impl WayRepository for WayMap {
    fn vertex(&self, id: u64) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    fn polyline(&self, id: u64) -> Option<&Polyline> {
        self.polylines.get(&id)
    }

    fn referrers(&self, vertex_id: u64) -> Vec<u64> {
        self.referrers
            .get(&vertex_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    fn vertices_within_radius(&self, query: DVec2, radius: f64) -> Vec<SpatialMatch> {
        self.spatial_index.within_radius(query, radius)
    }

    fn next_vertex_id(&self) -> u64 {
        self.vertices.keys().max().copied().unwrap_or(0) + 1
    }

    /// Findet die nächstgelegene Polylinie (Abstand zur nächsten Kante).
    ///
    /// Bei Gleichstand gewinnt die kleinere ID, damit das Ergebnis deterministisch bleibt.
    fn nearest_polyline(&self, query: DVec2, max_distance: f64) -> Option<u64> {
        let mut best: Option<(f64, u64)> = None;
        for polyline in self.polylines.values() {
            let Some(positions) = self.polyline_positions(polyline.id) else {
                continue;
            };
            let dist = positions
                .windows(2)
                .map(|w| distance_to_segment(query, w[0], w[1]))
                .fold(f64::INFINITY, f64::min);
            if dist > max_distance {
                continue;
            }
            let better = match best {
                None => true,
                Some((d, id)) => dist < d || (dist == d && polyline.id < id),
            };
            if better {
                best = Some((dist, polyline.id));
            }
        }
        best.map(|(_, id)| id)
    }
}

/// Referenz-Host: wendet eingereichte Batches sofort an.
impl CommandSink for WayMap {
    fn submit(&mut self, batch: EditBatch) -> Result<()> {
        self.apply_batch(&batch)
    }
}
