//! KD-Tree über den Vertex-Positionen für die Radius-Suche der Kandidaten.

use glam::DVec2;
use kiddo::{KdTree, SquaredEuclidean};

use crate::core::Vertex;

/// Treffer einer Radius-Abfrage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMatch {
    /// ID des gefundenen Vertex
    pub vertex_id: u64,
    /// Euklidische Distanz zum Suchpunkt
    pub distance: f64,
}

/// Read-only Index; der KD-Tree speichert die Vertex-ID direkt als Item.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: KdTree<f64, 2>,
}

impl SpatialIndex {
    /// Leerer Index (WayMap ohne Vertices).
    pub fn empty() -> Self {
        Self {
            tree: KdTree::new(),
        }
    }

    /// Baut den Index aus den übergebenen Vertices.
    pub fn from_vertices<'a>(vertices: impl IntoIterator<Item = &'a Vertex>) -> Self {
        let mut tree: KdTree<f64, 2> = KdTree::new();
        for vertex in vertices {
            tree.add(&[vertex.position.x, vertex.position.y], vertex.id);
        }
        Self { tree }
    }

    /// Alle Vertices mit Distanz `<= radius`, aufsteigend nach Distanz und bei
    /// Gleichstand nach ID. Negativer Radius liefert nichts.
    pub fn within_radius(&self, query: DVec2, radius: f64) -> Vec<SpatialMatch> {
        if radius.is_sign_negative() {
            return Vec::new();
        }

        let mut matches: Vec<SpatialMatch> = self
            .tree
            .within::<SquaredEuclidean>(&[query.x, query.y], radius * radius)
            .into_iter()
            .map(|hit| SpatialMatch {
                vertex_id: hit.item,
                distance: hit.distance.sqrt(),
            })
            .collect();

        matches.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.vertex_id.cmp(&b.vertex_id))
        });
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vertices() -> Vec<Vertex> {
        vec![
            Vertex::new(1, DVec2::new(0.0, 0.0)),
            Vertex::new(2, DVec2::new(10.0, 0.0)),
            Vertex::new(3, DVec2::new(4.0, 3.0)),
        ]
    }

    #[test]
    fn radius_query_returns_sorted_matches() {
        let index = SpatialIndex::from_vertices(&sample_vertices());
        let matches = index.within_radius(DVec2::new(0.0, 0.0), 6.0);

        let ids: Vec<u64> = matches.iter().map(|m| m.vertex_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!((matches[1].distance - 5.0).abs() < 1e-12);
    }

    #[test]
    fn equal_distance_is_ordered_by_id() {
        let vertices = vec![
            Vertex::new(9, DVec2::new(-1.0, 0.0)),
            Vertex::new(4, DVec2::new(1.0, 0.0)),
        ];
        let index = SpatialIndex::from_vertices(&vertices);
        let ids: Vec<u64> = index
            .within_radius(DVec2::ZERO, 1.0)
            .into_iter()
            .map(|m| m.vertex_id)
            .collect();
        assert_eq!(ids, vec![4, 9]);
    }

    #[test]
    fn empty_index_and_negative_radius_yield_nothing() {
        assert!(SpatialIndex::empty()
            .within_radius(DVec2::ZERO, 5.0)
            .is_empty());

        let index = SpatialIndex::from_vertices(&sample_vertices());
        assert!(index.within_radius(DVec2::ZERO, -1.0).is_empty());
    }
}
