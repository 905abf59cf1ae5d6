//! Repräsentiert einen Vertex (Wegpunkt) mit Identität, Position und Tags.

use glam::DVec2;
use indexmap::IndexMap;

/// Ein Vertex, auf den beliebig viele Polylinien verweisen können.
///
/// Die Referrer werden nicht im Vertex gespeichert, sondern über den
/// Referrer-Index des Repositories abgefragt.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Eindeutige ID
    pub id: u64,
    /// Projizierte Position (x = Ost, y = Nord)
    pub position: DVec2,
    /// Tags in Einfügereihenfolge; getaggte Vertices dürfen nicht still gelöscht werden
    pub tags: IndexMap<String, String>,
}

impl Vertex {
    /// Erstellt einen ungetaggten Vertex
    pub fn new(id: u64, position: DVec2) -> Self {
        Self {
            id,
            position,
            tags: IndexMap::new(),
        }
    }

    /// Builder: fügt einen Tag hinzu
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Prüft ob der Vertex mindestens einen Tag trägt
    pub fn is_tagged(&self) -> bool {
        !self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_vertex_reports_no_tags() {
        let vertex = Vertex::new(1, DVec2::new(1.0, 2.0));
        assert!(!vertex.is_tagged());
    }

    #[test]
    fn with_tag_keeps_insertion_order() {
        let vertex = Vertex::new(1, DVec2::ZERO)
            .with_tag("highway", "crossing")
            .with_tag("crossing", "zebra");

        assert!(vertex.is_tagged());
        let keys: Vec<&str> = vertex.tags.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["highway", "crossing"]);
    }
}
