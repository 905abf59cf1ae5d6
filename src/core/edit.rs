//! Edit-Operationen und Batches, wie sie der Planer erzeugt und der Host anwendet.

use glam::DVec2;

use super::{EdgeRef, Vertex};

/// Eine einzelne Mutation am Repository.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOperation {
    /// Neuen Vertex im Repository anlegen
    AddVertex { vertex: Vertex },
    /// Vertex in eine Kante einfügen (an `edge.upper_index()`)
    InsertVertex { edge: EdgeRef, vertex_id: u64 },
    /// Vertex aus der Folge einer Polylinie entfernen
    RemoveVertexFromPolyline { polyline_id: u64, vertex_id: u64 },
    /// Vertex um ein Delta verschieben (Identität bleibt erhalten)
    MoveVertex { vertex_id: u64, delta: DVec2 },
    /// Vertex-Folge einer Polylinie komplett ersetzen
    ReplacePolylineVertices {
        polyline_id: u64,
        vertex_ids: Vec<u64>,
    },
    /// Vertex aus dem Repository löschen (darf nicht mehr referenziert sein)
    DeleteVertex { vertex_id: u64 },
    /// Polylinie löschen, die unter zwei Vertices fallen würde
    DeletePolyline { polyline_id: u64 },
}

/// Geordneter, aus Sicht des Hosts atomarer Satz von Operationen.
#[derive(Debug, Clone, PartialEq)]
pub struct EditBatch {
    /// Lesbare Beschreibung für die Undo-Historie
    pub label: String,
    /// Anzahl betroffener Objekte (für Pluralisierung)
    pub count: usize,
    /// Operationen in Anwendungsreihenfolge
    pub operations: Vec<EditOperation>,
}

impl EditBatch {
    /// Erstellt einen Batch
    pub fn new(label: impl Into<String>, count: usize, operations: Vec<EditOperation>) -> Self {
        Self {
            label: label.into(),
            count,
            operations,
        }
    }

    /// Anzahl der `InsertVertex`-Operationen
    pub fn insert_count(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, EditOperation::InsertVertex { .. }))
            .count()
    }
}

/// Nimmt fertige Batches entgegen (Undo/Redo liegt beim Host).
pub trait CommandSink {
    /// Übergibt einen Batch zur transaktionalen Anwendung.
    fn submit(&mut self, batch: EditBatch) -> anyhow::Result<()>;
}

/// Sammelt Batches nur auf, ohne sie anzuwenden.
impl CommandSink for Vec<EditBatch> {
    fn submit(&mut self, batch: EditBatch) -> anyhow::Result<()> {
        self.push(batch);
        Ok(())
    }
}
