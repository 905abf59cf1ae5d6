//! Edit-Planer: übersetzt eine bestätigte Aktion in einen geordneten Batch.
//!
//! Alle Funktionen sind rein: sie lesen Repository und Snapshot und liefern
//! entweder einen Batch, `None` (stilles No-Op) oder eine Ablehnung. Eine
//! Ablehnung enthält nie einen Teil-Batch.

use glam::DVec2;
use thiserror::Error;

use super::candidate::{Candidate, InteractionSnapshot};
use super::mode::ImproveState;
use crate::core::{EdgeRef, EditBatch, EditOperation, Vertex, WayRepository, WorldCheck};

/// Label für einen eingefügten Vertex in genau einem Weg.
pub const LABEL_ADD_NODE: &str = "Add a new node to way";
/// Label für das Lösen eines Vertex aus dem Ziel-Weg.
pub const LABEL_DETACH_NODE: &str = "Detach node from way";
/// Label für das Löschen eines Vertex.
pub const LABEL_DELETE_NODE: &str = "Delete node";
/// Label für das Verschieben eines Vertex.
pub const LABEL_MOVE_NODE: &str = "Move node";

/// Grund, warum eine Aktion verweigert wurde. Das Repository bleibt unverändert.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditRefusal {
    /// Zielpunkt liegt außerhalb der gültigen Welt
    #[error("Zielpunkt ({:.3}, {:.3}) liegt außerhalb der Welt", .point.x, .point.y)]
    OutsideWorld { point: DVec2 },
    /// Vertex trägt Tags und gehört nur zu einem Weg
    #[error("Vertex {vertex_id} hat Tags und kann nicht gelöscht werden")]
    TaggedVertex { vertex_id: u64 },
}

/// Welche Aktion ein Snapshot auslösen würde.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    /// Neuen Vertex in eine Kante einfügen
    Insert(EdgeRef),
    /// Vertex löschen bzw. vom Ziel-Weg lösen
    Delete(u64),
    /// Vertex verschieben
    Move(u64),
}

impl PlannedAction {
    /// Leitet die Aktion aus Modifikatoren und Kandidat ab.
    pub fn from_snapshot(snapshot: &InteractionSnapshot) -> Option<Self> {
        let modifiers = snapshot.modifiers;
        match snapshot.candidate? {
            Candidate::Segment(edge) if modifiers.insert_mode() => Some(Self::Insert(edge)),
            Candidate::Vertex(id) if modifiers.delete_mode() => Some(Self::Delete(id)),
            Candidate::Vertex(id) if !modifiers.insert_mode() => Some(Self::Move(id)),
            _ => None,
        }
    }
}

/// Plant die Aktion für eine bestätigte Interaktion (Maus losgelassen).
///
/// `Ok(None)` bei ungültigem Zustand: `Selecting`, kein Kandidat, kein Zielpunkt.
pub fn plan_commit(
    state: ImproveState,
    snapshot: &InteractionSnapshot,
    repo: &dyn WayRepository,
    world: &dyn WorldCheck,
) -> Result<Option<EditBatch>, EditRefusal> {
    let Some(target_polyline_id) = state.target() else {
        log::debug!("Kein Ziel-Weg gewählt, nichts zu planen");
        return Ok(None);
    };
    let Some(action) = PlannedAction::from_snapshot(snapshot) else {
        log::debug!("Kein passender Kandidat für die Modifikatoren");
        return Ok(None);
    };
    let Some(point) = snapshot.resolve_target_point(repo, target_polyline_id) else {
        log::debug!("Kein Zielpunkt verfügbar");
        return Ok(None);
    };

    let result = match action {
        PlannedAction::Insert(edge) => plan_insert(edge, point, repo, world),
        PlannedAction::Delete(vertex_id) => plan_delete(target_polyline_id, vertex_id, repo),
        PlannedAction::Move(vertex_id) => plan_move(vertex_id, point, repo, world),
    };

    match &result {
        Ok(Some(batch)) => log::info!(
            "Geplant: '{}' ({} Operation(en), Anzahl {})",
            batch.label,
            batch.operations.len(),
            batch.count
        ),
        Ok(None) => log::debug!("Aktion {:?} ergab keinen Batch", action),
        Err(refusal) => log::warn!("Aktion {:?} abgelehnt: {}", action, refusal),
    }
    result
}

/// Fügt einen neuen Vertex in jede Polylinie ein, die die Kante enthält.
///
/// Alle Vorkommen der Kante (in beiden Richtungen) erhalten denselben Vertex.
/// Innerhalb einer Polylinie absteigend nach Index, damit die Indizes bei
/// sequentieller Anwendung gültig bleiben.
pub fn plan_insert(
    edge: EdgeRef,
    point: DVec2,
    repo: &dyn WayRepository,
    world: &dyn WorldCheck,
) -> Result<Option<EditBatch>, EditRefusal> {
    if world.is_outside_world(point) {
        return Err(EditRefusal::OutsideWorld { point });
    }
    let Some((a, b)) = repo
        .polyline(edge.polyline_id)
        .and_then(|p| p.edge_endpoints(edge.index))
    else {
        return Ok(None);
    };

    let new_vertex = Vertex::new(repo.next_vertex_id(), point);
    let new_id = new_vertex.id;
    let referrers_b = repo.referrers(b);

    let mut inserts = Vec::new();
    let mut polyline_count = 0;
    for polyline_id in repo.referrers(a) {
        if !referrers_b.contains(&polyline_id) {
            continue;
        }
        let Some(polyline) = repo.polyline(polyline_id) else {
            continue;
        };
        let mut indices = polyline.edge_indices(a, b);
        if indices.is_empty() {
            continue;
        }
        indices.sort_unstable_by(|x, y| y.cmp(x));
        polyline_count += 1;
        inserts.extend(indices.into_iter().map(|index| EditOperation::InsertVertex {
            edge: EdgeRef::new(polyline_id, index),
            vertex_id: new_id,
        }));
    }

    if inserts.is_empty() {
        return Ok(None);
    }

    let label = if polyline_count == 1 {
        LABEL_ADD_NODE.to_string()
    } else {
        format!("Add a new node to {} ways", polyline_count)
    };
    let mut operations = Vec::with_capacity(inserts.len() + 1);
    operations.push(EditOperation::AddVertex { vertex: new_vertex });
    operations.extend(inserts);
    Ok(Some(EditBatch::new(label, polyline_count, operations)))
}

/// Löscht einen Vertex bzw. löst ihn nur aus dem Ziel-Weg.
///
/// Wird der Vertex mehrfach referenziert, wird nur die Folge des Ziel-Wegs
/// ersetzt. Sonst wird er gelöscht, sofern er keine Tags trägt.
pub fn plan_delete(
    target_polyline_id: u64,
    vertex_id: u64,
    repo: &dyn WayRepository,
) -> Result<Option<EditBatch>, EditRefusal> {
    let Some(polyline) = repo.polyline(target_polyline_id) else {
        return Ok(None);
    };
    let Some(vertex) = repo.vertex(vertex_id) else {
        return Ok(None);
    };
    if !polyline.contains(vertex_id) {
        return Ok(None);
    }

    let remaining = polyline.spliced_without(vertex_id);
    let collapses = remaining.len() < 2;

    if repo.reference_count(vertex_id) != 1 {
        let op = if collapses {
            EditOperation::DeletePolyline {
                polyline_id: target_polyline_id,
            }
        } else {
            EditOperation::ReplacePolylineVertices {
                polyline_id: target_polyline_id,
                vertex_ids: remaining,
            }
        };
        return Ok(Some(EditBatch::new(LABEL_DETACH_NODE, 1, vec![op])));
    }

    if vertex.is_tagged() {
        return Err(EditRefusal::TaggedVertex { vertex_id });
    }

    let first = if collapses {
        EditOperation::DeletePolyline {
            polyline_id: target_polyline_id,
        }
    } else {
        EditOperation::RemoveVertexFromPolyline {
            polyline_id: target_polyline_id,
            vertex_id,
        }
    };
    Ok(Some(EditBatch::new(
        LABEL_DELETE_NODE,
        1,
        vec![first, EditOperation::DeleteVertex { vertex_id }],
    )))
}

/// Verschiebt einen Vertex auf den Zielpunkt (auch bei Delta 0).
pub fn plan_move(
    vertex_id: u64,
    point: DVec2,
    repo: &dyn WayRepository,
    world: &dyn WorldCheck,
) -> Result<Option<EditBatch>, EditRefusal> {
    if world.is_outside_world(point) {
        return Err(EditRefusal::OutsideWorld { point });
    }
    let Some(vertex) = repo.vertex(vertex_id) else {
        return Ok(None);
    };
    let delta = point - vertex.position;
    Ok(Some(EditBatch::new(
        LABEL_MOVE_NODE,
        1,
        vec![EditOperation::MoveVertex { vertex_id, delta }],
    )))
}
