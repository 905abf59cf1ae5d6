//! Improve-Way Editor Library.
//!
//! Geometrie- und Topologie-Kern für die interaktive Korrektur von Wegen:
//! Abbiegewinkel, Gleichwinkel-Punkt und Edit-Batches, die geteilte Kanten
//! in allen beteiligten Wegen gleich behandeln.

pub mod app;
pub mod core;
pub mod shared;

pub use app::{
    plan_commit, Candidate, CandidateTracker, EditRefusal, HostContext, ImproveIntent,
    ImproveState, ImproveWayController, IntentOutcome, InteractionSnapshot, Modifiers,
};
pub use core::{
    CommandSink, EdgeRef, EditBatch, EditOperation, MapView, Polyline, Projection, Vertex,
    WayMap, WayRepository, WorldBounds, WorldCheck,
};
pub use shared::{HelperStyle, ImproveWayOptions};
