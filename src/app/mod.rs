//! Application-Layer: Kandidaten, Zustandsmaschine, Planer, Hilfen und Controller.

pub mod candidate;
pub mod controller;
pub mod diagnostics;
pub mod events;
pub mod helpers;
pub mod mode;
pub mod planner;

pub use candidate::{Candidate, CandidateTracker, InteractionSnapshot, Modifiers};
pub use controller::{HostContext, ImproveWayController};
pub use diagnostics::{HelperOverlay, PreviewSubstitution, WayDiagnostics};
pub use events::{ImproveIntent, IntentOutcome};
pub use helpers::{HelperFlags, HelperToggle};
pub use mode::ImproveState;
pub use planner::{plan_commit, EditRefusal, PlannedAction};
