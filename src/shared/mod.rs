//! Geteilte Typen für layer-übergreifende Verträge.
//!
//! Enthält die Konfiguration, die zwischen `app` und dem Render-Kollaborator
//! geteilt wird.

pub mod options;

pub use options::{HelperStyle, ImproveWayOptions};
