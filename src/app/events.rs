//! Intents des Improve-Way-Modus und das Ergebnis ihrer Verarbeitung.

use std::time::Instant;

use glam::DVec2;

use super::candidate::Modifiers;
use super::planner::EditRefusal;
use crate::core::EditBatch;

/// Eingaben aus Host/UI ohne eigene Mutationslogik.
#[derive(Debug, Clone, PartialEq)]
pub enum ImproveIntent {
    /// Modus aktiviert
    EnterMode,
    /// Modus verlassen
    ExitMode,
    /// Selektion im Host geändert (IDs der selektierten Polylinien)
    SelectionChanged { polyline_ids: Vec<u64> },
    /// Maus bewegt (Screen-Pixel)
    PointerMoved { screen_pos: DVec2 },
    /// Maus hat die Kartenansicht verlassen
    PointerLeft,
    /// Modifikatoren geändert
    ModifiersChanged { modifiers: Modifiers },
    /// Linke Maustaste losgelassen (Screen-Pixel)
    PointerReleased { screen_pos: DVec2 },
    /// Hilfen-Taste gedrückt
    HelperKeyPressed { at: Instant },
    /// Hilfen-Taste losgelassen
    HelperKeyReleased { at: Instant },
    /// Experten-Modus umgeschaltet
    ExpertModeChanged { enabled: bool },
}

/// Was ein Intent bewirkt hat.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    /// Nur transienter Zustand geändert
    Idle,
    /// Ziel-Weg gewählt (Übergang nach `Improving`)
    TargetSelected(u64),
    /// Batch geplant, der Host soll ihn anwenden
    Planned(EditBatch),
    /// Aktion verweigert, nichts geändert
    Refused(EditRefusal),
}
