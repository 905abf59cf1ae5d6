//! Zentrale Konfiguration für den Improve-Way-Modus.
//!
//! `ImproveWayOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

// ── Kandidaten-Suche ────────────────────────────────────────────────

/// Pick-Radius für Vertex-Kandidaten in Screen-Pixeln.
pub const NODE_PICK_RADIUS_PX: f64 = 10.0;
/// Pick-Radius für Kanten-Kandidaten in Screen-Pixeln.
pub const SEGMENT_PICK_RADIUS_PX: f64 = 15.0;
/// Pick-Radius für die Auswahl des Ziel-Wegs im Selecting-Zustand.
pub const WAY_PICK_RADIUS_PX: f64 = 10.0;

// ── Helfer ──────────────────────────────────────────────────────────

/// Dauer (ms), ab der ein Tastendruck als langer Druck gilt.
pub const LONG_KEYPRESS_TIME_MS: u64 = 250;
/// Radius der Abbiegewinkel-Bögen in Pixeln.
pub const ARC_RADIUS_PX: f64 = 200.0;
/// Halbe Länge der Mittelsenkrechten in Pixeln.
pub const PERPENDICULAR_LENGTH_PX: f64 = 100.0;
/// Abstand der Winkel-Beschriftung vom Vertex in Pixeln.
pub const TURN_TEXT_DISTANCE_PX: f64 = 15.0;
/// Abstand der Längen-Beschriftung von der Kante in Pixeln.
pub const DISTANCE_TEXT_DISTANCE_PX: f64 = 15.0;
/// Durchmesser des Gleichwinkel-Kreises in Pixeln.
pub const EQUAL_ANGLE_CIRCLE_RADIUS_PX: f64 = 15.0;

/// Geometrie-Parameter der Helfer-Darstellung.
///
/// Wird an den Render-Kollaborator durchgereicht; der Geometrie-Kern selbst
/// liest nur die Beschriftungsabstände für die Diagnose-Ausgabe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HelperStyle {
    /// Radius der Winkelbögen
    pub arc_radius_px: f64,
    /// Halbe Länge der Mittelsenkrechten
    pub perpendicular_length_px: f64,
    /// Abstand der Winkel-Beschriftung
    pub turn_text_distance_px: f64,
    /// Abstand der Längen-Beschriftung
    pub distance_text_distance_px: f64,
    /// Durchmesser des Gleichwinkel-Kreises
    pub equal_angle_circle_radius_px: f64,
}

impl Default for HelperStyle {
    fn default() -> Self {
        Self {
            arc_radius_px: ARC_RADIUS_PX,
            perpendicular_length_px: PERPENDICULAR_LENGTH_PX,
            turn_text_distance_px: TURN_TEXT_DISTANCE_PX,
            distance_text_distance_px: DISTANCE_TEXT_DISTANCE_PX,
            equal_angle_circle_radius_px: EQUAL_ANGLE_CIRCLE_RADIUS_PX,
        }
    }
}

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Optionen des Improve-Way-Modus.
/// Wird als `improve_way.toml` gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImproveWayOptions {
    /// Pick-Radius für Vertex-Kandidaten in Screen-Pixeln
    pub node_pick_radius_px: f64,
    /// Pick-Radius für Kanten-Kandidaten in Screen-Pixeln
    pub segment_pick_radius_px: f64,
    /// Pick-Radius für die Weg-Auswahl im Selecting-Zustand
    #[serde(default = "default_way_pick_radius_px")]
    pub way_pick_radius_px: f64,
    /// Schwelle für langen Tastendruck (ms)
    pub long_keypress_time_ms: u64,
    /// Helfer nur im Experten-Modus verfügbar
    #[serde(default)]
    pub expert_mode: bool,
    /// Darstellungs-Parameter der Helfer
    #[serde(default)]
    pub helper_style: HelperStyle,
}

impl Default for ImproveWayOptions {
    fn default() -> Self {
        Self {
            node_pick_radius_px: NODE_PICK_RADIUS_PX,
            segment_pick_radius_px: SEGMENT_PICK_RADIUS_PX,
            way_pick_radius_px: WAY_PICK_RADIUS_PX,
            long_keypress_time_ms: LONG_KEYPRESS_TIME_MS,
            expert_mode: false,
            helper_style: HelperStyle::default(),
        }
    }
}

/// Serde-Default für `way_pick_radius_px` (Abwärtskompatibilität bestehender TOML-Dateien).
fn default_way_pick_radius_px() -> f64 {
    WAY_PICK_RADIUS_PX
}

impl ImproveWayOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Dauer eines langen Tastendrucks
    pub fn long_keypress_time(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.long_keypress_time_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_round_trip_through_toml_file() {
        let dir = tempfile::tempdir().expect("Temp-Verzeichnis");
        let path = dir.path().join("improve_way.toml");

        let mut options = ImproveWayOptions::default();
        options.node_pick_radius_px = 7.5;
        options.expert_mode = true;
        options.helper_style.arc_radius_px = 120.0;
        options.save_to_file(&path).expect("Speichern erfolgreich");

        let loaded = ImproveWayOptions::load_from_file(&path);
        assert_eq!(loaded, options);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("Temp-Verzeichnis");
        let loaded = ImproveWayOptions::load_from_file(&dir.path().join("fehlt.toml"));
        assert_eq!(loaded, ImproveWayOptions::default());
    }

    #[test]
    fn older_files_without_new_fields_still_load() {
        let content = "node_pick_radius_px = 4.0\nsegment_pick_radius_px = 6.0\nlong_keypress_time_ms = 300\n";
        let loaded: ImproveWayOptions = toml::from_str(content).expect("TOML gültig");
        assert_eq!(loaded.way_pick_radius_px, WAY_PICK_RADIUS_PX);
        assert_eq!(loaded.helper_style, HelperStyle::default());
        assert!(!loaded.expert_mode);
    }
}
