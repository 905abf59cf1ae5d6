//! Prüfung, ob eine Koordinate innerhalb der gültigen Welt liegt.

use glam::DVec2;

/// Vom Host gelieferte Weltgrenzen-Prüfung.
pub trait WorldCheck {
    /// `true`, wenn die Koordinate außerhalb der Welt liegt
    fn is_outside_world(&self, coord: DVec2) -> bool;
}

impl<F> WorldCheck for F
where
    F: Fn(DVec2) -> bool,
{
    fn is_outside_world(&self, coord: DVec2) -> bool {
        self(coord)
    }
}

/// Achsenparalleler Weltbereich in projizierten Koordinaten
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    /// Minimale Ost-Koordinate (links)
    pub min_x: f64,
    /// Minimale Nord-Koordinate (unten)
    pub min_y: f64,
    /// Maximale Ost-Koordinate (rechts)
    pub max_x: f64,
    /// Maximale Nord-Koordinate (oben)
    pub max_y: f64,
}

impl WorldBounds {
    /// Erstellt Bounds aus expliziten Grenzen
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self {
            min_x: min.x.min(max.x),
            min_y: min.y.min(max.y),
            max_x: min.x.max(max.x),
            max_y: min.y.max(max.y),
        }
    }

    /// Erstellt Bounds aus Kantenlänge (zentriert bei 0,0)
    pub fn from_size(size: f64) -> Self {
        let half = size / 2.0;
        Self {
            min_x: -half,
            min_y: -half,
            max_x: half,
            max_y: half,
        }
    }

    /// Prüft ob die Koordinate innerhalb liegt (Ränder inklusive)
    pub fn contains(&self, coord: DVec2) -> bool {
        coord.is_finite()
            && coord.x >= self.min_x
            && coord.x <= self.max_x
            && coord.y >= self.min_y
            && coord.y <= self.max_y
    }
}

impl WorldCheck for WorldBounds {
    fn is_outside_world(&self, coord: DVec2) -> bool {
        !self.contains(coord)
    }
}
