//! Zustandsmaschine des Improve-Way-Modus.

use crate::core::WayRepository;

/// Zustand des Modus: Ziel-Weg wählen oder Ziel-Weg bearbeiten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImproveState {
    /// Kein Ziel-Weg gewählt
    #[default]
    Selecting,
    /// Genau ein Ziel-Weg wird bearbeitet
    Improving {
        /// ID der Ziel-Polylinie
        target_polyline_id: u64,
    },
}

impl ImproveState {
    /// Ziel-Polylinie, falls im Zustand `Improving`
    pub fn target(&self) -> Option<u64> {
        match self {
            ImproveState::Selecting => None,
            ImproveState::Improving { target_polyline_id } => Some(*target_polyline_id),
        }
    }

    /// Ob gerade bearbeitet wird
    pub fn is_improving(&self) -> bool {
        matches!(self, ImproveState::Improving { .. })
    }

    /// Übergang nach einer Selektionsänderung.
    ///
    /// Genau eine vorhandene Polylinie → `Improving`, alles andere → `Selecting`.
    pub fn on_selection_changed(self, polyline_ids: &[u64], repo: &dyn WayRepository) -> Self {
        let next = match polyline_ids {
            [id] if repo.polyline(*id).is_some() => ImproveState::Improving {
                target_polyline_id: *id,
            },
            _ => ImproveState::Selecting,
        };
        if next != self {
            log::info!("Improve-Way-Zustand: {:?} → {:?}", self, next);
        }
        next
    }

    /// Prüft, ob das Ziel noch existiert; sonst zurück zu `Selecting`.
    pub fn revalidate(self, repo: &dyn WayRepository) -> Self {
        match self.target() {
            Some(id) if repo.polyline(id).is_none() => {
                log::info!("Ziel-Weg {} existiert nicht mehr, zurück zur Auswahl", id);
                ImproveState::Selecting
            }
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Polyline, Vertex, WayMap};
    use glam::DVec2;

    fn map_with_two_ways() -> WayMap {
        let mut map = WayMap::new();
        map.add_vertex(Vertex::new(1, DVec2::ZERO));
        map.add_vertex(Vertex::new(2, DVec2::X));
        map.add_vertex(Vertex::new(3, DVec2::Y));
        map.add_polyline(Polyline::new(10, vec![1, 2])).expect("gültig");
        map.add_polyline(Polyline::new(11, vec![1, 3])).expect("gültig");
        map
    }

    #[test]
    fn initial_state_is_selecting() {
        assert_eq!(ImproveState::default(), ImproveState::Selecting);
        assert_eq!(ImproveState::default().target(), None);
    }

    #[test]
    fn single_selection_starts_improving() {
        let map = map_with_two_ways();
        let state = ImproveState::Selecting.on_selection_changed(&[10], &map);
        assert_eq!(state.target(), Some(10));
    }

    #[test]
    fn empty_multi_or_unknown_selection_returns_to_selecting() {
        let map = map_with_two_ways();
        let improving = ImproveState::Improving {
            target_polyline_id: 10,
        };
        assert_eq!(improving.on_selection_changed(&[], &map), ImproveState::Selecting);
        assert_eq!(
            improving.on_selection_changed(&[10, 11], &map),
            ImproveState::Selecting
        );
        assert_eq!(improving.on_selection_changed(&[99], &map), ImproveState::Selecting);
    }

    #[test]
    fn revalidate_drops_deleted_target() {
        let map = map_with_two_ways();
        let gone = ImproveState::Improving {
            target_polyline_id: 42,
        };
        assert_eq!(gone.revalidate(&map), ImproveState::Selecting);
        let alive = ImproveState::Improving {
            target_polyline_id: 11,
        };
        assert_eq!(alive.revalidate(&map), alive);
    }
}
