//! Projektion zwischen Screen-Pixeln und projizierten Welt-Koordinaten.

use glam::DVec2;

/// Bidirektionale Umrechnung Screen ↔ Welt, vom Host geliefert.
pub trait Projection {
    /// Screen-Pixel → Welt (Ost, Nord)
    fn screen_to_world(&self, screen: DVec2) -> DVec2;
    /// Welt (Ost, Nord) → Screen-Pixel
    fn world_to_screen(&self, world: DVec2) -> DVec2;

    /// Rechnet einen Pixel-Radius an einer Screen-Position in Welteinheiten um.
    fn pixels_to_world(&self, screen: DVec2, pixels: f64) -> f64 {
        let a = self.screen_to_world(screen);
        let b = self.screen_to_world(screen + DVec2::new(pixels, 0.0));
        a.distance(b)
    }
}

/// 2D-Kartenansicht mit Pan und Zoom (Screen-Y zeigt nach unten, Nord nach oben).
#[derive(Debug, Clone)]
pub struct MapView {
    /// Weltposition in der Bildschirmmitte
    pub center: DVec2,
    /// Zoom-Level (1.0 = normal, 2.0 = doppelt so groß)
    pub zoom: f64,
    /// Viewport-Größe in Pixeln
    pub viewport_size: DVec2,
}

impl MapView {
    /// Sichtbare Welt-Halbhöhe bei Zoom 1.0.
    pub const BASE_WORLD_EXTENT: f64 = 2048.0;
    /// Minimaler Zoom-Faktor.
    pub const ZOOM_MIN: f64 = 0.01;
    /// Maximaler Zoom-Faktor.
    pub const ZOOM_MAX: f64 = 1000.0;

    /// Erstellt eine Ansicht zentriert auf den Ursprung
    pub fn new(viewport_size: DVec2) -> Self {
        Self {
            center: DVec2::ZERO,
            zoom: 1.0,
            viewport_size,
        }
    }

    /// Zentriert die Ansicht auf einen Punkt
    pub fn look_at(&mut self, target: DVec2) {
        self.center = target;
    }

    /// Verschiebt die Ansicht (Pan, Welteinheiten)
    pub fn pan(&mut self, delta: DVec2) {
        self.center += delta;
    }

    /// Ändert den Zoom-Level
    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom = (self.zoom * factor).clamp(Self::ZOOM_MIN, Self::ZOOM_MAX);
    }

    /// Welteinheiten pro Screen-Pixel
    pub fn world_per_pixel(&self) -> f64 {
        2.0 * Self::BASE_WORLD_EXTENT / (self.zoom * self.viewport_size.y.max(1.0))
    }
}

impl Projection for MapView {
    fn screen_to_world(&self, screen: DVec2) -> DVec2 {
        let offset = (screen - self.viewport_size * 0.5) * self.world_per_pixel();
        // Screen-Y nach unten, Nord nach oben
        self.center + DVec2::new(offset.x, -offset.y)
    }

    fn world_to_screen(&self, world: DVec2) -> DVec2 {
        let offset = (world - self.center) / self.world_per_pixel();
        self.viewport_size * 0.5 + DVec2::new(offset.x, -offset.y)
    }

    fn pixels_to_world(&self, _screen: DVec2, pixels: f64) -> f64 {
        pixels * self.world_per_pixel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn screen_center_maps_to_view_center() {
        let mut view = MapView::new(DVec2::new(800.0, 600.0));
        view.look_at(DVec2::new(100.0, -50.0));
        let world = view.screen_to_world(DVec2::new(400.0, 300.0));
        assert_relative_eq!(world.x, 100.0);
        assert_relative_eq!(world.y, -50.0);
    }

    #[test]
    fn screen_up_is_north() {
        let view = MapView::new(DVec2::new(800.0, 600.0));
        let world = view.screen_to_world(DVec2::new(400.0, 0.0));
        assert!(world.y > 0.0);
    }

    #[test]
    fn projection_round_trips() {
        let mut view = MapView::new(DVec2::new(1280.0, 720.0));
        view.pan(DVec2::new(12.5, 7.25));
        view.zoom_by(3.7);
        let world = DVec2::new(31.4, -27.1);
        let back = view.screen_to_world(view.world_to_screen(world));
        assert_relative_eq!(back.x, world.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, world.y, epsilon = 1e-9);
    }

    #[test]
    fn zoom_halves_world_per_pixel() {
        let mut view = MapView::new(DVec2::new(800.0, 600.0));
        let before = view.world_per_pixel();
        view.zoom_by(2.0);
        assert_relative_eq!(view.world_per_pixel(), before / 2.0);
        assert_relative_eq!(view.pixels_to_world(DVec2::ZERO, 10.0), 10.0 * before / 2.0);
    }
}
