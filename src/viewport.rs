use eframe::egui::{Pos2, Vec2};

pub const MIN_SCALE: f32 = 22.0;
pub const MAX_SCALE: f32 = 1400.0;
pub const DEFAULT_SCALE: f32 = 92.0;

/// Axis guides are hidden at or below this scale.
pub const AXIS_MIN_SCALE: f32 = 34.0;
/// Lower bound of the [`ZoomBand::Family`] band.
pub const FAMILY_MIN_SCALE: f32 = 60.0;
/// Lower bound of the [`ZoomBand::Detail`] band.
pub const DETAIL_MIN_SCALE: f32 = 120.0;

/// Contiguous zoom bands keyed purely off the viewport scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ZoomBand {
    Overview,
    Family,
    Detail,
}

impl ZoomBand {
    pub fn for_scale(scale: f32) -> Self {
        if scale >= DETAIL_MIN_SCALE {
            Self::Detail
        } else if scale >= FAMILY_MIN_SCALE {
            Self::Family
        } else {
            Self::Overview
        }
    }
}

/// World-to-device-pixel transform: `screen = world * scale + translation`.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    scale: f32,
    translation: Vec2,
    centered_for: Option<Vec2>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE)
    }
}

impl Viewport {
    pub fn new(scale: f32) -> Self {
        Self {
            scale: clamp_scale(scale),
            translation: Vec2::ZERO,
            centered_for: None,
        }
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.centered_for.is_some()
    }

    pub fn zoom_band(&self) -> ZoomBand {
        ZoomBand::for_scale(self.scale)
    }

    pub fn world_to_screen(&self, world: Vec2) -> Pos2 {
        (world * self.scale + self.translation).to_pos2()
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Vec2 {
        (screen.to_vec2() - self.translation) / self.scale
    }

    /// Multiplies the scale by `factor` while keeping the world point under `pivot` fixed.
    ///
    /// Returns `false` when the factor is unusable or the clamped scale did not change.
    pub fn zoom_at(&mut self, pivot: Pos2, factor: f32) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }

        let world_before = self.screen_to_world(pivot);
        let next_scale = clamp_scale(self.scale * factor);
        if next_scale == self.scale {
            return false;
        }

        self.scale = next_scale;
        self.translation = pivot.to_vec2() - world_before * self.scale;
        true
    }

    pub fn pan(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.translation += delta;
        }
    }

    pub fn set_translation(&mut self, translation: Vec2) {
        if translation.is_finite() {
            self.translation = translation;
        }
    }

    /// Centers the world origin on first use, then keeps the same world point at the canvas
    /// center whenever the canvas size changes. Repeated calls with one size are no-ops.
    ///
    /// Returns `true` when the translation changed.
    pub fn ensure_centered(&mut self, canvas_size: Vec2) -> bool {
        if !canvas_size.is_finite() || canvas_size.x <= 0.0 || canvas_size.y <= 0.0 {
            return false;
        }

        match self.centered_for {
            Some(previous) if previous == canvas_size => false,
            Some(previous) => {
                self.translation += (canvas_size - previous) * 0.5;
                self.centered_for = Some(canvas_size);
                true
            }
            None => {
                self.translation = canvas_size * 0.5;
                self.centered_for = Some(canvas_size);
                true
            }
        }
    }
}

fn clamp_scale(scale: f32) -> f32 {
    if scale.is_finite() {
        scale.clamp(MIN_SCALE, MAX_SCALE)
    } else {
        DEFAULT_SCALE
    }
}

/// Converts a wheel delta (positive = scroll down) into a zoom factor.
pub fn wheel_zoom_factor(delta_y: f32) -> f32 {
    (-delta_y * 0.0012).exp()
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    fn approx(a: Vec2, b: Vec2, epsilon: f32) -> bool {
        (a - b).length() <= epsilon
    }

    #[test]
    fn screen_to_world_inverts_world_to_screen() {
        let mut viewport = Viewport::new(137.0);
        viewport.ensure_centered(vec2(1600.0, 900.0));
        viewport.pan(vec2(-42.5, 13.0));
        for world in [vec2(0.0, 0.0), vec2(5.9, -3.7), vec2(-1.25, 2.5)] {
            let back = viewport.screen_to_world(viewport.world_to_screen(world));
            assert!(approx(back, world, 1e-4), "{world:?} -> {back:?}");
        }
    }

    #[test]
    fn zoom_keeps_pivot_world_point() {
        let mut viewport = Viewport::default();
        viewport.ensure_centered(vec2(1200.0, 800.0));
        let pivot = pos2(910.0, 233.0);
        let before = viewport.screen_to_world(pivot);
        assert!(viewport.zoom_at(pivot, 1.7));
        let after = viewport.screen_to_world(pivot);
        assert!(approx(before, after, 1e-4), "{before:?} vs {after:?}");
    }

    #[test]
    fn scale_is_clamped() {
        let mut viewport = Viewport::default();
        viewport.zoom_at(pos2(0.0, 0.0), 1e9);
        assert_eq!(viewport.scale(), MAX_SCALE);
        viewport.zoom_at(pos2(0.0, 0.0), 1e-9);
        assert_eq!(viewport.scale(), MIN_SCALE);
        assert!(!viewport.zoom_at(pos2(0.0, 0.0), 0.5));
    }

    #[test]
    fn degenerate_zoom_factors_are_ignored() {
        let mut viewport = Viewport::default();
        for factor in [0.0, -2.0, f32::NAN, f32::INFINITY] {
            assert!(!viewport.zoom_at(pos2(10.0, 10.0), factor));
        }
        assert_eq!(viewport.scale(), DEFAULT_SCALE);
    }

    #[test]
    fn centering_happens_once_per_size() {
        let mut viewport = Viewport::default();
        assert!(!viewport.is_initialized());
        assert!(viewport.ensure_centered(vec2(800.0, 600.0)));
        assert_eq!(viewport.translation(), vec2(400.0, 300.0));

        viewport.pan(vec2(25.0, -5.0));
        assert!(!viewport.ensure_centered(vec2(800.0, 600.0)));
        assert_eq!(viewport.translation(), vec2(425.0, 295.0));

        assert!(viewport.ensure_centered(vec2(1000.0, 600.0)));
        assert_eq!(viewport.translation(), vec2(525.0, 295.0));
        assert!(!viewport.ensure_centered(vec2(1000.0, 600.0)));
    }

    #[test]
    fn zero_sized_canvas_does_not_initialize() {
        let mut viewport = Viewport::default();
        assert!(!viewport.ensure_centered(Vec2::ZERO));
        assert!(!viewport.is_initialized());
    }

    #[test]
    fn bands_are_contiguous() {
        assert_eq!(ZoomBand::for_scale(MIN_SCALE), ZoomBand::Overview);
        assert_eq!(ZoomBand::for_scale(FAMILY_MIN_SCALE - 0.01), ZoomBand::Overview);
        assert_eq!(ZoomBand::for_scale(FAMILY_MIN_SCALE), ZoomBand::Family);
        assert_eq!(ZoomBand::for_scale(DETAIL_MIN_SCALE - 0.01), ZoomBand::Family);
        assert_eq!(ZoomBand::for_scale(DETAIL_MIN_SCALE), ZoomBand::Detail);
        assert_eq!(ZoomBand::for_scale(MAX_SCALE), ZoomBand::Detail);
    }

    #[test]
    fn wheel_up_zooms_in() {
        assert!(wheel_zoom_factor(-120.0) > 1.0);
        assert!(wheel_zoom_factor(120.0) < 1.0);
        assert_eq!(wheel_zoom_factor(0.0), 1.0);
    }
}
