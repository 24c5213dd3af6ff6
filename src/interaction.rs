//! Pointer and wheel handling for the atlas canvas.
//!
//! All positions are device pixels relative to the canvas origin, the same space the
//! [`Viewport`] maps into. Times are seconds on the caller's clock.

use eframe::egui::{Pos2, Vec2};
use tracing::debug;

use crate::entry::{Entry, EntryId};
use crate::hit_test::{hit_radius_px, pick};
use crate::layout::LayoutEngine;
use crate::schedule::{Debounce, Relaxation};
use crate::viewport::{Viewport, wheel_zoom_factor};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionConfig {
    /// Pointer travel, in logical pixels, that turns a press into a drag.
    pub drag_threshold: f32,
    /// Hover is suppressed for this long after a drag ends.
    pub hover_cooldown: f64,
    /// Quiet period after the last wheel event before the layout relaxes.
    pub wheel_settle_delay: f64,
    pub relaxation_burst: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 6.0,
            hover_cooldown: 0.14,
            wheel_settle_delay: 0.18,
            relaxation_burst: 1.2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum PointerState {
    Idle,
    Pressed { start: Pos2, start_translation: Vec2 },
    Dragging { start: Pos2, start_translation: Vec2 },
}

/// What a single event changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outcome {
    /// `Some(None)` clears the selection.
    pub selection: Option<Option<EntryId>>,
    pub redraw: bool,
}

impl Outcome {
    fn redraw() -> Self {
        Self {
            selection: None,
            redraw: true,
        }
    }
}

pub struct InteractionController {
    config: InteractionConfig,
    state: PointerState,
    pixels_per_point: f32,
    hovered: Option<EntryId>,
    hover_blocked_until: f64,
    wheel_settle: Debounce,
    relaxation: Relaxation,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            state: PointerState::Idle,
            pixels_per_point: 1.0,
            hovered: None,
            hover_blocked_until: f64::NEG_INFINITY,
            wheel_settle: Debounce::new(config.wheel_settle_delay),
            relaxation: Relaxation::default(),
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn set_pixels_per_point(&mut self, pixels_per_point: f32) {
        if pixels_per_point.is_finite() && pixels_per_point > 0.0 {
            self.pixels_per_point = pixels_per_point;
        }
    }

    pub fn hovered(&self) -> Option<&EntryId> {
        self.hovered.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, PointerState::Dragging { .. })
    }

    pub fn is_pressed(&self) -> bool {
        !matches!(self.state, PointerState::Idle)
    }

    fn drag_threshold_px(&self) -> f32 {
        self.config.drag_threshold * self.pixels_per_point
    }

    /// Starts a press and drops any hover highlight.
    pub fn pointer_down(&mut self, point: Pos2, viewport: &Viewport) -> Outcome {
        self.state = PointerState::Pressed {
            start: point,
            start_translation: viewport.translation(),
        };
        if self.hovered.take().is_some() {
            Outcome::redraw()
        } else {
            Outcome::default()
        }
    }

    pub fn pointer_move<'a>(
        &mut self,
        now: f64,
        point: Pos2,
        viewport: &mut Viewport,
        engine: &LayoutEngine,
        entries: impl IntoIterator<Item = &'a Entry>,
    ) -> Outcome {
        match self.state {
            PointerState::Pressed {
                start,
                start_translation,
            } => {
                if (point - start).length() <= self.drag_threshold_px() {
                    return Outcome::default();
                }
                debug!("canvas drag started");
                self.state = PointerState::Dragging {
                    start,
                    start_translation,
                };
                self.hovered = None;
                viewport.set_translation(start_translation + (point - start));
                Outcome::redraw()
            }
            PointerState::Dragging {
                start,
                start_translation,
            } => {
                viewport.set_translation(start_translation + (point - start));
                Outcome::redraw()
            }
            PointerState::Idle => {
                let next = if now < self.hover_blocked_until {
                    None
                } else {
                    let radius = hit_radius_px(viewport.scale());
                    pick(viewport, engine, entries, point, radius).cloned()
                };
                if next == self.hovered {
                    Outcome::default()
                } else {
                    self.hovered = next;
                    Outcome::redraw()
                }
            }
        }
    }

    /// Ends a press. A drag suppresses hover briefly; a click hit-tests and emits a selection.
    pub fn pointer_up<'a>(
        &mut self,
        now: f64,
        point: Pos2,
        viewport: &Viewport,
        engine: &LayoutEngine,
        entries: impl IntoIterator<Item = &'a Entry>,
    ) -> Outcome {
        match std::mem::replace(&mut self.state, PointerState::Idle) {
            PointerState::Idle => Outcome::default(),
            PointerState::Dragging { .. } => {
                self.hover_blocked_until = now + self.config.hover_cooldown;
                self.hovered = None;
                Outcome::redraw()
            }
            PointerState::Pressed { .. } => {
                let radius = hit_radius_px(viewport.scale());
                let hit = pick(viewport, engine, entries, point, radius).cloned();
                self.relaxation.start(now, self.config.relaxation_burst);
                Outcome {
                    selection: Some(hit),
                    redraw: true,
                }
            }
        }
    }

    /// Pointer left the canvas or the press was interrupted.
    pub fn pointer_cancel(&mut self) -> Outcome {
        let had_hover = self.hovered.take().is_some();
        let was_pressed = self.is_pressed();
        self.state = PointerState::Idle;
        Outcome {
            selection: None,
            redraw: had_hover || was_pressed,
        }
    }

    /// Zooms about `point` and restarts the settle timer.
    pub fn wheel(
        &mut self,
        now: f64,
        point: Pos2,
        delta_y: f32,
        viewport: &mut Viewport,
    ) -> Outcome {
        if !viewport.zoom_at(point, wheel_zoom_factor(delta_y)) {
            return Outcome::default();
        }
        self.wheel_settle.schedule(now);
        Outcome::redraw()
    }

    /// Whether the layout should advance this frame. Fires the wheel settle timer into a
    /// relaxation burst when it expires.
    pub fn should_relax(&mut self, now: f64) -> bool {
        if self.wheel_settle.poll(now) {
            debug!("wheel settled, relaxing layout");
            self.relaxation.start(now, self.config.relaxation_burst);
        }
        self.relaxation.is_active(now)
    }

    /// Starts a relaxation burst from outside the pointer flow (new data, search changes).
    pub fn disturb(&mut self, now: f64) {
        self.relaxation.start(now, self.config.relaxation_burst);
    }

    /// Seconds until the controller next needs a frame, if it is waiting on a timer.
    pub fn next_wake(&self, now: f64) -> Option<f64> {
        self.wheel_settle.remaining(now)
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::entry::Classification;
    use crate::taxonomy::Secondary;

    fn setup() -> (Vec<Entry>, LayoutEngine, Viewport) {
        let entries = vec![
            Entry::new(EntryId::new("a"), "a", "2024-01-01")
                .with_classification(Classification::new(Secondary::Gratitude, 0.5, 0.5, 0.9)),
        ];
        let mut engine = LayoutEngine::default();
        engine.sync(&entries);
        let mut viewport = Viewport::new(100.0);
        viewport.ensure_centered(vec2(800.0, 600.0));
        (entries, engine, viewport)
    }

    fn screen_of(entries: &[Entry], engine: &LayoutEngine, viewport: &Viewport) -> Pos2 {
        let position = engine.position(&entries[0].id).expect("state");
        viewport.world_to_screen(position)
    }

    #[test]
    fn click_selects_entry_under_pointer() {
        let (entries, engine, mut viewport) = setup();
        let mut controller = InteractionController::default();
        let point = screen_of(&entries, &engine, &viewport);

        controller.pointer_down(point, &viewport);
        controller.pointer_move(0.0, point + vec2(2.0, 1.0), &mut viewport, &engine, &entries);
        let outcome = controller.pointer_up(0.1, point, &viewport, &engine, &entries);
        assert_eq!(outcome.selection, Some(Some(entries[0].id.clone())));
        assert!(controller.should_relax(0.2));
    }

    #[test]
    fn press_clears_hover() {
        let (entries, engine, mut viewport) = setup();
        let mut controller = InteractionController::default();
        let point = screen_of(&entries, &engine, &viewport);

        controller.pointer_move(0.0, point, &mut viewport, &engine, &entries);
        assert_eq!(controller.hovered(), Some(&entries[0].id));

        assert!(controller.pointer_down(point, &viewport).redraw);
        assert_eq!(controller.hovered(), None);
        assert!(!controller.pointer_down(point, &viewport).redraw);
    }

    #[test]
    fn click_on_empty_space_deselects() {
        let (entries, engine, viewport) = setup();
        let mut controller = InteractionController::default();
        controller.pointer_down(pos2(5.0, 5.0), &viewport);
        let outcome = controller.pointer_up(0.0, pos2(5.0, 5.0), &viewport, &engine, &entries);
        assert_eq!(outcome.selection, Some(None));
    }

    #[test]
    fn drag_pans_from_press_translation_and_never_selects() {
        let (entries, engine, mut viewport) = setup();
        let mut controller = InteractionController::default();
        let start = pos2(200.0, 200.0);
        let before = viewport.translation();

        controller.pointer_down(start, &viewport);
        controller.pointer_move(0.0, start + vec2(30.0, 0.0), &mut viewport, &engine, &entries);
        assert!(controller.is_dragging());
        controller.pointer_move(0.1, start + vec2(50.0, -10.0), &mut viewport, &engine, &entries);
        assert_eq!(viewport.translation(), before + vec2(50.0, -10.0));

        let outcome = controller.pointer_up(0.2, start, &viewport, &engine, &entries);
        assert_eq!(outcome.selection, None);
        assert!(!controller.is_pressed());
    }

    #[test]
    fn drag_threshold_scales_with_pixel_ratio() {
        let (entries, engine, mut viewport) = setup();
        let mut controller = InteractionController::default();
        controller.set_pixels_per_point(2.0);
        controller.pointer_down(pos2(10.0, 10.0), &viewport);
        controller.pointer_move(0.0, pos2(20.0, 10.0), &mut viewport, &engine, &entries);
        assert!(!controller.is_dragging());
        controller.pointer_move(0.0, pos2(23.0, 10.0), &mut viewport, &engine, &entries);
        assert!(controller.is_dragging());
    }

    #[test]
    fn hover_is_suppressed_during_cooldown() {
        let (entries, engine, mut viewport) = setup();
        let mut controller = InteractionController::default();
        controller.pointer_down(pos2(10.0, 10.0), &viewport);
        controller.pointer_move(0.0, pos2(60.0, 10.0), &mut viewport, &engine, &entries);
        controller.pointer_up(1.0, pos2(60.0, 10.0), &viewport, &engine, &entries);

        let point = screen_of(&entries, &engine, &viewport);
        controller.pointer_move(1.05, point, &mut viewport, &engine, &entries);
        assert_eq!(controller.hovered(), None);
        let outcome = controller.pointer_move(1.2, point, &mut viewport, &engine, &entries);
        assert!(outcome.redraw);
        assert_eq!(controller.hovered(), Some(&entries[0].id));

        assert!(controller.pointer_cancel().redraw);
        assert_eq!(controller.hovered(), None);
    }

    #[test]
    fn wheel_zooms_and_relaxes_after_settling() {
        let (_, _, mut viewport) = setup();
        let mut controller = InteractionController::default();
        let scale = viewport.scale();

        assert!(controller.wheel(0.0, pos2(100.0, 100.0), -120.0, &mut viewport).redraw);
        assert!(viewport.scale() > scale);
        assert!(controller.wheel(0.1, pos2(100.0, 100.0), -120.0, &mut viewport).redraw);
        assert!(!controller.should_relax(0.2));
        assert!(controller.should_relax(0.3));
        assert!(controller.should_relax(1.0));
        assert!(!controller.should_relax(2.0));
    }
}
