use affect_atlas::entry::Entry;
use affect_atlas::interaction::Outcome;
use affect_atlas::render::{DrawCommand, Scene, SceneInput, Theme, build_scene, with_alpha};
use affect_atlas::util::short_date;
use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Stroke, Ui, vec2};

use super::ViewModel;

/// Canvas-space device pixels to egui points.
struct PixelMapping {
    origin: Pos2,
    pixels_per_point: f32,
}

impl PixelMapping {
    fn to_px(&self, point: Pos2) -> Pos2 {
        ((point - self.origin) * self.pixels_per_point).to_pos2()
    }

    fn to_points(&self, pixel: Pos2) -> Pos2 {
        self.origin + pixel.to_vec2() / self.pixels_per_point
    }

    fn len_to_points(&self, pixels: f32) -> f32 {
        pixels / self.pixels_per_point
    }
}

impl ViewModel {
    pub(super) fn draw_canvas(&mut self, ui: &mut Ui, now: f64) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let pixels_per_point = ui.ctx().pixels_per_point();
        let mapping = PixelMapping {
            origin: rect.min,
            pixels_per_point,
        };
        let canvas_size = rect.size() * pixels_per_point;

        if self.viewport.ensure_centered(canvas_size) {
            self.frame.request();
        }
        self.controller.set_pixels_per_point(pixels_per_point);

        self.handle_pointer(ui, rect, &mapping, now);
        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            let pointer = ui.input(|input| input.pointer.hover_pos());
            if scroll.abs() > f32::EPSILON
                && let Some(pointer) = pointer
            {
                let outcome = self.controller.wheel(
                    now,
                    mapping.to_px(pointer),
                    -scroll,
                    &mut self.viewport,
                );
                self.absorb(outcome);
            }
        }

        self.advance_layout(now);

        let scene = build_scene(&SceneInput {
            entries: &self.active,
            engine: &self.engine,
            viewport: &self.viewport,
            canvas_size,
            pixels_per_point,
            theme: self.theme,
            selected: self.selected.as_ref(),
            hovered: self.controller.hovered(),
        });
        let painter = ui.painter_at(rect);
        paint_scene(&painter, &mapping, &scene);

        if self.controller.hovered().is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        } else if self.controller.is_dragging() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grabbing);
        }

        if let Some(entry) = self
            .controller
            .hovered()
            .and_then(|id| self.active.iter().find(|entry| &entry.id == id))
            && let Some(pointer) = ui.input(|input| input.pointer.hover_pos())
        {
            paint_tooltip(&painter, rect, pointer, entry, self.theme);
        }

        if self.active.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No entries match. Write something on the left to begin.",
                FontId::proportional(14.0),
                self.theme.foreground(),
            );
        }
    }

    fn handle_pointer(&mut self, ui: &Ui, rect: Rect, mapping: &PixelMapping, now: f64) {
        let events = ui.input(|input| input.events.clone());
        for event in events {
            let outcome = match event {
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed: true,
                    ..
                } if rect.contains(pos) => {
                    self.controller.pointer_down(mapping.to_px(pos), &self.viewport)
                }
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed: false,
                    ..
                } => self.controller.pointer_up(
                    now,
                    mapping.to_px(pos),
                    &self.viewport,
                    &self.engine,
                    &self.active,
                ),
                egui::Event::PointerMoved(pos) => {
                    if rect.contains(pos) || self.controller.is_pressed() {
                        self.controller.pointer_move(
                            now,
                            mapping.to_px(pos),
                            &mut self.viewport,
                            &self.engine,
                            &self.active,
                        )
                    } else {
                        self.controller.pointer_cancel()
                    }
                }
                egui::Event::PointerGone => self.controller.pointer_cancel(),
                _ => Outcome::default(),
            };
            self.absorb(outcome);
        }
    }

    fn absorb(&mut self, outcome: Outcome) {
        if let Some(selection) = outcome.selection {
            self.set_selected(selection);
        }
        if outcome.redraw {
            self.frame.request();
        }
    }

    fn advance_layout(&mut self, now: f64) {
        let previous = self.last_tick.replace(now);
        if !self.controller.should_relax(now) {
            return;
        }

        self.engine.set_view_scale(self.viewport.scale());
        let dt = previous.map_or(1.0 / 60.0, |previous| (now - previous) as f32);
        self.engine.tick(dt);
        if !self.engine.is_settled() {
            self.frame.request();
        }
    }
}

fn paint_scene(painter: &Painter, mapping: &PixelMapping, scene: &Scene) {
    for command in &scene.commands {
        match command {
            DrawCommand::Background { color, vignette } => {
                let rect = painter.clip_rect();
                painter.rect_filled(rect, 0.0, *color);
                painter.circle_filled(rect.center(), rect.size().max_elem() * 0.45, *vignette);
            }
            DrawCommand::Axis { from, to, color } => {
                painter.line_segment(
                    [mapping.to_points(*from), mapping.to_points(*to)],
                    Stroke::new(1.0, *color),
                );
            }
            DrawCommand::Glow {
                center,
                radius,
                color,
            } => {
                painter.circle_filled(
                    mapping.to_points(*center),
                    mapping.len_to_points(*radius),
                    *color,
                );
            }
            DrawCommand::Dot {
                center,
                radius,
                color,
                ..
            } => {
                painter.circle_filled(
                    mapping.to_points(*center),
                    mapping.len_to_points(*radius),
                    *color,
                );
            }
            DrawCommand::Ring {
                center,
                radius,
                width,
                color,
            } => {
                painter.circle_stroke(
                    mapping.to_points(*center),
                    mapping.len_to_points(*radius),
                    Stroke::new(mapping.len_to_points(*width), *color),
                );
            }
            DrawCommand::Pill {
                center,
                label,
                font_px,
                color,
                fill,
            } => {
                let font = FontId::proportional(mapping.len_to_points(*font_px).max(8.0));
                let galley = painter.layout_no_wrap((*label).to_owned(), font, *color);
                let center = mapping.to_points(*center);
                let padding = vec2(10.0, 5.0);
                let pill = Rect::from_center_size(center, galley.size() + padding * 2.0);
                if *fill != Color32::TRANSPARENT {
                    painter.rect_filled(pill, pill.height() * 0.5, *fill);
                    painter.circle_filled(pill.left_center() + vec2(6.0, 0.0), 2.5, *color);
                }
                painter.galley(pill.min + padding, galley, *color);
            }
        }
    }
}

fn paint_tooltip(painter: &Painter, canvas: Rect, pointer: Pos2, entry: &Entry, theme: Theme) {
    let emotion = entry
        .emotion()
        .map_or("Unclassified", |emotion| emotion.label());
    let text = format!("{}\n{}  ·  {}", entry.title, emotion, short_date(&entry.created_at));
    let galley = painter.layout(
        text,
        FontId::proportional(12.5),
        theme.foreground(),
        260.0,
    );

    let padding = vec2(8.0, 6.0);
    let mut origin = pointer + vec2(14.0, 14.0);
    let size = galley.size() + padding * 2.0;
    if origin.x + size.x > canvas.right() {
        origin.x = pointer.x - size.x - 14.0;
    }
    if origin.y + size.y > canvas.bottom() {
        origin.y = pointer.y - size.y - 14.0;
    }

    let frame = Rect::from_min_size(origin, size);
    painter.rect_filled(frame, 6.0, with_alpha(theme.background(), 0.92));
    painter.galley(frame.min + padding, galley, theme.foreground());
}
