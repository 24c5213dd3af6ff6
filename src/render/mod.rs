//! Scene construction for the atlas canvas.
//!
//! [`build_scene`] is pure: it turns entries, live layout positions and the viewport into an
//! ordered list of [`DrawCommand`]s in device pixels. The app shell paints the list with egui.

mod colors;

use eframe::egui::{Color32, Pos2, Vec2, pos2};

pub use colors::{blend_color, dim_color, with_alpha};

use crate::centroid::Centroids;
use crate::entry::{Entry, EntryId};
use crate::layout::LayoutEngine;
use crate::taxonomy::color_of;
use crate::viewport::{AXIS_MIN_SCALE, Viewport, ZoomBand};

/// Entries this far outside the canvas, in device pixels, are not drawn.
pub const CULL_MARGIN_PX: f32 = 60.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    pub fn background(self) -> Color32 {
        match self {
            Self::Dark => Color32::from_rgb(0x05, 0x06, 0x08),
            Self::Light => Color32::from_rgb(0xf3, 0xf2, 0xff),
        }
    }

    fn vignette(self) -> Color32 {
        match self {
            Self::Dark => Color32::from_rgba_unmultiplied(255, 255, 255, 13),
            Self::Light => Color32::from_rgba_unmultiplied(0, 0, 0, 10),
        }
    }

    fn axis(self) -> Color32 {
        match self {
            Self::Dark => Color32::from_rgba_unmultiplied(255, 255, 255, 26),
            Self::Light => Color32::from_rgba_unmultiplied(0, 0, 0, 31),
        }
    }

    fn pill_fill(self) -> Color32 {
        match self {
            Self::Dark => Color32::from_rgba_unmultiplied(0, 0, 0, 77),
            Self::Light => Color32::from_rgba_unmultiplied(255, 255, 255, 191),
        }
    }

    pub fn foreground(self) -> Color32 {
        match self {
            Self::Dark => Color32::from_rgb(236, 238, 245),
            Self::Light => Color32::from_rgb(24, 22, 40),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Background {
        color: Color32,
        vignette: Color32,
    },
    Axis {
        from: Pos2,
        to: Pos2,
        color: Color32,
    },
    /// Soft filled disc, used for family regions and dot halos.
    Glow {
        center: Pos2,
        radius: f32,
        color: Color32,
    },
    Dot {
        id: EntryId,
        center: Pos2,
        radius: f32,
        color: Color32,
    },
    Ring {
        center: Pos2,
        radius: f32,
        width: f32,
        color: Color32,
    },
    /// Rounded label centered on `center`.
    Pill {
        center: Pos2,
        label: &'static str,
        font_px: f32,
        color: Color32,
        fill: Color32,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub size: Vec2,
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn dots(&self) -> impl Iterator<Item = &EntryId> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Dot { id, .. } => Some(id),
            _ => None,
        })
    }

    pub fn pills(&self) -> impl Iterator<Item = &'static str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Pill { label, .. } => Some(*label),
            _ => None,
        })
    }

    pub fn glow_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Glow { .. }))
            .count()
    }

    pub fn has_axes(&self) -> bool {
        self.commands
            .iter()
            .any(|command| matches!(command, DrawCommand::Axis { .. }))
    }
}

/// Everything one frame needs. Sizes are device pixels.
pub struct SceneInput<'a> {
    pub entries: &'a [Entry],
    pub engine: &'a LayoutEngine,
    pub viewport: &'a Viewport,
    pub canvas_size: Vec2,
    pub pixels_per_point: f32,
    pub theme: Theme,
    pub selected: Option<&'a EntryId>,
    pub hovered: Option<&'a EntryId>,
}

/// Dot radius in device pixels, easing from 4 to 40 as the view zooms in.
pub fn dot_radius_px(scale: f32) -> f32 {
    let t = ((scale - 30.0) / 3000.0).clamp(0.0, 1.0);
    (4.0 + t.powf(0.55) * 34.0).clamp(4.0, 40.0)
}

/// Whether `point` lies within the canvas grown by the cull margin plus `reach` on every side.
fn is_visible(point: Pos2, size: Vec2, reach: f32) -> bool {
    let margin = CULL_MARGIN_PX + reach;
    point.x >= -margin
        && point.y >= -margin
        && point.x <= size.x + margin
        && point.y <= size.y + margin
}

pub fn build_scene(input: &SceneInput<'_>) -> Scene {
    let size = input.canvas_size;
    let theme = input.theme;
    let viewport = input.viewport;
    let pixel_ratio = input.pixels_per_point.max(1.0);
    let mut commands = Vec::with_capacity(input.entries.len() * 2 + 8);

    commands.push(DrawCommand::Background {
        color: theme.background(),
        vignette: theme.vignette(),
    });

    if viewport.scale() > AXIS_MIN_SCALE {
        let origin = viewport.world_to_screen(Vec2::ZERO);
        commands.push(DrawCommand::Axis {
            from: pos2(0.0, origin.y),
            to: pos2(size.x, origin.y),
            color: theme.axis(),
        });
        commands.push(DrawCommand::Axis {
            from: pos2(origin.x, 0.0),
            to: pos2(origin.x, size.y),
            color: theme.axis(),
        });
    }

    let band = viewport.zoom_band();
    let centroids = input.engine.centroids();
    if band == ZoomBand::Family {
        push_family_regions(&mut commands, centroids, viewport, size, theme, pixel_ratio);
    }

    let focus = input
        .selected
        .and_then(|id| input.entries.iter().find(|entry| &entry.id == id))
        .and_then(Entry::primary);
    let radius = dot_radius_px(viewport.scale());
    let mut rings = Vec::new();

    for entry in input.entries {
        let Some(world) = input.engine.position_of(entry) else {
            continue;
        };
        let center = viewport.world_to_screen(world);
        if !is_visible(center, size, 0.0) {
            continue;
        }

        let mut color = color_of(entry.primary(), entry.emotion());
        if focus.is_some() && entry.primary() != focus {
            color = dim_color(color, theme, 0.35);
        }

        commands.push(DrawCommand::Glow {
            center,
            radius: radius * 1.8,
            color: with_alpha(color, 0.18),
        });
        commands.push(DrawCommand::Dot {
            id: entry.id.clone(),
            center,
            radius,
            color,
        });

        if input.selected == Some(&entry.id) {
            rings.push(DrawCommand::Ring {
                center,
                radius: radius + 4.0 * pixel_ratio,
                width: 2.0 * pixel_ratio,
                color: theme.foreground(),
            });
        } else if input.hovered == Some(&entry.id) {
            rings.push(DrawCommand::Ring {
                center,
                radius: radius + 3.0 * pixel_ratio,
                width: 1.0 * pixel_ratio,
                color: with_alpha(theme.foreground(), 0.6),
            });
        }
    }
    commands.extend(rings);

    if band == ZoomBand::Detail {
        push_detail_pills(&mut commands, centroids, viewport, size, theme, pixel_ratio);
    }

    Scene { size, commands }
}

fn push_family_regions(
    commands: &mut Vec<DrawCommand>,
    centroids: &Centroids,
    viewport: &Viewport,
    size: Vec2,
    theme: Theme,
    pixel_ratio: f32,
) {
    let alpha = if theme.is_dark() { 0.12 } else { 0.16 };
    for (primary, centroid) in centroids.primaries() {
        let center = viewport.world_to_screen(centroid.world());
        let radius = viewport.scale() * (0.45 + 0.12 * (centroid.count as f32).sqrt());
        if !is_visible(center, size, radius) {
            continue;
        }
        let color = color_of(Some(primary), None);
        commands.push(DrawCommand::Glow {
            center,
            radius,
            color: with_alpha(color, alpha),
        });
        commands.push(DrawCommand::Pill {
            center,
            label: primary.label(),
            font_px: 13.0 * pixel_ratio,
            color,
            fill: Color32::TRANSPARENT,
        });
    }
}

fn push_detail_pills(
    commands: &mut Vec<DrawCommand>,
    centroids: &Centroids,
    viewport: &Viewport,
    size: Vec2,
    theme: Theme,
    pixel_ratio: f32,
) {
    for (secondary, centroid) in centroids.secondaries() {
        let anchor = viewport.world_to_screen(centroid.world());
        if !is_visible(anchor, size, 0.0) {
            continue;
        }
        commands.push(DrawCommand::Pill {
            center: anchor - Vec2::new(0.0, 32.0 * pixel_ratio),
            label: secondary.label(),
            font_px: 12.0 * pixel_ratio,
            color: color_of(Some(secondary.primary()), Some(secondary)),
            fill: theme.pill_fill(),
        });
    }
}
