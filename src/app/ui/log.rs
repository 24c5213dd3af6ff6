use affect_atlas::taxonomy::color_of;
use affect_atlas::util::short_date;
use eframe::egui::{self, Align, Context, Layout, RichText};

use super::super::ViewModel;
use super::PanelActions;

const ROW_HEIGHT: f32 = 22.0;

impl ViewModel {
    /// Every stored entry, newest first, regardless of the current search.
    pub(in crate::app) fn draw_log(&self, ctx: &Context, actions: &mut PanelActions) {
        if !self.log_open {
            return;
        }

        let mut open = true;
        egui::Window::new("Data log")
            .open(&mut open)
            .default_size([560.0, 420.0])
            .collapsible(false)
            .show(ctx, |ui| {
                if self.entries.is_empty() {
                    ui.label("No entries yet.");
                    return;
                }

                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show_rows(ui, ROW_HEIGHT, self.entries.len(), |ui, row_range| {
                        for entry in &self.entries[row_range] {
                            let is_selected = self.selected.as_ref() == Some(&entry.id);
                            let clicked = ui
                                .horizontal(|ui| {
                                    ui.monospace(short_date(&entry.created_at));
                                    let clicked =
                                        ui.selectable_label(is_selected, &entry.title).clicked();
                                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                        let (label, color) = match entry.classification() {
                                            Some(classification) => (
                                                classification.emotion().label(),
                                                color_of(
                                                    Some(classification.primary()),
                                                    Some(classification.emotion()),
                                                ),
                                            ),
                                            None => ("Pending", color_of(None, None)),
                                        };
                                        ui.label(RichText::new(format!("● {label}")).color(color));
                                        if let Some(location) = &entry.location {
                                            ui.small(location);
                                        }
                                    });
                                    clicked
                                })
                                .inner;

                            if clicked {
                                actions.pick = Some(entry.id.clone());
                            }
                        }
                    });

                ui.separator();
                ui.small("Click a row to open the entry.");
            });

        if !open {
            actions.toggle_log = true;
        }
    }
}
