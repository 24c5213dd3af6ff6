use affect_atlas::viewport::ZoomBand;
use eframe::egui::{self, Align, Layout, RichText, Ui};

use super::super::ViewModel;
use super::PanelActions;

impl ViewModel {
    pub(in crate::app) fn draw_top_bar(
        &mut self,
        ui: &mut Ui,
        pending_jobs: usize,
        actions: &mut PanelActions,
    ) {
        ui.horizontal(|ui| {
            ui.heading("affect-atlas");
            ui.separator();
            ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .hint_text("Search title, text, place or emotion")
                    .desired_width(280.0),
            );
            if !self.search.is_empty() && ui.small_button("Clear").clicked() {
                self.search.clear();
            }
            ui.label(format!("{} / {} entries", self.active.len(), self.entries.len()));
            if pending_jobs > 0 {
                ui.spinner();
                ui.label(format!("classifying {pending_jobs}"));
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let theme_label = if self.theme.is_dark() { "Light" } else { "Dark" };
                if ui.button(theme_label).clicked() {
                    actions.toggle_theme = true;
                }
                if ui.selectable_label(self.log_open, "Log").clicked() {
                    actions.toggle_log = true;
                }
                ui.label(format!(
                    "zoom {:.0} · {}",
                    self.viewport.scale(),
                    band_name(self.viewport.zoom_band())
                ));
                if let Some(status) = &self.status {
                    ui.label(RichText::new(status).italics());
                }
            });
        });
    }

    pub(in crate::app) fn draw_submit(&mut self, ui: &mut Ui, actions: &mut PanelActions) {
        ui.heading("New entry");
        ui.add_space(6.0);

        ui.label("Location (optional)");
        ui.add(
            egui::TextEdit::singleline(&mut self.draft_location)
                .hint_text("Where were you?")
                .desired_width(f32::INFINITY),
        );
        ui.add_space(6.0);

        ui.label("Write");
        ui.add(
            egui::TextEdit::multiline(&mut self.draft_text)
                .hint_text("What happened today?")
                .desired_rows(8)
                .desired_width(f32::INFINITY),
        );
        let can_submit_text = !self.draft_text.trim().is_empty();
        if ui
            .add_enabled(can_submit_text, egui::Button::new("Classify and add"))
            .clicked()
        {
            actions.submit_text = true;
        }

        ui.add_space(12.0);
        ui.separator();
        ui.label("Or import a photographed page");
        ui.add(
            egui::TextEdit::singleline(&mut self.draft_image)
                .hint_text("/path/to/page.jpg")
                .desired_width(f32::INFINITY),
        );
        let can_submit_image = !self.draft_image.trim().is_empty();
        if ui
            .add_enabled(can_submit_image, egui::Button::new("Read and add"))
            .clicked()
        {
            actions.submit_image = true;
        }

        ui.add_space(12.0);
        ui.separator();
        ui.small("Drag to pan, scroll to zoom, click a dot to open it.");
    }
}

fn band_name(band: ZoomBand) -> &'static str {
    match band {
        ZoomBand::Overview => "overview",
        ZoomBand::Family => "families",
        ZoomBand::Detail => "emotions",
    }
}
