use affect_atlas::entry::EntrySource;
use affect_atlas::taxonomy::color_of;
use eframe::egui::{self, RichText, Ui};

use super::super::ViewModel;
use super::PanelActions;

impl ViewModel {
    pub(in crate::app) fn draw_details(&self, ui: &mut Ui, actions: &mut PanelActions) {
        ui.heading("Entry");
        ui.add_space(6.0);

        let Some(entry) = self.selected_entry() else {
            ui.label("Select a dot on the atlas.");
            return;
        };

        ui.label(RichText::new(&entry.title).strong().size(16.0));
        ui.small(&entry.created_at);
        if let Some(location) = &entry.location {
            ui.small(location);
        }
        ui.add_space(6.0);

        match entry.classification() {
            Some(classification) => {
                let color =
                    color_of(Some(classification.primary()), Some(classification.emotion()));
                ui.horizontal(|ui| {
                    ui.label(RichText::new(classification.emotion().label()).color(color).strong());
                    ui.label(format!("({})", classification.primary()));
                });
                ui.label(format!(
                    "valence {:+.2} · arousal {:+.2} · confidence {:.0}%",
                    classification.valence(),
                    classification.arousal(),
                    classification.confidence() * 100.0
                ));
            }
            None => {
                ui.label(RichText::new("Unclassified").italics());
            }
        }

        ui.separator();
        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 48.0)
            .show(ui, |ui| {
                if !entry.body.is_empty() {
                    ui.label(&entry.body);
                }
                if entry.source == EntrySource::Image {
                    if let Some(image_url) = &entry.image_url {
                        ui.add_space(6.0);
                        ui.small(format!("Image: {image_url}"));
                    }
                    if let Some(ocr_text) = &entry.ocr_text {
                        ui.add_space(6.0);
                        ui.label(RichText::new("Extracted text").strong());
                        ui.label(ocr_text);
                    }
                }
            });

        ui.separator();
        let id = entry.id.clone();
        if ui.button("Delete entry").clicked() {
            actions.delete = Some(id);
        }
    }
}
