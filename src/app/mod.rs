use std::path::PathBuf;
use std::time::Duration;

use affect_atlas::classify::{Classifier, MAX_TITLE_CHARS, TextExtractor, is_too_short};
use affect_atlas::entry::{Entry, EntryId, EntryPatch, EntrySource};
use affect_atlas::interaction::InteractionController;
use affect_atlas::layout::LayoutEngine;
use affect_atlas::render::Theme;
use affect_atlas::schedule::FrameRequest;
use affect_atlas::search::filter_entries;
use affect_atlas::store::EntryStore;
use affect_atlas::util::{headline, local_date};
use affect_atlas::viewport::Viewport;
use eframe::egui::{self, Context, Visuals};
use tracing::{info, warn};

use worker::{ClassificationWorker, Job};

mod canvas;
mod ui;
mod worker;

const WORKER_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct AtlasApp {
    store: Box<dyn EntryStore>,
    worker: ClassificationWorker,
    model: ViewModel,
}

struct ViewModel {
    entries: Vec<Entry>,
    active: Vec<Entry>,
    engine: LayoutEngine,
    viewport: Viewport,
    controller: InteractionController,
    frame: FrameRequest,
    last_tick: Option<f64>,
    search: String,
    applied_search: String,
    selected: Option<EntryId>,
    theme: Theme,
    draft_text: String,
    draft_image: String,
    draft_location: String,
    log_open: bool,
    status: Option<String>,
}

impl AtlasApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        store: Box<dyn EntryStore>,
        classifier: Box<dyn Classifier>,
        extractor: Box<dyn TextExtractor>,
        theme: Theme,
    ) -> Self {
        apply_theme(&cc.egui_ctx, theme);

        let mut app = Self {
            store,
            worker: ClassificationWorker::spawn(classifier, extractor),
            model: ViewModel::new(theme),
        };
        app.reload_entries(0.0);
        app
    }

    /// Pulls the store contents and re-derives the active set.
    fn reload_entries(&mut self, now: f64) {
        match self.store.list() {
            Ok(entries) => self.model.entries = entries,
            Err(error) => {
                warn!(%error, "failed to list entries");
                self.model.status = Some(format!("Could not load entries: {error}"));
            }
        }
        self.model.refresh_active(now);
    }

    fn submit_text(&mut self, now: f64) {
        let text = self.model.draft_text.trim().to_owned();
        if text.is_empty() {
            return;
        }
        if is_too_short(&text) {
            self.model.status = Some("Too short. Add a little more detail.".to_owned());
            return;
        }

        let id = EntryId::generate();
        let mut entry = Entry::new(id.clone(), new_entry_title(&text), local_date(0));
        entry.body = text.clone();
        entry.location = self.model.draft_location();
        if self.insert_entry(entry, now) {
            self.model.draft_text.clear();
            self.model.draft_location.clear();
            self.worker.submit(Job::Text { id, text });
        }
    }

    fn submit_image(&mut self, now: f64) {
        let raw_path = self.model.draft_image.trim().to_owned();
        if raw_path.is_empty() {
            return;
        }

        let path = PathBuf::from(&raw_path);
        let title = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("Image entry")
            .to_owned();
        let id = EntryId::generate();
        let mut entry = Entry::new(id.clone(), title, local_date(0));
        entry.source = EntrySource::Image;
        entry.image_url = Some(raw_path);
        entry.location = self.model.draft_location();
        if self.insert_entry(entry, now) {
            self.model.draft_image.clear();
            self.model.draft_location.clear();
            self.worker.submit(Job::Image { id, path });
        }
    }

    fn insert_entry(&mut self, entry: Entry, now: f64) -> bool {
        let id = entry.id.clone();
        match self.store.insert(entry) {
            Ok(()) => {
                info!(entry = %id, "entry submitted");
                self.model.status = Some("Classifying…".to_owned());
                self.reload_entries(now);
                true
            }
            Err(error) => {
                warn!(%error, "failed to store new entry");
                self.model.status = Some(format!("Could not save entry: {error}"));
                false
            }
        }
    }

    fn delete_entry(&mut self, id: &EntryId, now: f64) {
        match self.store.delete(id) {
            Ok(true) => {
                info!(entry = %id, "entry deleted");
                if self.model.selected.as_ref() == Some(id) {
                    self.model.selected = None;
                }
                self.reload_entries(now);
            }
            Ok(false) => self.reload_entries(now),
            Err(error) => {
                warn!(%error, entry = %id, "failed to delete entry");
                self.model.status = Some(format!("Could not delete entry: {error}"));
            }
        }
    }

    fn apply_worker_results(&mut self, now: f64) {
        let finished = self.worker.drain();
        if finished.is_empty() {
            return;
        }

        for result in finished {
            match result.outcome {
                Ok(classified) => {
                    let patch = EntryPatch {
                        ocr_text: classified.ocr_text,
                        ..EntryPatch::classified(
                            Some(classified.reply.title),
                            classified.reply.classification,
                        )
                    };
                    if let Err(error) = self.store.update(&result.id, patch) {
                        warn!(%error, entry = %result.id, "failed to store classification");
                    }
                    self.model.status = None;
                }
                Err(error) => {
                    warn!(
                        entry = %result.id,
                        %error,
                        "classification failed; entry stays unclassified"
                    );
                    self.model.status = Some(format!("Classification failed: {error}"));
                }
            }
        }
        self.reload_entries(now);
    }
}

impl ViewModel {
    fn new(theme: Theme) -> Self {
        Self {
            entries: Vec::new(),
            active: Vec::new(),
            engine: LayoutEngine::default(),
            viewport: Viewport::default(),
            controller: InteractionController::default(),
            frame: FrameRequest::default(),
            last_tick: None,
            search: String::new(),
            applied_search: String::new(),
            selected: None,
            theme,
            draft_text: String::new(),
            draft_image: String::new(),
            draft_location: String::new(),
            log_open: false,
            status: None,
        }
    }

    /// Re-filters, reconciles layout state, and drops a selection that left the set.
    fn refresh_active(&mut self, now: f64) {
        self.applied_search = self.search.clone();
        self.active = filter_entries(&self.entries, &self.search);
        let report = self.engine.sync(&self.active);

        if let Some(selected) = &self.selected
            && !self.active.iter().any(|entry| &entry.id == selected)
        {
            self.selected = None;
        }

        if report.changed() {
            self.controller.disturb(now);
        }
        self.frame.request();
    }

    fn set_selected(&mut self, selected: Option<EntryId>) {
        if self.selected != selected {
            self.selected = selected;
            self.frame.request();
        }
    }

    /// Brings a picked entry into the active set if the search hid it, then selects it.
    fn reveal_and_select(&mut self, id: EntryId, now: f64) {
        if !self.active.iter().any(|entry| entry.id == id) {
            self.search.clear();
            self.refresh_active(now);
        }
        self.set_selected(Some(id));
    }

    fn draft_location(&self) -> Option<String> {
        let location = self.draft_location.trim();
        (!location.is_empty()).then(|| location.to_owned())
    }

    fn selected_entry(&self) -> Option<&Entry> {
        let selected = self.selected.as_ref()?;
        self.active.iter().find(|entry| &entry.id == selected)
    }
}

fn new_entry_title(text: &str) -> String {
    match headline(text, MAX_TITLE_CHARS) {
        "" => "New entry".to_owned(),
        line => line.to_owned(),
    }
}

fn apply_theme(ctx: &Context, theme: Theme) {
    ctx.set_visuals(if theme.is_dark() {
        Visuals::dark()
    } else {
        Visuals::light()
    });
}

impl eframe::App for AtlasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|input| input.time);
        self.apply_worker_results(now);

        if self.model.search != self.model.applied_search {
            self.model.refresh_active(now);
        }

        let mut actions = ui::PanelActions::default();
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                self.model
                    .draw_top_bar(ui, self.worker.in_flight(), &mut actions)
            });

        egui::SidePanel::left("submit")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.model.draw_submit(ui, &mut actions));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.model.draw_details(ui, &mut actions));

        self.model.draw_log(ctx, &mut actions);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.model.draw_canvas(ui, now));

        if actions.toggle_theme {
            self.model.theme = self.model.theme.toggled();
            apply_theme(ctx, self.model.theme);
            self.model.frame.request();
        }
        if actions.toggle_log {
            self.model.log_open = !self.model.log_open;
        }
        if let Some(id) = actions.pick {
            self.model.log_open = false;
            self.model.reveal_and_select(id, now);
        }
        if actions.submit_text {
            self.submit_text(now);
        }
        if actions.submit_image {
            self.submit_image(now);
        }
        if let Some(id) = actions.delete {
            self.delete_entry(&id, now);
        }

        if self.model.frame.begin_frame() {
            ctx.request_repaint();
        }
        if let Some(wait) = self.model.controller.next_wake(now) {
            ctx.request_repaint_after(Duration::from_secs_f64(wait));
        }
        if self.worker.in_flight() > 0 {
            ctx.request_repaint_after(WORKER_POLL_INTERVAL);
        }
    }
}
