use affect_atlas::entry::EntryId;

mod details;
mod log;
mod panels;

/// Requests raised by the side panels, applied after the frame's UI has been laid out.
#[derive(Default)]
pub(super) struct PanelActions {
    pub(super) toggle_theme: bool,
    pub(super) toggle_log: bool,
    /// Row picked in the log window.
    pub(super) pick: Option<EntryId>,
    pub(super) submit_text: bool,
    pub(super) submit_image: bool,
    pub(super) delete: Option<EntryId>,
}
