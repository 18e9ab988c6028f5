pub mod clipboard;
mod dispatch;
pub mod document;
pub mod form;
pub mod height;
pub mod mention;

use crossterm::event::KeyEvent;

pub use clipboard::{Clipboard, SystemClipboard};
pub use document::Document;
pub use form::{EditorFormField, FormField};
pub use mention::Mention;

/// Display-side collaborator. The editor never draws; it hands the surface
/// its segments at render time and asks it to keep the highlight visible
/// after each edit. The surface in turn knows the usable inner width, which
/// drives wrap-aware height negotiation.
pub trait RenderSurface {
    /// Usable width inside the widget's borders, in cells. 0 means the
    /// layout is not known yet and wrapping is disabled.
    fn inner_width(&self) -> usize;
    /// Bring the highlighted selection into view.
    fn scroll_to_highlight(&mut self);
}

/// In-place text editor widget: a [`Document`] plus the wiring a host needs
/// to embed it — key dispatch, mention trigger detection, height
/// negotiation and lifecycle callbacks.
pub struct Editor {
    pub(crate) doc: Document,
    pub(crate) clipboard: Box<dyn Clipboard>,
    pub(crate) input_capture: Option<Box<dyn FnMut(KeyEvent) -> Option<KeyEvent>>>,
    pub(crate) mention_show_handler: Option<Box<dyn FnMut(&str)>>,
    pub(crate) mention_hide_handler: Option<Box<dyn FnMut()>>,
    pub(crate) height_request_handler: Option<Box<dyn FnMut(usize)>>,
    pub(crate) finished_handler: Option<Box<dyn FnMut()>>,
    /// Called when Escape reaches the editor.
    pub cancel_func: Option<Box<dyn FnMut()>>,
    /// Called when Alt+Enter reaches the editor.
    pub accept_func: Option<Box<dyn FnMut()>>,
    pub(crate) requested_height: usize,
    pub(crate) inner_width: usize,
    pub(crate) mention: Option<Mention>,
}

impl Default for Editor {
    fn default() -> Self {
        Editor::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Editor {
            doc: Document::new(),
            clipboard: Box::new(SystemClipboard),
            input_capture: None,
            mention_show_handler: None,
            mention_hide_handler: None,
            height_request_handler: None,
            finished_handler: None,
            cancel_func: None,
            accept_func: None,
            requested_height: height::DEFAULT_HEIGHT,
            inner_width: 0,
            mention: None,
        }
    }

    /// Replace the whole text, placing the caret at the end.
    pub fn set_text(&mut self, text: &str) {
        self.doc.set_text(text);
        self.refresh_mention();
        self.refresh_height();
    }

    /// The logical text, with no trace of the caret sentinel.
    pub fn get_text(&self) -> String {
        self.doc.flatten()
    }

    /// The underlying segments, for the render surface.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Feed one keyboard event through the dispatch table.
    pub fn handle_key(&mut self, event: KeyEvent, surface: &mut dyn RenderSurface) {
        dispatch::handle_key(self, event, surface);
    }

    /// Bracketed-paste entry point: splice `text` in as a single edit, with
    /// the same semantics as a clipboard paste of known content.
    pub fn paste(&mut self, text: &str, surface: &mut dyn RenderSurface) {
        if text.is_empty() {
            return;
        }
        self.inner_width = surface.inner_width();
        self.doc.paste_text(text);
        self.refresh_mention();
        self.refresh_height();
        surface.scroll_to_highlight();
    }

    /// Char-index range `[begin, end)` of the active mention's name in the
    /// flattened text, or `(0, 0)` while no trigger is active.
    pub fn current_mention_indices(&self) -> (usize, usize) {
        self.mention
            .as_ref()
            .map_or((0, 0), |m| (m.begin, m.end))
    }

    pub fn current_mention(&self) -> Option<&Mention> {
        self.mention.as_ref()
    }

    /// The height last negotiated with the host.
    pub fn requested_height(&self) -> usize {
        self.requested_height
    }

    /// Display row of the selection start at the current width; the render
    /// surface scrolls this row into view.
    pub fn selection_display_row(&self) -> usize {
        height::selection_row(self.doc.left(), self.inner_width)
    }

    /// Host-supplied layout width (inside borders). Re-negotiates the
    /// height when it changes.
    pub fn set_inner_width(&mut self, width: usize) {
        if self.inner_width != width {
            self.inner_width = width;
            self.refresh_height();
        }
    }

    /// Install a hook consulted before printable input reaches the
    /// document. It may rewrite the event or veto it by returning `None`.
    pub fn set_input_capture(
        &mut self,
        capture: Box<dyn FnMut(KeyEvent) -> Option<KeyEvent>>,
    ) {
        self.input_capture = Some(capture);
    }

    pub fn set_mention_show_handler(&mut self, handler: Box<dyn FnMut(&str)>) {
        self.mention_show_handler = Some(handler);
    }

    pub fn set_mention_hide_handler(&mut self, handler: Box<dyn FnMut()>) {
        self.mention_hide_handler = Some(handler);
    }

    pub fn set_on_height_change_request(&mut self, handler: Box<dyn FnMut(usize)>) {
        self.height_request_handler = Some(handler);
    }

    /// Swap the clipboard provider (tests use a fake).
    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = clipboard;
    }

    pub(crate) fn set_finished_handler(&mut self, handler: Box<dyn FnMut()>) {
        self.finished_handler = Some(handler);
    }

    /// Wrap this editor in the narrow form-field adapter.
    pub fn into_form_field(self, label: impl Into<String>) -> EditorFormField {
        EditorFormField::new(self, label)
    }

    pub(crate) fn refresh_mention(&mut self) {
        let scanned = mention::scan_mention(self.doc.left(), &self.doc.flatten());
        match &scanned {
            Some(m) => {
                if let Some(cb) = self.mention_show_handler.as_mut() {
                    cb(&m.name);
                }
            }
            None => {
                if let Some(cb) = self.mention_hide_handler.as_mut() {
                    cb();
                }
            }
        }
        self.mention = scanned;
    }

    pub(crate) fn refresh_height(&mut self) {
        let new = height::requested_height(&self.doc.flatten(), self.inner_width);
        if new != self.requested_height {
            self.requested_height = new;
            if let Some(cb) = self.height_request_handler.as_mut() {
                cb(new);
            }
        }
    }
}
