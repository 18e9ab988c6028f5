use super::Editor;

/// The minimal capability set a host form needs from an embedded field. A
/// deliberately narrow seam: the form learns the label and intrinsic width,
/// and installs the handler it wants called when the field yields focus.
pub trait FormField {
    fn label(&self) -> &str;
    /// Intrinsic width in cells. 0 lets the form hand the field all
    /// remaining space.
    fn field_width(&self) -> u16;
    fn set_finished_handler(&mut self, handler: Box<dyn FnMut()>);
}

/// Adapter exposing an [`Editor`] as a generic form field. Wraps the editor
/// whole; Tab events reaching the editor's dispatcher are forwarded to the
/// form's finished handler instead of mutating the document.
pub struct EditorFormField {
    editor: Editor,
    label: String,
}

impl EditorFormField {
    pub fn new(editor: Editor, label: impl Into<String>) -> Self {
        EditorFormField {
            editor,
            label: label.into(),
        }
    }

    pub fn editor(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn into_editor(self) -> Editor {
        self.editor
    }
}

impl FormField for EditorFormField {
    fn label(&self) -> &str {
        &self.label
    }

    fn field_width(&self) -> u16 {
        0
    }

    fn set_finished_handler(&mut self, handler: Box<dyn FnMut()>) {
        self.editor.set_finished_handler(handler);
    }
}
