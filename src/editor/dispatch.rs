use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{Editor, RenderSurface};

/// Route one keyboard event to a document transformation. After any branch
/// that touched the document, the mention trigger and requested height are
/// recomputed and the surface is asked to scroll the highlight into view.
pub(super) fn handle_key(ed: &mut Editor, event: KeyEvent, surface: &mut dyn RenderSurface) {
    ed.inner_width = surface.inner_width();
    if dispatch(ed, event) {
        ed.refresh_mention();
        ed.refresh_height();
        surface.scroll_to_highlight();
    }
}

/// The dispatch table proper. Returns true when the document was mutated.
fn dispatch(ed: &mut Editor, event: KeyEvent) -> bool {
    let mods = event.modifiers;
    let word_mods = KeyModifiers::CONTROL | KeyModifiers::SHIFT;
    match event.code {
        KeyCode::Left if mods == KeyModifiers::NONE || mods == KeyModifiers::SHIFT => {
            ed.doc.move_caret_left(mods == KeyModifiers::SHIFT);
            true
        }
        KeyCode::Right if mods == KeyModifiers::NONE || mods == KeyModifiers::SHIFT => {
            ed.doc.move_caret_right(mods == KeyModifiers::SHIFT);
            true
        }
        KeyCode::Left if mods == KeyModifiers::CONTROL => {
            ed.doc.move_word_left(false);
            true
        }
        KeyCode::Right if mods == KeyModifiers::CONTROL => {
            ed.doc.move_word_right(false);
            true
        }
        KeyCode::Left if mods == word_mods => {
            ed.doc.move_word_left(true);
            true
        }
        KeyCode::Right if mods == word_mods => {
            ed.doc.move_word_right(true);
            true
        }
        KeyCode::Char(c) if mods == KeyModifiers::CONTROL && c.eq_ignore_ascii_case(&'a') => {
            ed.doc.select_all();
            true
        }
        KeyCode::Char(c) if mods == KeyModifiers::CONTROL && c.eq_ignore_ascii_case(&'v') => {
            paste_from_clipboard(ed, event)
        }
        KeyCode::Backspace => {
            ed.doc.backspace();
            true
        }
        KeyCode::Delete => {
            ed.doc.delete_forward();
            true
        }
        KeyCode::Enter if mods == KeyModifiers::NONE => {
            ed.doc.insert_char('\n');
            true
        }
        _ => {
            let Some(event) = filter_input(ed, event) else {
                return false;
            };
            match event.code {
                KeyCode::Char(c)
                    if !event
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    ed.doc.insert_char(c);
                    true
                }
                _ => false,
            }
        }
    }
}

/// Ctrl+V: the capture hook may still veto; a failed clipboard read pastes
/// nothing and mutates nothing.
fn paste_from_clipboard(ed: &mut Editor, event: KeyEvent) -> bool {
    if filter_input(ed, event).is_none() {
        return false;
    }
    match ed.clipboard.read_text() {
        Some(text) => {
            ed.doc.paste_text(&text);
            true
        }
        None => false,
    }
}

/// Consult the host's capture hook, then the host-level keys: Escape
/// cancels, Alt+Enter accepts, Tab advances the form field when the editor
/// is embedded in one. Returns the (possibly rewritten) event for
/// insertion, or None when it was consumed or vetoed.
fn filter_input(ed: &mut Editor, event: KeyEvent) -> Option<KeyEvent> {
    let event = match ed.input_capture.as_mut() {
        Some(capture) => capture(event)?,
        None => event,
    };
    if event.code == KeyCode::Esc {
        if let Some(cb) = ed.cancel_func.as_mut() {
            cb();
        }
        return None;
    }
    if event.code == KeyCode::Enter && event.modifiers.contains(KeyModifiers::ALT) {
        if let Some(cb) = ed.accept_func.as_mut() {
            cb();
        }
        return None;
    }
    if event.code == KeyCode::Tab
        && let Some(cb) = ed.finished_handler.as_mut()
    {
        cb();
        return None;
    }
    Some(event)
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::super::clipboard::Clipboard;
    use super::super::form::FormField;
    use super::*;

    struct FakeSurface {
        width: usize,
        scrolls: usize,
    }

    impl FakeSurface {
        fn new(width: usize) -> Self {
            FakeSurface { width, scrolls: 0 }
        }
    }

    impl RenderSurface for FakeSurface {
        fn inner_width(&self) -> usize {
            self.width
        }
        fn scroll_to_highlight(&mut self) {
            self.scrolls += 1;
        }
    }

    struct FakeClipboard(Option<String>);

    impl Clipboard for FakeClipboard {
        fn read_text(&mut self) -> Option<String> {
            self.0.clone()
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn key_mod(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    fn type_str(ed: &mut Editor, surface: &mut FakeSurface, s: &str) {
        for c in s.chars() {
            ed.handle_key(key(KeyCode::Char(c)), surface);
        }
    }

    #[test]
    fn typing_builds_text() {
        let mut ed = Editor::new();
        let mut surface = FakeSurface::new(40);
        type_str(&mut ed, &mut surface, "hi");
        ed.handle_key(key(KeyCode::Enter), &mut surface);
        type_str(&mut ed, &mut surface, "there");
        assert_eq!(ed.get_text(), "hi\nthere");
    }

    #[test]
    fn arrows_and_shift_select_then_type() {
        let mut ed = Editor::new();
        let mut surface = FakeSurface::new(40);
        ed.set_text("hello");
        ed.handle_key(key_mod(KeyCode::Left, KeyModifiers::SHIFT), &mut surface);
        ed.handle_key(key_mod(KeyCode::Left, KeyModifiers::SHIFT), &mut surface);
        ed.handle_key(key(KeyCode::Char('p')), &mut surface);
        assert_eq!(ed.get_text(), "help");
    }

    #[test]
    fn ctrl_a_selects_all() {
        let mut ed = Editor::new();
        let mut surface = FakeSurface::new(40);
        ed.set_text("hello");
        ed.handle_key(
            key_mod(KeyCode::Char('a'), KeyModifiers::CONTROL),
            &mut surface,
        );
        ed.handle_key(key(KeyCode::Char('x')), &mut surface);
        assert_eq!(ed.get_text(), "x");
    }

    #[test]
    fn word_jump_then_insert() {
        let mut ed = Editor::new();
        let mut surface = FakeSurface::new(40);
        ed.set_text("foo bar baz");
        ed.handle_key(key_mod(KeyCode::Left, KeyModifiers::CONTROL), &mut surface);
        ed.handle_key(key(KeyCode::Char('X')), &mut surface);
        assert_eq!(ed.get_text(), "foo bar Xbaz");
    }

    #[test]
    fn ctrl_shift_word_select_then_delete() {
        let mut ed = Editor::new();
        let mut surface = FakeSurface::new(40);
        ed.set_text("foo bar baz");
        ed.handle_key(
            key_mod(KeyCode::Left, KeyModifiers::CONTROL | KeyModifiers::SHIFT),
            &mut surface,
        );
        ed.handle_key(key(KeyCode::Backspace), &mut surface);
        assert_eq!(ed.get_text(), "foo bar ");
    }

    #[test]
    fn backspace_and_delete() {
        let mut ed = Editor::new();
        let mut surface = FakeSurface::new(40);
        ed.set_text("abc");
        ed.handle_key(key(KeyCode::Backspace), &mut surface);
        assert_eq!(ed.get_text(), "ab");
        ed.handle_key(key(KeyCode::Left), &mut surface);
        ed.handle_key(key(KeyCode::Left), &mut surface);
        ed.handle_key(key(KeyCode::Delete), &mut surface);
        assert_eq!(ed.get_text(), "b");
    }

    #[test]
    fn paste_inserts_clipboard_text() {
        let mut ed = Editor::new();
        let mut surface = FakeSurface::new(40);
        ed.set_clipboard(Box::new(FakeClipboard(Some("pasted".into()))));
        ed.set_text("[] ");
        ed.handle_key(
            key_mod(KeyCode::Char('v'), KeyModifiers::CONTROL),
            &mut surface,
        );
        assert_eq!(ed.get_text(), "[] pasted");
    }

    #[test]
    fn paste_failure_is_silent() {
        let mut ed = Editor::new();
        let mut surface = FakeSurface::new(40);
        ed.set_clipboard(Box::new(FakeClipboard(None)));
        ed.set_text("keep");
        let scrolls_before = surface.scrolls;
        ed.handle_key(
            key_mod(KeyCode::Char('v'), KeyModifiers::CONTROL),
            &mut surface,
        );
        assert_eq!(ed.get_text(), "keep");
        assert_eq!(surface.scrolls, scrolls_before);
    }

    #[test]
    fn escape_triggers_cancel_without_mutation() {
        let cancelled = Rc::new(Cell::new(false));
        let mut ed = Editor::new();
        let c = cancelled.clone();
        ed.cancel_func = Some(Box::new(move || c.set(true)));
        let mut surface = FakeSurface::new(40);
        ed.set_text("abc");
        ed.handle_key(key(KeyCode::Esc), &mut surface);
        assert!(cancelled.get());
        assert_eq!(ed.get_text(), "abc");
        assert_eq!(surface.scrolls, 0);
    }

    #[test]
    fn alt_enter_triggers_accept() {
        let accepted = Rc::new(Cell::new(false));
        let mut ed = Editor::new();
        let a = accepted.clone();
        ed.accept_func = Some(Box::new(move || a.set(true)));
        let mut surface = FakeSurface::new(40);
        ed.set_text("done");
        ed.handle_key(key_mod(KeyCode::Enter, KeyModifiers::ALT), &mut surface);
        assert!(accepted.get());
        assert_eq!(ed.get_text(), "done");
    }

    #[test]
    fn tab_advances_form_field() {
        let finished = Rc::new(Cell::new(0));
        let mut field = Editor::new().into_form_field("Note");
        let f = finished.clone();
        field.set_finished_handler(Box::new(move || f.set(f.get() + 1)));
        let mut surface = FakeSurface::new(40);
        let ed = field.editor();
        ed.set_text("ab");
        ed.handle_key(key(KeyCode::Tab), &mut surface);
        assert_eq!(finished.get(), 1);
        assert_eq!(ed.get_text(), "ab");
    }

    #[test]
    fn tab_outside_form_is_ignored() {
        let mut ed = Editor::new();
        let mut surface = FakeSurface::new(40);
        ed.set_text("ab");
        ed.handle_key(key(KeyCode::Tab), &mut surface);
        assert_eq!(ed.get_text(), "ab");
    }

    #[test]
    fn input_capture_can_veto() {
        let mut ed = Editor::new();
        ed.set_input_capture(Box::new(|event| {
            if event.code == KeyCode::Char('x') {
                None
            } else {
                Some(event)
            }
        }));
        let mut surface = FakeSurface::new(40);
        type_str(&mut ed, &mut surface, "axb");
        assert_eq!(ed.get_text(), "ab");
    }

    #[test]
    fn input_capture_can_rewrite() {
        let mut ed = Editor::new();
        ed.set_input_capture(Box::new(|event| {
            if event.code == KeyCode::Char('o') {
                Some(KeyEvent::new(KeyCode::Char('0'), event.modifiers))
            } else {
                Some(event)
            }
        }));
        let mut surface = FakeSurface::new(40);
        type_str(&mut ed, &mut surface, "go");
        assert_eq!(ed.get_text(), "g0");
    }

    #[test]
    fn ctrl_chords_do_not_insert() {
        let mut ed = Editor::new();
        let mut surface = FakeSurface::new(40);
        ed.set_text("ab");
        ed.handle_key(
            key_mod(KeyCode::Char('x'), KeyModifiers::CONTROL),
            &mut surface,
        );
        ed.handle_key(key_mod(KeyCode::Char('y'), KeyModifiers::ALT), &mut surface);
        assert_eq!(ed.get_text(), "ab");
    }

    #[test]
    fn unrecognized_keys_are_ignored() {
        let mut ed = Editor::new();
        let mut surface = FakeSurface::new(40);
        ed.set_text("ab");
        ed.handle_key(key(KeyCode::Home), &mut surface);
        ed.handle_key(key(KeyCode::F(5)), &mut surface);
        assert_eq!(ed.get_text(), "ab");
        assert_eq!(surface.scrolls, 0);
    }

    #[test]
    fn mutating_keys_request_a_scroll() {
        let mut ed = Editor::new();
        let mut surface = FakeSurface::new(40);
        ed.handle_key(key(KeyCode::Char('a')), &mut surface);
        ed.handle_key(key(KeyCode::Left), &mut surface);
        assert_eq!(surface.scrolls, 2);
    }

    #[test]
    fn mention_trigger_follows_typing() {
        let shown: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let hidden = Rc::new(Cell::new(0));
        let mut ed = Editor::new();
        let s = shown.clone();
        ed.set_mention_show_handler(Box::new(move |name| s.borrow_mut().push(name.into())));
        let h = hidden.clone();
        ed.set_mention_hide_handler(Box::new(move || h.set(h.get() + 1)));
        let mut surface = FakeSurface::new(40);

        type_str(&mut ed, &mut surface, "@al");
        assert_eq!(*shown.borrow(), vec!["", "a", "al"]);
        assert_eq!(ed.current_mention_indices(), (1, 3));

        ed.handle_key(key(KeyCode::Char(' ')), &mut surface);
        assert_eq!(hidden.get(), 1);
        assert_eq!(ed.current_mention_indices(), (0, 0));
    }

    #[test]
    fn height_negotiation_during_typing() {
        let mut ed = Editor::new();
        let mut surface = FakeSurface::new(10);
        for _ in 0..9 {
            ed.handle_key(key(KeyCode::Char('a')), &mut surface);
        }
        assert_eq!(ed.requested_height(), 3);
        ed.handle_key(key(KeyCode::Char('a')), &mut surface);
        // ten cells at width ten wraps
        assert_eq!(ed.requested_height(), 4);
    }
}
