use std::sync::OnceLock;

use regex::Regex;

/// Placeholder character standing in for a zero-width caret. It is only ever
/// the sole content of the selection segment, and only while nothing real is
/// selected.
pub const SENTINEL: char = '\u{205F}';

const SENTINEL_STR: &str = "\u{205F}";

/// Collapses a run of sentinel fillers down to the single canonical caret.
fn sentinel_run_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^\u{205F}+$").expect("sentinel pattern is valid"))
}

/// A word separator for word-jump navigation and mention boundaries.
pub fn is_word_separator(c: char) -> bool {
    c == ' ' || c == '\n'
}

/// The editable text buffer, held as three ordered segments:
///
/// - `left`: committed text strictly before the caret/selection
/// - `selection`: the highlighted span, or the sentinel when nothing is
///   selected
/// - `right`: committed text strictly after the selection
///
/// A caret in the middle of the text is represented as a single-character
/// selection blocking the character after the insertion point; the sentinel
/// appears only when the caret sits past the last character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    left: String,
    selection: String,
    right: String,
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Document {
            left: String::new(),
            selection: String::from(SENTINEL),
            right: String::new(),
        }
    }

    /// Reset the buffer to `raw` with the caret at the end.
    pub fn set_text(&mut self, raw: &str) {
        self.left = raw.chars().filter(|c| *c != SENTINEL).collect();
        self.selection = String::from(SENTINEL);
        self.right.clear();
    }

    /// The full logical text, with the sentinel contributing nothing.
    pub fn flatten(&self) -> String {
        let mut out = String::with_capacity(
            self.left.len() + self.selection.len() + self.right.len(),
        );
        out.push_str(&self.left);
        if !self.is_caret() {
            out.push_str(&self.selection);
        }
        out.push_str(&self.right);
        out
    }

    /// Text before the caret/selection.
    pub fn left(&self) -> &str {
        &self.left
    }

    /// The raw selection segment. Contains the sentinel while nothing real is
    /// selected.
    pub fn selection(&self) -> &str {
        &self.selection
    }

    /// Text after the selection.
    pub fn right(&self) -> &str {
        &self.right
    }

    /// True while the selection segment holds only the caret sentinel.
    pub fn is_caret(&self) -> bool {
        self.selection == SENTINEL_STR
    }

    fn selection_char_count(&self) -> usize {
        self.selection.chars().count()
    }

    /// Move the caret one position left. With `extend`, the traversed
    /// character is prepended to the selection; without, any highlighted
    /// selection first collapses back into `right` in order.
    pub fn move_caret_left(&mut self, extend: bool) {
        let Some(ch) = self.left.pop() else {
            return;
        };
        if extend {
            if self.is_caret() {
                self.selection.clear();
            }
            self.selection.insert(0, ch);
        } else {
            if !self.is_caret() {
                let sel = std::mem::take(&mut self.selection);
                self.right.insert_str(0, &sel);
            }
            self.selection = ch.to_string();
        }
        self.normalize();
    }

    /// Move the caret one position right. With `extend`, the next character
    /// of `right` is appended to the selection; without, the selection
    /// collapses into `left` and the caret blocks on the next character.
    ///
    /// At end-of-text: a sentinel caret stays put; a trailing selection
    /// collapses past itself without `extend`, and is a no-op with it.
    pub fn move_caret_right(&mut self, extend: bool) {
        if !self.right.is_empty() {
            if extend {
                let ch = self.right.remove(0);
                self.selection.push(ch);
            } else {
                let sel = std::mem::take(&mut self.selection);
                self.left.push_str(&sel);
                let ch = self.right.remove(0);
                self.selection = ch.to_string();
            }
        } else if !self.is_caret() && !extend {
            let sel = std::mem::take(&mut self.selection);
            self.left.push_str(&sel);
            self.selection = String::from(SENTINEL);
        }
        self.normalize();
    }

    /// Jump left over the word adjacent to the caret: skip the single
    /// separator next to the caret, then continue to the next separator or
    /// the start of the buffer.
    pub fn move_word_left(&mut self, extend: bool) {
        if self.left.is_empty() {
            return;
        }
        let chars: Vec<char> = self.left.chars().collect();
        let mut idx = chars.len();
        if is_word_separator(chars[idx - 1]) {
            idx -= 1;
        }
        while idx > 0 && !is_word_separator(chars[idx - 1]) {
            idx -= 1;
        }
        let boundary: usize = chars[..idx].iter().map(|c| c.len_utf8()).sum();
        let mut moved = self.left.split_off(boundary);
        if extend {
            if self.is_caret() {
                self.selection.clear();
            }
            moved.push_str(&self.selection);
            self.selection = moved;
        } else {
            if !self.is_caret() {
                let sel = std::mem::take(&mut self.selection);
                self.right.insert_str(0, &sel);
            }
            let first = moved.remove(0);
            self.right.insert_str(0, &moved);
            self.selection = first.to_string();
        }
        self.normalize();
    }

    /// Jump right over the word adjacent to the caret, symmetric to
    /// [`Document::move_word_left`]. Without `extend` the caret lands just
    /// after the word, blocking on the separator (or becomes the end-of-text
    /// sentinel when no separator follows).
    pub fn move_word_right(&mut self, extend: bool) {
        if self.right.is_empty() {
            return;
        }
        let chars: Vec<char> = self.right.chars().collect();
        let mut idx = 0;
        if is_word_separator(chars[0]) {
            idx = 1;
        }
        while idx < chars.len() && !is_word_separator(chars[idx]) {
            idx += 1;
        }
        let boundary: usize = chars[..idx].iter().map(|c| c.len_utf8()).sum();
        let moved: String = self.right.drain(..boundary).collect();
        if extend {
            if self.is_caret() {
                self.selection.clear();
            }
            self.selection.push_str(&moved);
        } else {
            let sel = std::mem::take(&mut self.selection);
            self.left.push_str(&sel);
            self.left.push_str(&moved);
            self.selection = if self.right.is_empty() {
                String::from(SENTINEL)
            } else {
                self.right.remove(0).to_string()
            };
        }
        self.normalize();
    }

    /// Select the entire buffer. No-op on empty text.
    pub fn select_all(&mut self) {
        if self.left.is_empty() && self.right.is_empty() && self.is_caret() {
            return;
        }
        let mut sel = std::mem::take(&mut self.left);
        if !self.is_caret() {
            sel.push_str(&self.selection);
        }
        sel.push_str(&self.right);
        self.right.clear();
        self.selection = sel;
        self.normalize();
    }

    /// Overwrite-on-type: a multi-character selection is dropped and the
    /// caret refills from `right` (or becomes the end-of-text sentinel). A
    /// single-character block is the caret itself and survives the edit.
    fn take_selection_for_edit(&mut self) {
        if self.selection_char_count() >= 2 {
            self.selection = if self.right.is_empty() {
                String::from(SENTINEL)
            } else {
                self.right.remove(0).to_string()
            };
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        self.take_selection_for_edit();
        if ch != SENTINEL {
            self.left.push(ch);
        }
        self.normalize();
    }

    pub fn insert_text(&mut self, s: &str) {
        self.take_selection_for_edit();
        self.left.extend(s.chars().filter(|c| *c != SENTINEL));
        self.normalize();
    }

    /// Splice clipboard text in at the caret. Same selection semantics as
    /// typing: a multi-character selection is overwritten, `right` is kept.
    /// With `right` empty the caret ends up as the end-of-text sentinel.
    pub fn paste_text(&mut self, s: &str) {
        self.insert_text(s);
    }

    /// Delete backward: a multi-character selection is deleted in place;
    /// otherwise the character before the caret is removed.
    pub fn backspace(&mut self) {
        if self.selection_char_count() >= 2 {
            self.selection = if self.right.is_empty() {
                String::from(SENTINEL)
            } else {
                self.right.remove(0).to_string()
            };
        } else if !self.left.is_empty() {
            self.left.pop();
        }
        self.normalize();
    }

    /// Delete forward: removes the selected text (for a caret block, the
    /// character under it) and refills the caret from `right`. A sentinel
    /// caret at end-of-text stays put.
    pub fn delete_forward(&mut self) {
        if self.is_caret() {
            return;
        }
        self.selection = if self.right.is_empty() {
            String::from(SENTINEL)
        } else {
            self.right.remove(0).to_string()
        };
        self.normalize();
    }

    /// Restore the canonical segment form. Individual transformation steps
    /// may transiently produce filler runs or an empty selection; one pass
    /// here makes the state canonical, and a second pass is a no-op.
    fn normalize(&mut self) {
        if sentinel_run_pattern().is_match(&self.selection) {
            self.selection = String::from(SENTINEL);
        } else if self.selection.contains(SENTINEL) {
            self.selection.retain(|c| c != SENTINEL);
        }
        if self.selection.is_empty() {
            self.selection = String::from(SENTINEL);
        }
        if self.is_caret() && !self.right.is_empty() {
            self.selection = self.right.remove(0).to_string();
        }
        assert!(
            !self.left.contains(SENTINEL) && !self.right.contains(SENTINEL),
            "sentinel leaked outside the selection segment"
        );
    }

    #[cfg(test)]
    fn from_parts(left: &str, selection: &str, right: &str) -> Self {
        Document {
            left: left.to_string(),
            selection: selection.to_string(),
            right: right.to_string(),
        }
    }

    #[cfg(test)]
    fn normalize_for_test(&mut self) {
        self.normalize();
    }
}
