use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::editor::{Document, RenderSurface};
use crate::util::unicode;

use super::app::App;
use super::theme::Theme;

/// Maximum number of visible entries in the mention popup
const MAX_VISIBLE: usize = 8;

/// Render-side state of the editor widget: the geometry measured during the
/// last draw and the scroll offset that keeps the highlight visible.
#[derive(Debug, Clone, Default)]
pub struct EditorView {
    pub inner_width: usize,
    pub inner_height: usize,
    pub scroll: usize,
    scroll_pending: bool,
}

impl EditorView {
    pub fn new() -> Self {
        EditorView::default()
    }

    /// Apply a pending scroll request against the caret's display row.
    fn resolve_scroll(&mut self, caret_row: usize) {
        if !self.scroll_pending {
            return;
        }
        self.scroll_pending = false;
        if self.inner_height == 0 {
            return;
        }
        if caret_row < self.scroll {
            self.scroll = caret_row;
        } else if caret_row >= self.scroll + self.inner_height {
            self.scroll = caret_row + 1 - self.inner_height;
        }
    }
}

impl RenderSurface for EditorView {
    fn inner_width(&self) -> usize {
        self.inner_width
    }

    fn scroll_to_highlight(&mut self) {
        self.scroll_pending = true;
    }
}

/// Main render function: editor box sized by height negotiation, status row,
/// mention popup on top.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let requested = app.editor.requested_height().min(u16::MAX as usize) as u16;
    let editor_h = requested.clamp(3, area.height.saturating_sub(1).max(3));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(editor_h),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_editor(frame, app, chunks[0]);
    render_status(frame, app, chunks[2]);

    if app.popup.borrow().visible {
        render_mention_popup(frame, app, chunks[0]);
    }
}

/// Draw the editor widget: bordered box, the three segments with the
/// selection highlighted, scrolled so the highlight stays in view.
fn render_editor(frame: &mut Frame, app: &mut App, area: Rect) {
    let inner_w = area.width.saturating_sub(2) as usize;
    let inner_h = area.height.saturating_sub(2) as usize;
    app.view.inner_width = inner_w;
    app.view.inner_height = inner_h;
    app.editor.set_inner_width(inner_w);
    let caret_row = app.editor.selection_display_row();
    app.view.resolve_scroll(caret_row);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(app.theme.background));
    let lines = segment_lines(app.editor.document(), &app.theme);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.view.scroll as u16, 0));
    frame.render_widget(paragraph, area);
}

/// Style the raw segments into display lines. The selection segment carries
/// the highlight; while it holds the caret sentinel this paints a one-cell
/// block at the insertion point.
fn segment_lines(doc: &Document, theme: &Theme) -> Vec<Line<'static>> {
    let base = Style::default().fg(theme.text).bg(theme.background);
    let highlight = Style::default()
        .fg(theme.text_bright)
        .bg(theme.selection_bg);
    let segments = [
        (doc.left(), base),
        (doc.selection(), highlight),
        (doc.right(), base),
    ];

    let mut lines: Vec<Line<'static>> = vec![Line::default()];
    for (text, style) in segments {
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            if !part.is_empty()
                && let Some(last) = lines.last_mut()
            {
                last.push_span(Span::styled(part.to_string(), style));
            }
        }
    }
    lines
}

/// Render the mention popup floating below the editor box, aligned with the
/// caret column, listing the configured names that match the typed partial.
fn render_mention_popup(frame: &mut Frame, app: &App, edit_area: Rect) {
    let popup = app.popup.borrow();
    let filter = popup.filter.to_lowercase();
    let filtered: Vec<&String> = app
        .names
        .iter()
        .filter(|n| n.to_lowercase().starts_with(&filter))
        .collect();
    if filtered.is_empty() {
        return;
    }

    let bg = app.theme.background;
    let count = filtered.len().min(MAX_VISIBLE);

    // Determine the widest entry (+ padding)
    let max_width = filtered
        .iter()
        .take(MAX_VISIBLE)
        .map(|s| unicode::display_width(s))
        .max()
        .unwrap_or(10)
        + 4;

    let popup_w = (max_width as u16)
        .min(edit_area.width.saturating_sub(2))
        .max(12);
    let popup_h = (count as u16) + 2; // +2 for borders

    // Position: below the editor area if there is room, else above
    let term_area = frame.area();
    let y = if edit_area.y + edit_area.height + popup_h <= term_area.height {
        edit_area.y + edit_area.height
    } else {
        edit_area.y.saturating_sub(popup_h)
    };

    // Horizontal: align with the caret column
    let left = app.editor.document().left();
    let caret_col = unicode::display_width(left.rsplit('\n').next().unwrap_or(""))
        .min(app.view.inner_width);
    let x = (edit_area.x + caret_col as u16).min(term_area.width.saturating_sub(popup_w));

    let popup_area = Rect::new(x, y, popup_w, popup_h);

    let lines: Vec<Line> = filtered
        .iter()
        .take(MAX_VISIBLE)
        .map(|entry| {
            Line::from(Span::styled(
                format!(" {entry}"),
                Style::default().fg(app.theme.text).bg(bg),
            ))
        })
        .collect();

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.highlight).bg(bg))
        .style(Style::default().bg(bg));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, popup_area);
}

/// One-row status line: note name, dirty marker and key hints, or the last
/// host message.
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.status_message {
        Some(message) => format!(" {message}"),
        None => {
            let name = app
                .note_path
                .as_deref()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .unwrap_or("scratch");
            let dirty = if app.dirty() { " [+]" } else { "" };
            format!(" {name}{dirty}  \u{00B7}  Alt+Enter save \u{00B7} Esc quit")
        }
    };
    let text = unicode::truncate_to_width(&line, area.width as usize);
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use crate::io::config::Config;

    use super::*;

    /// Render into an in-memory buffer and return plain text (no styles).
    fn render_to_string(w: u16, h: u16, app: &mut App) -> String {
        let backend = TestBackend::new(w, h);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buf = terminal.backend().buffer().clone();
        let w = buf.area.width as usize;
        let lines: Vec<String> = buf
            .content
            .chunks(w)
            .map(|row| {
                let s: String = row.iter().map(|cell| cell.symbol()).collect();
                s.trim_end().to_string()
            })
            .collect();
        lines.join("\n")
    }

    #[test]
    fn renders_note_text_in_a_box() {
        let mut app = App::new(Config::default(), None, "hello box");
        let screen = render_to_string(40, 10, &mut app);
        assert!(screen.contains("hello box"));
        assert!(screen.contains("\u{250C}")); // top-left border corner
        assert!(screen.contains("scratch"));
    }

    #[test]
    fn renders_multiline_text() {
        let mut app = App::new(Config::default(), None, "first\nsecond");
        let screen = render_to_string(40, 10, &mut app);
        let first_row = screen.lines().position(|l| l.contains("first"));
        let second_row = screen.lines().position(|l| l.contains("second"));
        assert!(first_row.is_some());
        assert_eq!(second_row, first_row.map(|r| r + 1));
    }

    #[test]
    fn popup_lists_matching_names() {
        let mut config = Config::default();
        config.mentions.names = vec!["alice".into(), "anna".into(), "bob".into()];
        let mut app = App::new(config, None, "ping @a");
        let screen = render_to_string(40, 12, &mut app);
        assert!(screen.contains("alice"));
        assert!(screen.contains("anna"));
        assert!(!screen.contains("bob"));
    }

    #[test]
    fn popup_hidden_without_trigger() {
        let mut config = Config::default();
        config.mentions.names = vec!["alice".into()];
        let mut app = App::new(config, None, "no trigger here");
        let screen = render_to_string(40, 12, &mut app);
        assert!(!screen.contains("alice"));
    }

    #[test]
    fn status_shows_dirty_marker() {
        let mut app = App::new(Config::default(), None, "x");
        app.editor.set_text("x edited");
        let screen = render_to_string(40, 10, &mut app);
        assert!(screen.contains("[+]"));
    }

    #[test]
    fn editor_box_grows_with_requested_height() {
        let mut app = App::new(Config::default(), None, "a\nb\nc\nd");
        // first draw measures the width, second draw uses the negotiated height
        render_to_string(40, 20, &mut app);
        assert_eq!(app.editor.requested_height(), 6);
        let screen = render_to_string(40, 20, &mut app);
        let bottom_border = screen
            .lines()
            .position(|l| l.starts_with("\u{2514}"))
            .unwrap();
        assert_eq!(bottom_border, 5);
    }
}
