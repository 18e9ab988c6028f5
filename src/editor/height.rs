use crate::util::unicode;

/// Rows taken by the widget's borders.
pub const BORDER_ROWS: usize = 2;

/// Height requested before any text has been set: one empty row plus borders.
pub const DEFAULT_HEIGHT: usize = 3;

/// Number of display rows `text` needs at the given inner width. Each
/// newline-delimited line takes one row, plus extra rows once its display
/// width reaches `width`. A width of 0 means the layout is unknown and
/// wrapping is disabled.
pub fn count_rows(text: &str, width: usize) -> usize {
    text.split('\n')
        .map(|line| {
            let dw = unicode::display_width(line);
            if width > 0 && dw >= width {
                1 + dw / width
            } else {
                1
            }
        })
        .sum()
}

/// The height to request from the host for `text`: content rows plus border
/// overhead.
pub fn requested_height(text: &str, width: usize) -> usize {
    count_rows(text, width) + BORDER_ROWS
}

/// Display row (0-based) on which the selection starts, given the text
/// before it. Used to scroll the highlight into view.
pub fn selection_row(left: &str, width: usize) -> usize {
    let mut row = 0;
    let mut lines = left.split('\n').peekable();
    while let Some(line) = lines.next() {
        let dw = unicode::display_width(line);
        if lines.peek().is_some() {
            // completed line: all its rows are above the caret
            row += if width > 0 && dw >= width {
                1 + dw / width
            } else {
                1
            };
        } else if width > 0 {
            // the caret's own line: only fully filled rows are above it
            row += dw / width;
        }
    }
    row
}
