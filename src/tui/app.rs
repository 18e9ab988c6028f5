use std::cell::{Cell, RefCell};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::editor::Editor;
use crate::io::config::{self, Config};
use crate::io::note;

use super::render::{self, EditorView};
use super::theme::Theme;

/// Mention popup state, driven by the editor's show/hide handlers.
#[derive(Debug, Clone, Default)]
pub struct MentionPopup {
    pub visible: bool,
    /// The partial name typed after `@`, used to filter the name list.
    pub filter: String,
}

/// The demo host: one editor widget filled from a note file, with a mention
/// popup, height-driven layout and a status row.
pub struct App {
    pub editor: Editor,
    pub view: EditorView,
    pub theme: Theme,
    /// Names offered by the mention popup.
    pub names: Vec<String>,
    pub popup: Rc<RefCell<MentionPopup>>,
    pub note_path: Option<PathBuf>,
    pub status_message: Option<String>,
    pub should_quit: bool,
    saved_text: String,
    cancel_requested: Rc<Cell<bool>>,
    accept_requested: Rc<Cell<bool>>,
}

impl App {
    pub fn new(config: Config, note_path: Option<PathBuf>, text: &str) -> Self {
        let theme = Theme::from_config(&config.ui);
        let popup = Rc::new(RefCell::new(MentionPopup::default()));
        let cancel_requested = Rc::new(Cell::new(false));
        let accept_requested = Rc::new(Cell::new(false));

        let mut editor = Editor::new();
        let p = popup.clone();
        editor.set_mention_show_handler(Box::new(move |name| {
            let mut p = p.borrow_mut();
            p.visible = true;
            p.filter = name.to_string();
        }));
        let p = popup.clone();
        editor.set_mention_hide_handler(Box::new(move || {
            p.borrow_mut().visible = false;
        }));
        let c = cancel_requested.clone();
        editor.cancel_func = Some(Box::new(move || c.set(true)));
        let a = accept_requested.clone();
        editor.accept_func = Some(Box::new(move || a.set(true)));
        editor.set_text(text);

        App {
            editor,
            view: EditorView::new(),
            theme,
            names: config.mentions.names,
            popup,
            note_path,
            status_message: None,
            should_quit: false,
            saved_text: text.to_string(),
            cancel_requested,
            accept_requested,
        }
    }

    /// True while the buffer differs from what was last loaded or saved.
    pub fn dirty(&self) -> bool {
        self.editor.get_text() != self.saved_text
    }
}

/// Handle a key event: forward it to the editor, then act on any lifecycle
/// callback it fired.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    app.status_message = None;
    app.editor.handle_key(key, &mut app.view);

    if app.cancel_requested.take() {
        app.should_quit = true;
    }
    if app.accept_requested.take() {
        accept(app);
    }
}

/// Alt+Enter: hand the flattened text back. With a note file that means an
/// atomic save; without one there is nothing to keep.
fn accept(app: &mut App) {
    let text = app.editor.get_text();
    match &app.note_path {
        Some(path) => match note::save_note(path, &text) {
            Ok(()) => {
                app.saved_text = text;
                app.should_quit = true;
            }
            Err(e) => app.status_message = Some(format!("save failed: {e}")),
        },
        None => app.should_quit = true,
    }
}

/// Run the TUI application
pub fn run(note_path: Option<&Path>, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config(config_path)?;
    let text = match note_path {
        Some(path) => note::load_note(path)?,
        None => String::new(),
    };
    let mut app = App::new(config, note_path.map(Path::to_path_buf), &text);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableBracketedPaste)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
                Event::Paste(text) => app.editor.paste(&text, &mut app.view),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
