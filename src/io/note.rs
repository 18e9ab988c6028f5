use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Error type for note file operations
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
}

/// Read the note file. A missing file starts an empty note.
pub fn load_note(path: &Path) -> Result<String, NoteError> {
    if !path.exists() {
        return Ok(String::new());
    }
    fs::read_to_string(path).map_err(|e| NoteError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write the note atomically using a temp file + rename.
pub fn save_note(path: &Path, text: &str) -> Result<(), NoteError> {
    atomic_write(path, text.as_bytes()).map_err(|e| NoteError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
