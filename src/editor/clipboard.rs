use std::process::Command;

/// Read-only clipboard access consumed by the paste path. Returning `None`
/// means the clipboard is unavailable; the paste degrades to a no-op.
pub trait Clipboard {
    fn read_text(&mut self) -> Option<String>;
}

/// OS clipboard via the platform paste utility.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn read_text(&mut self) -> Option<String> {
        #[cfg(target_os = "macos")]
        let output = Command::new("pbpaste").output().ok();
        #[cfg(target_os = "linux")]
        let output = Command::new("xclip")
            .args(["-selection", "clipboard", "-o"])
            .output()
            .ok();
        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        let output: Option<std::process::Output> = None;
        output.and_then(|o| {
            if o.status.success() {
                String::from_utf8(o.stdout).ok()
            } else {
                None
            }
        })
    }
}
