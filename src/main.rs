use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "notebox",
    about = concat!("[>] notebox v", env!("CARGO_PKG_VERSION"), " - edit a block of text in place"),
    version
)]
struct Cli {
    /// Note file to edit; omit for a scratch buffer
    note: Option<PathBuf>,

    /// Config file with [ui] colors and [mentions] names
    #[arg(long, default_value = "notebox.toml")]
    config: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = notebox::tui::run(cli.note.as_deref(), &cli.config) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
