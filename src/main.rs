use std::io;

mod app;
mod cli;
mod constants;
mod countdown;
mod domain;
mod logging;
mod storage;

fn main() -> Result<(), io::Error> {
    let headless = std::env::args().len() > 1;
    if let Err(e) = logging::enable_logging(&storage::get_state_dir(), headless) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    if headless {
        cli::run_cli();
        return Ok(());
    }

    app::run_ui()
}
