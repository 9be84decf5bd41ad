use readaloud::app::{App, AppEvent};
use readaloud::engine::config::{load_dotenv, Config};
use readaloud::engine::logging;
use readaloud::ui::TuiManager;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = load_dotenv();
    let (config, warnings) = Config::from_env();
    logging::init(&config.log.file)?;
    log::info!("readaloud starting (.env loaded: {})", dotenv_loaded);
    for warning in &warnings {
        log::warn!("{}", warning);
    }

    let mut app = App::new(config);
    if let Some(path) = std::env::args().nth(1) {
        app.handle_event(AppEvent::LoadFile(path));
    }

    let mut tui = TuiManager::new()?;
    tui.run_event_loop(&mut app)?;

    log::info!("readaloud exiting");
    Ok(())
}
