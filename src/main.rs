//! Cosmic Crunch entry point
//!
//! Headless demo shell standing in for the browser page: spawns the
//! simulation engine on its own thread, mashes the singularity at a fixed
//! rate, and prints the stats panel while the universe forms.

use std::time::{Duration, Instant};

use cosmic_crunch::platform::{FileStorage, SystemClock};
use cosmic_crunch::{PresentationAdapter, SimConfig, SimulationEngine};

const WIDTH: f32 = 1280.0;
const HEIGHT: f32 = 720.0;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let (handle, events) = SimulationEngine::spawn(
        SimConfig::default(),
        Box::new(FileStorage::new("saves")),
        Box::new(SystemClock::new()),
        seed,
    );
    let mut adapter = PresentationAdapter::new(handle.commands.clone(), events);

    adapter.init(WIDTH, HEIGHT);
    adapter.start(WIDTH, HEIGHT, 1.0);

    // Demo session: click ten times a second for thirty seconds
    let end = Instant::now() + Duration::from_secs(30);
    let mut next_click = Instant::now();
    let mut next_report = Instant::now() + Duration::from_secs(5);
    let mut log_cursor = 0;

    while Instant::now() < end {
        if Instant::now() >= next_click {
            adapter.click();
            next_click += Duration::from_millis(100);
        }
        if !adapter.pump() {
            log::warn!("engine hung up");
            break;
        }
        for line in &adapter.view().log[log_cursor..] {
            if line.important {
                log::info!("** {}", line.message);
            } else {
                log::info!("{}", line.message);
            }
        }
        log_cursor = adapter.view().log.len();

        if Instant::now() >= next_report {
            next_report += Duration::from_secs(5);
            for line in adapter.stats_lines() {
                log::info!("{line}");
            }
            for line in adapter.planet_lines() {
                log::info!("  {line}");
            }
        }
        std::thread::sleep(Duration::from_millis(16));
    }

    adapter.save();
    adapter.pump();
    drop(adapter);
    handle.shutdown();
}
