//! GeoGuard entrypoint: runs a single assessment or a daemon loop with a
//! configurable interval, writing one JSON summary line per assessment to stdout.

use geoguard::{config::SiteConfig, logging::StructuredLogger, pipeline::RiskPipeline};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

static STOP: AtomicBool = AtomicBool::new(false);

fn run_one_cycle(pipeline: &RiskPipeline) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let assessment = pipeline.assess()?;
    for alert in &assessment.alerts {
        warn!(grid_id = %assessment.grid.id, alert = %alert, "risk alert");
    }
    let mut stdout = std::io::stdout().lock();
    StructuredLogger::emit_json(&assessment.summary(), &mut stdout)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("GEOGUARD_CONFIG_PATH")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("config.json"));
    let config = SiteConfig::load(&config_path);

    StructuredLogger::init(config.log.json, &config.log.level);

    info!(
        site = %config.site.name,
        lat = config.site.center.lat,
        lon = config.site.center.lon,
        grid_size = config.grid.size,
        thresholds = %config.classification.name,
        "GeoGuard starting"
    );

    let pipeline = RiskPipeline::from_config(&config)?;

    let interval_secs = config.daemon.interval_secs;
    if interval_secs > 0 {
        info!(interval_secs, "daemon mode (Ctrl+C to stop)");
        let _ = ctrlc::set_handler(|| {
            STOP.store(true, Ordering::Relaxed);
        });
        let mut cycle: u64 = 0;
        while !STOP.load(Ordering::Relaxed) {
            cycle += 1;
            if let Err(e) = run_one_cycle(&pipeline) {
                warn!(cycle, error = %e, "cycle failed");
            }
            for _ in 0..interval_secs {
                if STOP.load(Ordering::Relaxed) {
                    break;
                }
                std::thread::sleep(Duration::from_secs(1));
            }
        }
        info!("GeoGuard stopping");
    } else {
        run_one_cycle(&pipeline)?;
        info!("GeoGuard cycle complete");
    }

    Ok(())
}
