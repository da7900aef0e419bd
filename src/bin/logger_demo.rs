use armeta::logger::*;
use armeta::settings::Log;

fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    trace!("bootstrap trace log");
    debug!("bootstrap debug log");
    info!("bootstrap info log");

    let log = Log {
        filter: "logger_demo=trace,armeta=debug".to_string(),
    };
    logger.reload_from_config(&LogConfig::from(&log))?;
    trace!("application trace log");
    debug!("application debug log");
    info!("application info log");

    // an invalid directive leaves the previous filter in place
    let bad = LogConfig {
        filter: "armeta=loud".to_string(),
    };
    if let Err(e) = logger.reload_from_config(&bad) {
        warn!("rejected filter: {e}");
    }
    debug!("still at debug");

    Ok(())
}
