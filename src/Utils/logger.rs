use crate::symbolic::errors::AlgebraError;
use chrono::Local;
use log::info;
use simplelog::*;
use std::fs::File;

/// Maps a level name to a filter. `None` means logging stays off.
pub fn level_filter(loglevel: Option<&str>) -> Result<LevelFilter, AlgebraError> {
    let Some(level) = loglevel else {
        return Ok(LevelFilter::Off);
    };
    match level.to_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => Err(AlgebraError::Config(format!(
            "loglevel must be off, error, warn, info, debug or trace, got `{}`",
            other
        ))),
    }
}

/// Terminal logger plus, optionally, a time-stamped `log_<date>.txt` file.
/// Initialising twice is harmless: the second call keeps the first logger.
pub fn init_logger(loglevel: Option<&str>, log_to_file: bool) -> Result<(), AlgebraError> {
    let log_option = level_filter(loglevel)?;
    if log_option == LevelFilter::Off {
        return Ok(());
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));
    if log_to_file {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("log_{}.txt", date_and_time);
        let file = File::create(&name)
            .map_err(|e| AlgebraError::Config(format!("cannot create log file {}: {}", name, e)))?;
        loggers.push(WriteLogger::new(log_option, Config::default(), file));
    }
    let logger_instance = CombinedLogger::init(loggers);
    match logger_instance {
        Ok(()) => {
            info!("logging started with level {}", log_option);
            Ok(())
        }
        Err(_) => Ok(()),
    }
}
