//! log4rs setup
//!
//! The YAML file named in the config wins; without it, log to the console and
//! to a plain file at INFO.

use std::path::Path;

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::config::LoggingConfig;

/// Line layout; `remote` is set per request through log-mdc
pub const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l})} [{X(remote)(-)}] {t} - {m}{n}";

/// Install the global logger
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    if Path::new(&config.config_file).exists() {
        log4rs::init_file(&config.config_file, Default::default())?;
    } else {
        log4rs::init_config(fallback_config(&config.fallback_log_file)?)?;
    }
    Ok(())
}

/// Console plus file logging at INFO
pub fn fallback_config(log_file: &str) -> Result<Config, Box<dyn std::error::Error>> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(log_file)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("file", Box::new(file)))
        .build(Root::builder().appender("stdout").appender("file").build(LevelFilter::Info))?;
    Ok(config)
}
