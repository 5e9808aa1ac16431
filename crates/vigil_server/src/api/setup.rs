use anyhow::Context;
use std::io;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;
use vigil_settings::LogSettings;

const DEFAULT_TIME_PATTERN: &str =
    "[year]-[month]-[day]T[hour repr:24]:[minute]:[second]::[subsecond digits:4]";

pub async fn setup_logging(settings: &LogSettings) -> Result<(), anyhow::Error> {
    let time_format = time::format_description::parse(DEFAULT_TIME_PATTERN)
        .context("Failed to parse log time format")?;
    let filter = EnvFilter::try_new(&settings.log_level)
        .with_context(|| format!("Invalid LOG_LEVEL: {}", settings.log_level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_timer(UtcTime::new(time_format))
        .with_writer(io::stdout);

    let result = if settings.log_json {
        builder.json().flatten_event(true).try_init()
    } else {
        builder.with_ansi(true).try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
