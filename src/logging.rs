use std::io::Write;

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Initializes the global logger.
///
/// `level` takes precedence over `RUST_LOG`; without either, `info` is used.
/// Calling this twice keeps the first logger.
pub fn init_logging(level: Option<&str>) {
    let log_level = level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| {
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|v| v.parse::<LevelFilter>().ok())
        })
        .unwrap_or(LevelFilter::Info);

    let _ = Builder::new()
        .filter_level(log_level)
        .target(Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "{:<8}[{}] {}",
                record.level(),
                record.target().rsplit("::").next().unwrap_or("obstacle_bc"),
                record.args()
            )
        })
        .try_init();
}
