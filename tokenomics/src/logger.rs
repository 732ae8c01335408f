// Console logger for hosts embedding the engine
//
// The engine only talks to the `log` facade; installing a backend is left to
// the host. This helper installs a colored fern dispatcher writing to stdout.

use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

fn level_colors() -> ColoredLevelConfig {
    ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Cyan)
        .trace(Color::BrightBlack)
}

/// Build the dispatcher without installing it
pub fn build_dispatch(level: LevelFilter, colored: bool) -> fern::Dispatch {
    let colors = level_colors();
    fern::Dispatch::new()
        .format(move |out, message, record| {
            let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
            if colored {
                out.finish(format_args!(
                    "[{}] [{}] [{}] {}",
                    timestamp,
                    colors.color(record.level()),
                    record.target(),
                    message
                ))
            } else {
                out.finish(format_args!(
                    "[{}] [{}] [{}] {}",
                    timestamp,
                    record.level(),
                    record.target(),
                    message
                ))
            }
        })
        .level(level)
        .chain(std::io::stdout())
}

/// Install the console logger as the global `log` backend
///
/// Fails if another logger was already installed.
pub fn setup_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    build_dispatch(level, true).apply()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_keeps_level() {
        let (level, _logger) = build_dispatch(LevelFilter::Debug, false).into_log();
        assert_eq!(level, LevelFilter::Debug);

        let (level, _logger) = build_dispatch(LevelFilter::Off, true).into_log();
        assert_eq!(level, LevelFilter::Off);
    }
}
