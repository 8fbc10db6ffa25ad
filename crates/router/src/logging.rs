//! Log output.
//!
//! The router only emits `tracing` events; applications choose where they go. [`init`]
//! installs a formatting subscriber writing to stdout, which is enough for most servers.

use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::FmtSubscriber;

use crate::config::Settings;

/// Installs a global fmt subscriber with `level` as maximum verbosity.
///
/// Fails if a global subscriber is already installed.
pub fn init(level: Level) -> Result<(), SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
}

/// Same as [`init`], logging at `DEBUG` when the `debug` setting is enabled and `INFO` otherwise.
pub fn init_from_settings(settings: &Settings) -> Result<(), SetGlobalDefaultError> {
    init(level_for(settings))
}

fn level_for(settings: &Settings) -> Level {
    if settings.debug() { Level::DEBUG } else { Level::INFO }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        let mut settings = Settings::default();
        assert_eq!(level_for(&settings), Level::INFO);

        settings.enable("debug").unwrap();
        assert_eq!(level_for(&settings), Level::DEBUG);
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init(Level::WARN);
        assert!(init(Level::WARN).is_err());
    }
}
