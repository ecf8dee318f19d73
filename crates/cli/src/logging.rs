//! Stderr logging for the CLI.

use crate::error::CliError;

/// `Debug` when verbose, `Info` otherwise.
pub fn level_for(verbose: bool) -> log::LevelFilter {
    if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

/// Installs a `fern` dispatch writing timestamped records to stderr.
///
/// Stdout is reserved for command output.
pub fn init_logger(verbose: bool) -> Result<(), CliError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}  {} {}",
                chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                record.level(),
                message
            ))
        })
        .level(level_for(verbose))
        .chain(std::io::stderr())
        .apply()
        .map_err(|e| CliError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(false), log::LevelFilter::Info);
        assert_eq!(level_for(true), log::LevelFilter::Debug);
    }
}
