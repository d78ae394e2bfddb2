use std::path::Path;

use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// Logs of this binary go to stdout and, when given, to a file.
/// Dependencies only report warnings and errors.
pub fn setup_logger(debug: bool, log_file: Option<&Path>) -> Result<(), fern::InitError> {
    let own_level = if debug { LevelFilter::Debug } else { LevelFilter::Info };
    let colors = ColoredLevelConfig::new()
        .info(Color::BrightGreen)
        .error(Color::BrightRed)
        .warn(Color::Yellow)
        .debug(Color::Magenta)
        .trace(Color::BrightCyan);

    let mut dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{:>5}]{}[{}] {}",
                colors.color(record.level()),
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                message
            ))
        })
        .level(LevelFilter::Warn)
        .level_for("server", own_level)
        .chain(std::io::stdout());
    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }
    dispatch.apply()?;
    Ok(())
}
