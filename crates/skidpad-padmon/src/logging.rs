use colored::Colorize;
use fern::Dispatch;

/// Setup the logger.
pub(crate) fn setup(verbose: bool, no_color: bool) {
    let log_level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    Dispatch::new()
        .format(|out, message, record| {
            let now = chrono::Local::now().format("%Y.%m.%d %H:%M:%S");
            let level = match record.level() {
                log::Level::Error => "ERROR".bright_red(),
                log::Level::Warn => "WARN".bright_yellow(),
                log::Level::Info => "INFO".normal(),
                log::Level::Debug | log::Level::Trace => "DEBUG".dimmed(),
            };
            out.finish(format_args!("[{now}] {level} {message}"));
        })
        .level(log_level)
        .chain(std::io::stdout())
        .apply()
        .expect("Unable to set up logger");

    if no_color {
        colored::control::set_override(false);
    }
}
