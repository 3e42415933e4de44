use log::Level;

/// Parse a level name, falling back to `info`
pub fn parse_level(name: &str) -> Level {
    name.trim().parse().unwrap_or(Level::Info)
}

/// Route `log` output and panics to the browser console. Safe to call more
/// than once; only the first call installs the logger.
pub fn init(level: Level) {
    console_error_panic_hook::set_once();
    console_log::init_with_level(level).ok();
}
