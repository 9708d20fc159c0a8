use std::sync::Once;
use tracing::Level;

static INIT: Once = Once::new();

/// Install the fmt subscriber once; later calls and pre-installed
/// subscribers are left alone.
pub fn init_logging(level: Level) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    });
}

/// Maps a `-v` count to a level: none is WARN, one INFO, two DEBUG, more TRACE.
pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}
