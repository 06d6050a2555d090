//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with an explicit filter such as `"info"` or
/// `"scene_engine=debug"`.
///
/// `RUST_LOG` still takes precedence when it is set. Calling this twice is
/// harmless: the second logger is rejected and the first one stays installed.
pub fn init_with_filter(filter: &str) {
    let result = env_logger::Builder::new()
        .parse_filters(filter)
        .parse_env("RUST_LOG")
        .try_init();

    if result.is_err() {
        log::debug!("Logger already initialized, keeping the existing one");
    }
}
