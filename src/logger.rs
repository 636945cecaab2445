use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// Installs the global logger once. `RUST_LOG` overrides `default_level`.
pub fn initialize_logger(default_level: LevelFilter) {
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();

        builder
            .filter_level(default_level)
            .format_timestamp_millis()
            .parse_default_env();

        // Another logger may already be installed, e.g. by a test harness
        let _ = builder.try_init();
    });
}
