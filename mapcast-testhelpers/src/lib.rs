#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub use mapcast_testhelpers_macros::test;

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::time::Uptime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding a `tracing_subscriber` target filter.
pub const LOG_ENV: &str = "MAPCAST_LOG";

static INIT: Once = Once::new();

/// The filter named by [`LOG_ENV`], or everything at `TRACE` when it is
/// unset or does not parse.
pub fn log_filter() -> Targets {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|directives| directives.parse::<Targets>().ok())
        .unwrap_or_else(|| Targets::new().with_default(Level::TRACE))
}

/// Sets up a tracing subscriber for tests.
///
/// Safe to call from every test: the subscriber is installed at most once per
/// process, and one installed by someone else is left alone.
pub fn setup() {
    INIT.call_once(|| {
        let layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_timer(Uptime::default())
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .compact();

        // a subscriber from elsewhere wins
        let _ = tracing_subscriber::registry()
            .with(layer)
            .with(log_filter())
            .try_init();
    });
}
