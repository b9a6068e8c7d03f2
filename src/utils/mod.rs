pub mod persistence;

use std::sync::Once;

use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "budget_forecast=info";

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, defaulting this crate to `info`.
///
/// Safe to call repeatedly; only the first call has an effect. A subscriber
/// installed elsewhere is left in place.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = DEFAULT_DIRECTIVE.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
        let _ = fmt().with_env_filter(filter).try_init();
    });
}
