use tracing_subscriber::{EnvFilter, FmtSubscriber};

const LOG_ENV: &str = "CHOPPER_LOG";

fn build_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };
    std::env::var(LOG_ENV)
        .or_else(|_missing| std::env::var("RUST_LOG"))
        .map_or_else(
            |_missing| EnvFilter::new(fallback),
            |value| EnvFilter::try_new(value).unwrap_or_else(|_invalid| EnvFilter::new(fallback)),
        )
}

/// Installs the global subscriber; later calls keep the first one.
pub fn init_logging(verbose: bool, no_color: bool) {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(build_filter(verbose))
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(false, true);
        init_logging(true, false);
    }
}
