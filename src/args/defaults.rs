use std::time::Duration;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("chopper/", env!("CARGO_PKG_VERSION"));

/// Applied when neither the CLI nor the config file sets a connect timeout.
pub(crate) const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
