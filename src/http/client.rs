use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, cookie::Jar, redirect};
use tracing::error;

use crate::{
    args::DEFAULT_USER_AGENT,
    error::{AppError, AppResult, HttpError},
};

/// Transport knobs shared by every worker of a run.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub keep_alive: bool,
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Duration,
}

/// Builds a transport with automatic redirects disabled.
///
/// Redirects are walked by [`super::RequestExecutor`] so the hop budget and
/// the timing of a logical request stay under its control. When a cookie jar
/// is supplied the client attaches and stores cookies through it.
///
/// # Errors
///
/// Returns an error when the underlying client cannot be constructed.
pub fn build_client(settings: &ClientSettings, cookie_jar: Option<Arc<Jar>>) -> AppResult<Client> {
    let mut client_builder = Client::builder()
        .connect_timeout(settings.connect_timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .redirect(redirect::Policy::none());

    if let Some(timeout) = settings.request_timeout {
        client_builder = client_builder.timeout(timeout);
    }

    if !settings.keep_alive {
        client_builder = client_builder
            .pool_max_idle_per_host(0)
            .pool_idle_timeout(Some(Duration::from_secs(0)));
    }

    if let Some(jar) = cookie_jar {
        client_builder = client_builder.cookie_provider(jar);
    }

    client_builder.build().map_err(|err| {
        error!("Failed to build HTTP client: {}", err);
        AppError::http(HttpError::BuildClientFailed { source: err })
    })
}

#[must_use]
pub fn new_cookie_jar() -> Arc<Jar> {
    Arc::new(Jar::default())
}
