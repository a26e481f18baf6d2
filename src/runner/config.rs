use std::time::Duration;

use reqwest::Url;

use crate::{
    args::{DEFAULT_CONNECT_TIMEOUT, HttpMethod, PositiveUsize, RunArgs},
    error::{AppError, AppResult, ValidationError},
    http::{ClientSettings, RedirectPolicy, RequestTemplate},
};

/// Fully resolved parameters of one benchmark run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub url: Url,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub concurrency: PositiveUsize,
    pub duration: Duration,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    pub use_cookie_jar: bool,
    pub keep_alive: bool,
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Duration,
}

impl RunConfig {
    /// A GET run without redirects, cookies or keep-alive.
    #[must_use]
    pub const fn new(url: Url, concurrency: PositiveUsize, duration: Duration) -> Self {
        Self {
            url,
            method: HttpMethod::Get,
            headers: Vec::new(),
            concurrency,
            duration,
            follow_redirects: false,
            max_redirects: 0,
            use_cookie_jar: false,
            keep_alive: false,
            request_timeout: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Resolves CLI arguments (after config-file merging) into a run config.
    ///
    /// Convenience flags become headers after the explicit ones, in this
    /// order: `User-Agent`, `X-Forwarded-For`, `Connection`.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is missing or unusable.
    pub fn from_args(args: &RunArgs) -> AppResult<Self> {
        let raw_url = args
            .url
            .as_deref()
            .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;
        let url = parse_target_url(raw_url)?;

        let mut headers = args.headers.clone();
        if let Some(user_agent) = args.user_agent.as_ref() {
            headers.push(("User-Agent".to_owned(), user_agent.clone()));
        }
        if let Some(ip_address) = args.ip_address {
            headers.push(("X-Forwarded-For".to_owned(), ip_address.to_string()));
        }
        if args.keep_alive {
            headers.push(("Connection".to_owned(), "keep-alive".to_owned()));
        }

        Ok(Self {
            url,
            method: args.method,
            headers,
            concurrency: args.concurrency,
            duration: args.duration,
            follow_redirects: args.follow_redirects,
            max_redirects: args.max_redirects,
            use_cookie_jar: args.cookie_jar,
            keep_alive: args.keep_alive,
            request_timeout: args.request_timeout,
            connect_timeout: args.connect_timeout,
        })
    }

    #[must_use]
    pub const fn redirect_policy(&self) -> RedirectPolicy {
        if self.follow_redirects {
            RedirectPolicy::follow(self.max_redirects)
        } else {
            RedirectPolicy::disabled()
        }
    }

    #[must_use]
    pub const fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            keep_alive: self.keep_alive,
            request_timeout: self.request_timeout,
            connect_timeout: self.connect_timeout,
        }
    }

    /// # Errors
    ///
    /// Returns an error when a configured header is not valid HTTP.
    pub fn request_template(&self) -> AppResult<RequestTemplate> {
        RequestTemplate::new(self.method, self.url.clone(), &self.headers)
    }
}

/// Parses and checks a benchmark target.
///
/// # Errors
///
/// Returns an error for unparsable URLs, non-HTTP schemes and missing hosts.
pub fn parse_target_url(value: &str) -> AppResult<Url> {
    let url = Url::parse(value.trim()).map_err(|err| {
        AppError::validation(ValidationError::InvalidUrl {
            url: value.to_owned(),
            source: err,
        })
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::validation(ValidationError::UnsupportedScheme {
            scheme: url.scheme().to_owned(),
        }));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(AppError::validation(ValidationError::UrlMissingHost {
            url: value.to_owned(),
        }));
    }
    Ok(url)
}
