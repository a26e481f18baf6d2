use reqwest::{
    Client, Method, Request, StatusCode, Url,
    header::{HeaderMap, HeaderName, HeaderValue, LOCATION},
};
use tokio::time::Instant;
use tracing::debug;

use crate::{
    args::HttpMethod,
    error::{AppError, AppResult, HttpError},
    metrics::RequestOutcome,
};

/// Method, target and headers of one logical request.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl RequestTemplate {
    /// Builds a template; repeated header names are kept as separate values.
    ///
    /// # Errors
    ///
    /// Returns an error when a header name or value is not valid HTTP.
    pub fn new(method: HttpMethod, url: Url, headers: &[(String, String)]) -> AppResult<Self> {
        let mut header_map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                AppError::http(HttpError::InvalidHeaderName {
                    name: name.clone(),
                    source: err,
                })
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|err| {
                AppError::http(HttpError::InvalidHeaderValue {
                    name: name.clone(),
                    source: err,
                })
            })?;
            header_map.append(header_name, header_value);
        }

        Ok(Self {
            method: method.to_method(),
            url,
            headers: header_map,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RedirectPolicy {
    pub follow: bool,
    /// Only consulted when `follow` is set.
    pub max_redirects: u32,
}

impl RedirectPolicy {
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            follow: false,
            max_redirects: 0,
        }
    }

    #[must_use]
    pub const fn follow(max_redirects: u32) -> Self {
        Self {
            follow: true,
            max_redirects,
        }
    }
}

/// Executes logical requests for one worker.
///
/// The executor owns its transport, so a client built around a cookie jar
/// keeps that jar for the worker's lifetime and never shares it.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: Client,
    template: RequestTemplate,
    policy: RedirectPolicy,
}

impl RequestExecutor {
    #[must_use]
    pub const fn new(client: Client, template: RequestTemplate, policy: RedirectPolicy) -> Self {
        Self {
            client,
            template,
            policy,
        }
    }

    /// Runs one logical request, walking its redirect chain.
    ///
    /// Returns `None` when any hop fails at the transport level, when a
    /// redirect has no usable `Location`, or when the chain would exceed the
    /// redirect budget. The response time spans from the first hop to the
    /// end of the final response body.
    pub async fn execute_once(&self) -> Option<RequestOutcome> {
        let start = Instant::now();
        let mut walk = RedirectWalk::new(self.policy);
        let mut target = self.template.url.clone();

        loop {
            let response = match self.client.execute(self.build_request(&target)).await {
                Ok(response) => response,
                Err(err) => {
                    debug!("Request to {} failed: {}", target, err);
                    return None;
                }
            };

            let status = response.status();
            match walk.decide(status, &target, response.headers()) {
                HopDecision::Complete => {
                    if let Err(err) = response.bytes().await {
                        debug!("Failed to read response body from {}: {}", target, err);
                        return None;
                    }
                    return Some(RequestOutcome::new(status.as_u16(), start.elapsed()));
                }
                HopDecision::Follow(next) => {
                    drop(response);
                    target = next;
                }
                HopDecision::Abandon(reason) => {
                    debug!(
                        "Dropping request to {} after {} redirect(s): {}",
                        target,
                        walk.hops(),
                        reason.as_str()
                    );
                    return None;
                }
            }
        }
    }

    fn build_request(&self, url: &Url) -> Request {
        let mut request = Request::new(self.template.method.clone(), url.clone());
        *request.headers_mut() = self.template.headers.clone();
        request
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HopDecision {
    Complete,
    Follow(Url),
    Abandon(AbandonReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AbandonReason {
    BudgetExhausted,
    MissingLocation,
}

impl AbandonReason {
    const fn as_str(self) -> &'static str {
        match self {
            AbandonReason::BudgetExhausted => "redirect budget exhausted",
            AbandonReason::MissingLocation => "missing or malformed Location header",
        }
    }
}

/// Hop counter for one logical request.
#[derive(Debug)]
pub(crate) struct RedirectWalk {
    policy: RedirectPolicy,
    hops: u32,
}

impl RedirectWalk {
    pub(crate) const fn new(policy: RedirectPolicy) -> Self {
        Self { policy, hops: 0 }
    }

    pub(crate) const fn hops(&self) -> u32 {
        self.hops
    }

    pub(crate) fn decide(
        &mut self,
        status: StatusCode,
        current: &Url,
        headers: &HeaderMap,
    ) -> HopDecision {
        if !self.policy.follow || !status.is_redirection() {
            return HopDecision::Complete;
        }

        let next_hop = self.hops.saturating_add(1);
        if next_hop > self.policy.max_redirects {
            return HopDecision::Abandon(AbandonReason::BudgetExhausted);
        }

        match redirect_target(current, headers) {
            Some(next) => {
                self.hops = next_hop;
                HopDecision::Follow(next)
            }
            None => HopDecision::Abandon(AbandonReason::MissingLocation),
        }
    }
}

/// Resolves a `Location` header, absolute or relative to `current`.
pub(crate) fn redirect_target(current: &Url, headers: &HeaderMap) -> Option<Url> {
    let location = headers.get(LOCATION)?.to_str().ok()?.trim();
    if location.is_empty() {
        return None;
    }
    current.join(location).ok()
}
