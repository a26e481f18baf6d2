//! HTTP transport construction and single-request execution.
mod client;
mod executor;

#[cfg(test)]
mod tests;

pub use client::{ClientSettings, build_client, new_cookie_jar};
pub use executor::{RedirectPolicy, RequestExecutor, RequestTemplate};
