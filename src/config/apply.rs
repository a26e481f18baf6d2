use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveUsize, RunArgs, parse_header};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments.
///
/// Values given on the command line win; a config value only replaces an
/// argument that still holds its default.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(args: &mut RunArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        let mut parsed = Vec::with_capacity(headers.len());
        for header in headers {
            parsed.push(
                parse_header(header)
                    .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))?,
            );
        }
        args.headers = parsed;
    }

    if !is_cli(matches, "user_agent")
        && let Some(user_agent) = config.useragent.clone()
    {
        args.user_agent = Some(user_agent);
    }

    if !is_cli(matches, "ip_address")
        && let Some(ip_address) = config.ip_address.as_deref()
    {
        let parsed = ip_address.trim().parse().map_err(|_parse_err| {
            invalid_value(
                "ip_address",
                ValidationError::InvalidIpAddress {
                    value: ip_address.to_owned(),
                },
            )
        })?;
        args.ip_address = Some(parsed);
    }

    if !is_cli(matches, "concurrency")
        && let Some(concurrency) = config.concurrency
    {
        args.concurrency = PositiveUsize::try_from(concurrency)
            .map_err(|err| invalid_value("concurrency", err))?;
    }

    if !is_cli(matches, "duration")
        && let Some(duration) = config.duration.as_ref()
    {
        args.duration = duration
            .to_duration()
            .map_err(|err| invalid_value("duration", err))?;
    }

    if !is_cli(matches, "keep_alive")
        && let Some(keep_alive) = config.keep_alive
    {
        args.keep_alive = keep_alive;
    }

    if !is_cli(matches, "follow_redirects")
        && let Some(location) = config.location
    {
        args.follow_redirects = location;
    }

    if !is_cli(matches, "max_redirects")
        && let Some(max_redirects) = config.max_redirects
    {
        args.max_redirects = max_redirects;
    }

    if !is_cli(matches, "cookie_jar")
        && let Some(cookie_jar) = config.cookie_jar
    {
        args.cookie_jar = cookie_jar;
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = Some(
            timeout
                .to_duration()
                .map_err(|err| invalid_value("timeout", err))?,
        );
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = timeout
            .to_duration()
            .map_err(|err| invalid_value("connect_timeout", err))?;
    }

    if !is_cli(matches, "output_format")
        && let Some(output_format) = config.output_format
    {
        args.output_format = output_format;
    }

    if !is_cli(matches, "no_progress")
        && let Some(no_progress) = config.no_progress
    {
        args.no_progress = no_progress;
    }

    if !is_cli(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn invalid_value(field: &'static str, source: ValidationError) -> AppError {
    AppError::config(ConfigError::InvalidValue { field, source })
}
