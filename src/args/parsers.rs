use std::time::Duration;

use super::types::PositiveUsize;
use crate::error::ValidationError;

/// Seconds per minute.
const SECS_PER_MIN: u64 = 60;
/// Seconds per hour.
const SECS_PER_HOUR: u64 = 3_600;

pub(crate) fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once(':') {
        Some((key, value)) => {
            let key = key.trim();
            if key.is_empty() {
                return Err(ValidationError::HeaderNameEmpty {
                    value: s.to_owned(),
                });
            }
            Ok((key.to_owned(), value.trim().to_owned()))
        }
        None => Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        }),
    }
}

pub(super) fn parse_positive_usize(s: &str) -> Result<PositiveUsize, ValidationError> {
    s.parse::<PositiveUsize>()
}

/// Parses `1h`, `30s`, `250ms` or compound values such as `1m30s`.
/// A bare number is read as seconds.
pub(crate) fn parse_duration_arg(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let mut total = Duration::ZERO;
    let mut rest = value;
    while !rest.is_empty() {
        let digits_len = rest.chars().take_while(char::is_ascii_digit).count();
        if digits_len == 0 {
            return Err(ValidationError::InvalidDurationFormat {
                value: value.to_owned(),
            });
        }
        let (num_part, tail) = rest.split_at(digits_len);
        let number: u64 =
            num_part
                .parse()
                .map_err(|err| ValidationError::InvalidDurationNumber {
                    value: value.to_owned(),
                    source: err,
                })?;

        let unit_len = tail.chars().take_while(char::is_ascii_alphabetic).count();
        let (unit_part, remainder) = tail.split_at(unit_len);
        let unit = if unit_part.is_empty() {
            if !remainder.is_empty() || rest.len() != value.len() {
                return Err(ValidationError::InvalidDurationFormat {
                    value: value.to_owned(),
                });
            }
            "s"
        } else {
            unit_part
        };

        total = total
            .checked_add(unit_duration(number, unit)?)
            .ok_or(ValidationError::DurationOverflow)?;
        rest = remainder;
    }

    if total.is_zero() {
        return Err(ValidationError::DurationZero);
    }

    Ok(total)
}

fn unit_duration(number: u64, unit: &str) -> Result<Duration, ValidationError> {
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => {
            let secs = number
                .checked_mul(SECS_PER_MIN)
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        "h" => {
            let secs = number
                .checked_mul(SECS_PER_HOUR)
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };
    Ok(duration)
}
