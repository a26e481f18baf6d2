use std::time::Duration;

use reqwest::{
    StatusCode, Url,
    header::{HeaderMap, HeaderValue, LOCATION},
};

use super::executor::{AbandonReason, HopDecision, RedirectWalk, redirect_target};
use super::*;
use crate::args::HttpMethod;

fn url(value: &str) -> Result<Url, String> {
    Url::parse(value).map_err(|err| format!("bad test url '{}': {}", value, err))
}

fn location(value: &str) -> Result<HeaderMap, String> {
    let mut headers = HeaderMap::new();
    let header_value =
        HeaderValue::from_str(value).map_err(|err| format!("bad location: {}", err))?;
    headers.insert(LOCATION, header_value);
    Ok(headers)
}

#[test]
fn redirect_target_resolves_relative_and_absolute() -> Result<(), String> {
    let current = url("http://example.test/a/b?x=1")?;

    let relative = redirect_target(&current, &location("c")?);
    if relative != Some(url("http://example.test/a/c")?) {
        return Err(format!("Unexpected relative target: {:?}", relative));
    }

    let rooted = redirect_target(&current, &location("/login")?);
    if rooted != Some(url("http://example.test/login")?) {
        return Err(format!("Unexpected rooted target: {:?}", rooted));
    }

    let absolute = redirect_target(&current, &location("https://other.test/next")?);
    if absolute != Some(url("https://other.test/next")?) {
        return Err(format!("Unexpected absolute target: {:?}", absolute));
    }
    Ok(())
}

#[test]
fn redirect_target_rejects_missing_or_malformed_location() -> Result<(), String> {
    let current = url("http://example.test/")?;
    if redirect_target(&current, &HeaderMap::new()).is_some() {
        return Err("Expected no target without Location".to_owned());
    }
    if redirect_target(&current, &location("   ")?).is_some() {
        return Err("Expected no target for a blank Location".to_owned());
    }
    if redirect_target(&current, &location("http://[::1")?).is_some() {
        return Err("Expected no target for a malformed Location".to_owned());
    }
    Ok(())
}

#[test]
fn walk_completes_without_following() -> Result<(), String> {
    let current = url("http://example.test/")?;
    let mut walk = RedirectWalk::new(RedirectPolicy::disabled());
    let decision = walk.decide(StatusCode::FOUND, &current, &location("/next")?);
    if decision != HopDecision::Complete {
        return Err(format!("Expected completion, got {:?}", decision));
    }

    let mut walk = RedirectWalk::new(RedirectPolicy::follow(3));
    let decision = walk.decide(StatusCode::OK, &current, &HeaderMap::new());
    if decision != HopDecision::Complete {
        return Err(format!("Expected completion on 200, got {:?}", decision));
    }
    Ok(())
}

#[test]
fn walk_counts_hops_up_to_budget() -> Result<(), String> {
    let current = url("http://example.test/start")?;
    let headers = location("/again")?;
    let mut walk = RedirectWalk::new(RedirectPolicy::follow(2));

    for expected_hops in 1..=2 {
        let decision = walk.decide(StatusCode::MOVED_PERMANENTLY, &current, &headers);
        if decision != HopDecision::Follow(url("http://example.test/again")?) {
            return Err(format!("Hop {}: unexpected {:?}", expected_hops, decision));
        }
        if walk.hops() != expected_hops {
            return Err(format!("Expected {} hops, got {}", expected_hops, walk.hops()));
        }
    }

    let decision = walk.decide(StatusCode::TEMPORARY_REDIRECT, &current, &headers);
    if decision != HopDecision::Abandon(AbandonReason::BudgetExhausted) {
        return Err(format!("Expected budget exhaustion, got {:?}", decision));
    }
    Ok(())
}

#[test]
fn walk_with_zero_budget_abandons_first_redirect() -> Result<(), String> {
    let current = url("http://example.test/")?;
    let mut walk = RedirectWalk::new(RedirectPolicy::follow(0));
    let decision = walk.decide(StatusCode::SEE_OTHER, &current, &location("/x")?);
    if decision != HopDecision::Abandon(AbandonReason::BudgetExhausted) {
        return Err(format!("Expected budget exhaustion, got {:?}", decision));
    }
    Ok(())
}

#[test]
fn walk_abandons_redirect_without_location() -> Result<(), String> {
    let current = url("http://example.test/")?;
    let mut walk = RedirectWalk::new(RedirectPolicy::follow(1));
    let decision = walk.decide(StatusCode::FOUND, &current, &HeaderMap::new());
    if decision != HopDecision::Abandon(AbandonReason::MissingLocation) {
        return Err(format!("Expected missing location, got {:?}", decision));
    }
    if walk.hops() != 0 {
        return Err("A failed hop must not be counted".to_owned());
    }
    Ok(())
}

#[test]
fn template_keeps_repeated_headers() -> Result<(), String> {
    let headers = vec![
        ("Accept".to_owned(), "text/html".to_owned()),
        ("Accept".to_owned(), "application/json".to_owned()),
        ("X-Trace".to_owned(), "abc".to_owned()),
    ];
    let template = RequestTemplate::new(HttpMethod::Put, url("http://example.test/")?, &headers)
        .map_err(|err| format!("{}", err))?;
    if template.method != reqwest::Method::PUT {
        return Err(format!("Unexpected method: {}", template.method));
    }
    let accept: Vec<&HeaderValue> = template.headers.get_all("accept").iter().collect();
    if accept.len() != 2 {
        return Err(format!("Expected two Accept values, got {:?}", accept));
    }
    Ok(())
}

#[test]
fn template_rejects_invalid_header_name_and_value() -> Result<(), String> {
    let target = url("http://example.test/")?;
    let bad_name = vec![("Bad Name".to_owned(), "v".to_owned())];
    if RequestTemplate::new(HttpMethod::Get, target.clone(), &bad_name).is_ok() {
        return Err("Expected invalid header name to be rejected".to_owned());
    }
    let bad_value = vec![("X-Ok".to_owned(), "line\nbreak".to_owned())];
    if RequestTemplate::new(HttpMethod::Get, target, &bad_value).is_ok() {
        return Err("Expected invalid header value to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn build_client_accepts_all_settings() -> Result<(), String> {
    let settings = ClientSettings {
        keep_alive: false,
        request_timeout: Some(Duration::from_secs(5)),
        connect_timeout: Duration::from_secs(1),
    };
    build_client(&settings, None).map_err(|err| format!("{}", err))?;
    build_client(&settings, Some(new_cookie_jar())).map_err(|err| format!("{}", err))?;
    Ok(())
}
