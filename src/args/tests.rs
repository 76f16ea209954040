use clap::Parser;
use std::time::Duration;

use super::parsers::parse_header;
use super::{HttpMethod, LoadArgs, PositiveU64, parse_duration_arg};

fn parse_from(args: &[&str]) -> Result<LoadArgs, String> {
    LoadArgs::try_parse_from(args.iter().copied())
        .map_err(|err| format!("parse failed: {}", err))
}

#[test]
fn defaults_match_documented_table() -> Result<(), String> {
    let args = parse_from(&["volley", "-u", "http://localhost"])?;
    if !matches!(args.method, HttpMethod::Get) {
        return Err("Expected default method GET".to_owned());
    }
    if args.rate.get() != 10 {
        return Err(format!("Expected default rate 10, got {}", args.rate.get()));
    }
    if args.concurrency.get() != 5 {
        return Err(format!(
            "Expected default concurrency 5, got {}",
            args.concurrency.get()
        ));
    }
    if args.duration != Duration::from_secs(30) {
        return Err(format!("Expected default duration 30s, got {:?}", args.duration));
    }
    Ok(())
}

#[test]
fn url_is_required() -> Result<(), String> {
    if parse_from(&["volley"]).is_ok() {
        return Err("Expected missing URL to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn zero_rate_is_rejected() -> Result<(), String> {
    if parse_from(&["volley", "-u", "http://localhost", "-r", "0"]).is_ok() {
        return Err("Expected rate 0 to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn zero_concurrency_is_rejected() -> Result<(), String> {
    if parse_from(&["volley", "-u", "http://localhost", "-c", "0"]).is_ok() {
        return Err("Expected concurrency 0 to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn negative_rate_is_rejected() -> Result<(), String> {
    if parse_from(&["volley", "-u", "http://localhost", "--rate", "-3"]).is_ok() {
        return Err("Expected negative rate to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn duration_suffixes_parse() -> Result<(), String> {
    let cases = [
        ("500ms", Duration::from_millis(500)),
        ("2s", Duration::from_secs(2)),
        ("15", Duration::from_secs(15)),
        ("3m", Duration::from_secs(180)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed =
            parse_duration_arg(input).map_err(|err| format!("parse '{}' failed: {}", input, err))?;
        if parsed != expected {
            return Err(format!("'{}' parsed to {:?}, expected {:?}", input, parsed, expected));
        }
    }
    Ok(())
}

#[test]
fn zero_duration_is_rejected() -> Result<(), String> {
    if parse_duration_arg("0s").is_ok() {
        return Err("Expected 0s to be rejected".to_owned());
    }
    if parse_duration_arg("0").is_ok() {
        return Err("Expected 0 to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn bad_duration_unit_is_rejected() -> Result<(), String> {
    if parse_duration_arg("10d").is_ok() {
        return Err("Expected unknown unit to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn header_parser_splits_and_trims() -> Result<(), String> {
    let (key, value) =
        parse_header(" X-Token : abc:def ").map_err(|err| format!("parse failed: {}", err))?;
    if key != "X-Token" {
        return Err(format!("Unexpected key: {}", key));
    }
    if value != "abc:def" {
        return Err(format!("Unexpected value: {}", value));
    }
    Ok(())
}

#[test]
fn header_without_colon_is_rejected() -> Result<(), String> {
    if parse_header("NotAHeader").is_ok() {
        return Err("Expected header without colon to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn positive_u64_round_trips() -> Result<(), String> {
    let value = PositiveU64::try_from(7u64).map_err(|err| format!("try_from failed: {}", err))?;
    if u64::from(value) != 7 {
        return Err("Expected round trip through u64".to_owned());
    }
    Ok(())
}
