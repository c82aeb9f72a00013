//! Sky coordinate parsing for command-line arguments
//!
//! Positions arrive either as decimal degrees or as sexagesimal strings
//! in the usual notations: `05:34:31.9`, `5h34m31.9s`, `+22 00 52`,
//! `83d37m58.7s`. Colon- and space-separated right ascensions follow the
//! convention of being hours; a `d` marker makes them degrees.

use anyhow::{anyhow, bail, Result};
use regex::Regex;
use std::sync::OnceLock;

#[allow(clippy::unwrap_used)]
fn sexagesimal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^\s*([+-])?\s*(\d{1,3})[hHdD:\s]\s*(\d{1,2}(?:\.\d+)?)(?:['mM:\s]\s*(\d{1,2}(?:\.\d+)?)["sS]?)?['mM]?\s*$"#,
        )
        .unwrap()
    })
}

struct Sexagesimal {
    sign: f64,
    primary: f64,
    minutes: f64,
    seconds: f64,
    degrees_marked: bool,
    hours_marked: bool,
}

fn parse_sexagesimal(input: &str) -> Option<Sexagesimal> {
    let caps = sexagesimal_re().captures(input)?;
    let sign = match caps.get(1).map(|m| m.as_str()) {
        Some("-") => -1.0,
        _ => 1.0,
    };
    let primary: f64 = caps[2].parse().ok()?;
    let minutes: f64 = caps[3].parse().ok()?;
    let seconds: f64 = match caps.get(4) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0.0,
    };
    if minutes >= 60.0 || seconds >= 60.0 {
        return None;
    }
    let lower = input.to_ascii_lowercase();
    Some(Sexagesimal {
        sign,
        primary,
        minutes,
        seconds,
        degrees_marked: lower.contains('d'),
        hours_marked: lower.contains('h'),
    })
}

fn to_degrees(sex: &Sexagesimal) -> f64 {
    sex.sign * (sex.primary + sex.minutes / 60.0 + sex.seconds / 3600.0)
}

/// Parse a right ascension, returning decimal degrees
pub fn parse_ra(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        if !value.is_finite() {
            bail!("right ascension must be finite: {input}");
        }
        return Ok(value);
    }
    let sex = parse_sexagesimal(trimmed)
        .ok_or_else(|| anyhow!("cannot parse right ascension: {input}"))?;
    let value = to_degrees(&sex);
    if sex.degrees_marked {
        Ok(value)
    } else {
        Ok(value * 15.0)
    }
}

/// Parse a declination, returning decimal degrees
pub fn parse_dec(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        if !value.is_finite() {
            bail!("declination must be finite: {input}");
        }
        return Ok(value);
    }
    let sex =
        parse_sexagesimal(trimmed).ok_or_else(|| anyhow!("cannot parse declination: {input}"))?;
    if sex.hours_marked {
        bail!("declination is measured in degrees, not hours: {input}");
    }
    Ok(to_degrees(&sex))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_decimal_degrees_pass_through() {
        assert!(close(parse_ra("83.633").unwrap(), 83.633));
        assert!(close(parse_dec("-22.0145").unwrap(), -22.0145));
    }

    #[test]
    fn test_ra_colons_are_hours() {
        let want = (5.0 + 34.0 / 60.0 + 31.9 / 3600.0) * 15.0;
        assert!(close(parse_ra("05:34:31.9").unwrap(), want));
        assert!(close(parse_ra("5h34m31.9s").unwrap(), want));
        assert!(close(parse_ra("05 34 31.9").unwrap(), want));
    }

    #[test]
    fn test_ra_degree_marker() {
        let want = 83.0 + 37.0 / 60.0 + 58.7 / 3600.0;
        assert!(close(parse_ra("83d37m58.7s").unwrap(), want));
    }

    #[test]
    fn test_dec_is_degrees() {
        let want = 22.0 + 52.0 / 3600.0;
        assert!(close(parse_dec("+22:00:52").unwrap(), want));
        assert!(close(parse_dec("-05 30 00").unwrap(), -5.5));
        assert!(close(parse_dec("22d30m").unwrap(), 22.5));
    }

    #[test]
    fn test_rejects_nonsense() {
        assert!(parse_ra("not a coord").is_err());
        assert!(parse_ra("10:75:00").is_err());
        assert!(parse_dec("5h30m").is_err());
        assert!(parse_dec("NaN").is_err());
    }
}
