//! `[d.]hh:mm:ss[.fffffff]` duration format used by the health-checks dashboard
//!
//! Fractions are expressed in 100ns ticks, seven digits, and omitted when zero.

use serde::{Deserialize, Deserializer, Serializer};
use std::fmt::Write;
use std::time::Duration;

const NANOS_PER_TICK: u64 = 100;

pub fn format(duration: &Duration) -> String {
    let secs = duration.as_secs();
    let ticks = u64::from(duration.subsec_nanos()) / NANOS_PER_TICK;
    let (days, hours, minutes, seconds) =
        (secs / 86_400, secs % 86_400 / 3_600, secs % 3_600 / 60, secs % 60);

    let mut out = String::new();
    if days > 0 {
        let _ = write!(out, "{}.", days);
    }
    let _ = write!(out, "{:02}:{:02}:{:02}", hours, minutes, seconds);
    if ticks > 0 {
        let _ = write!(out, ".{:07}", ticks);
    }
    out
}

pub fn parse(value: &str) -> Result<Duration, String> {
    let invalid = || format!("invalid timespan '{}'", value);
    let value = value.trim();

    let first_colon = value.find(':').ok_or_else(invalid)?;
    let last_colon = value.rfind(':').ok_or_else(invalid)?;

    let (clock, fraction) = match value.rfind('.') {
        Some(dot) if dot > last_colon => (&value[..dot], Some(&value[dot + 1..])),
        _ => (value, None),
    };
    let (days, clock) = match clock.find('.') {
        Some(dot) if dot < first_colon => {
            (parse_part(&clock[..dot]).ok_or_else(invalid)?, &clock[dot + 1..])
        }
        _ => (0, clock),
    };

    let parts: Vec<u64> = clock
        .split(':')
        .map(parse_part)
        .collect::<Option<_>>()
        .ok_or_else(invalid)?;
    let [hours, minutes, seconds] = parts[..] else {
        return Err(invalid());
    };
    if hours >= 24 || minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    let ticks = match fraction {
        Some(digits) if !digits.is_empty() && digits.len() <= 7 => {
            let scale = 10u64.pow(7 - digits.len() as u32);
            parse_part(digits).ok_or_else(invalid)? * scale
        }
        Some(_) => return Err(invalid()),
        None => 0,
    };

    let secs = days
        .checked_mul(86_400)
        .and_then(|d| d.checked_add(hours * 3_600 + minutes * 60 + seconds))
        .ok_or_else(invalid)?;
    Ok(Duration::from_secs(secs) + Duration::from_nanos(ticks * NANOS_PER_TICK))
}

fn parse_part(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(duration))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let value = String::deserialize(deserializer)?;
    parse(&value).map_err(serde::de::Error::custom)
}
