//! Field normalization: raw source fields to canonical numeric fields.
//!
//! Every function here is total. Anything unparseable degrades to a sentinel
//! (`0`, or `None` for display-only quantities) instead of failing.

use foundation::geo::GeoPoint;
use serde_json::Value;

use crate::raw::{RawRecord, value_text};

/// A normalized tornado record.
///
/// `raw` keeps the source fields for display; the remaining fields are the
/// canonical values every filter reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub raw: RawRecord,
    pub point: Option<GeoPoint>,
    pub year: Option<i32>,
    /// EF rating 0..=5.
    pub ef: Option<u8>,
    /// Trimmed, upper-cased state code.
    pub state: Option<String>,
    pub damage_usd: f64,
    pub injuries_num: u32,
    pub deaths_num: u32,
    pub length_miles: Option<f64>,
    pub width_yards: Option<f64>,
    pub wind_low_mph: Option<f64>,
    pub wind_high_mph: Option<f64>,
    pub date: Option<String>,
}

pub const MAX_EF: u8 = 5;

/// Normalizes a batch of raw records. The input is left untouched.
pub fn normalize(raw: &[RawRecord]) -> Vec<Record> {
    raw.iter().cloned().map(normalize_record).collect()
}

pub fn normalize_record(raw: RawRecord) -> Record {
    let point = raw.point.filter(|p| p.is_finite());
    let year = raw
        .year
        .as_ref()
        .and_then(coerce_number)
        .and_then(whole_i32);
    let ef = raw
        .ef
        .as_ref()
        .and_then(coerce_number)
        .and_then(whole_i32)
        .and_then(|v| u8::try_from(v).ok())
        .filter(|v| *v <= MAX_EF);
    let state = raw.state.as_deref().and_then(canonical_state);
    let damage_usd = raw
        .damage_property
        .as_deref()
        .map(parse_damage_usd)
        .unwrap_or(0.0);
    let injuries_num = parse_count(raw.injuries.as_ref());
    let deaths_num = parse_count(raw.deaths.as_ref());
    let length_miles = raw.length_miles.as_ref().and_then(coerce_number);
    let width_yards = raw.width_yards.as_ref().and_then(coerce_number);
    let wind_low_mph = raw.wind_low.as_ref().and_then(coerce_number);
    let wind_high_mph = raw.wind_high.as_ref().and_then(coerce_number);
    let date = raw.date.as_deref().and_then(known_text);

    Record {
        raw,
        point,
        year,
        ef,
        state,
        damage_usd,
        injuries_num,
        deaths_num,
        length_miles,
        width_yards,
        wind_low_mph,
        wind_high_mph,
        date,
    }
}

/// Parses a property-damage string such as `"2.5M"`, `"750K"` or `"1200"` into dollars.
///
/// `"0"`, `"NULL"` and blank input are zero. Input that matches neither the
/// suffixed form nor a plain number is zero as well.
pub fn parse_damage_usd(text: &str) -> f64 {
    let t = text.trim();
    if t.is_empty() || t == "0" || t.eq_ignore_ascii_case("null") {
        return 0.0;
    }
    let value = parse_suffixed_amount(t)
        .or_else(|| t.parse::<f64>().ok())
        .unwrap_or(0.0);
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn parse_suffixed_amount(t: &str) -> Option<f64> {
    let last = t.chars().last()?;
    let (amount, multiplier) = match last.to_ascii_uppercase() {
        'K' => (&t[..t.len() - 1], 1e3),
        'M' => (&t[..t.len() - 1], 1e6),
        'B' => (&t[..t.len() - 1], 1e9),
        _ => (t, 1.0),
    };
    let amount = amount.trim_end();
    if !is_plain_decimal(amount) {
        return None;
    }
    amount.parse::<f64>().ok().map(|v| v * multiplier)
}

/// Digits with at most one decimal point, and at least one digit.
fn is_plain_decimal(s: &str) -> bool {
    let mut digits = 0usize;
    let mut dots = 0usize;
    for c in s.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

/// Injury/death count coercion. Absent, non-numeric and negative values are 0.
pub fn parse_count(value: Option<&Value>) -> u32 {
    let Some(v) = value.and_then(coerce_number) else {
        return 0;
    };
    if v <= 0.0 {
        return 0;
    }
    v.round().min(f64::from(u32::MAX)) as u32
}

/// Number-ish coercion: JSON numbers pass through, numeric strings are parsed.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn whole_i32(v: f64) -> Option<i32> {
    if v.fract() != 0.0 || v < f64::from(i32::MIN) || v > f64::from(i32::MAX) {
        return None;
    }
    Some(v as i32)
}

fn canonical_state(text: &str) -> Option<String> {
    known_text(text).map(|s| s.to_ascii_uppercase())
}

/// Trims `text` and drops the placeholder spellings sources use for "missing".
pub fn known_text(text: &str) -> Option<String> {
    let t = text.trim();
    if t.is_empty()
        || t.eq_ignore_ascii_case("null")
        || t.eq_ignore_ascii_case("nan")
        || t == "NaT"
        || t.eq_ignore_ascii_case("unknown")
    {
        return None;
    }
    Some(t.to_string())
}

/// Display text for a number-ish raw field.
pub fn raw_text(value: Option<&Value>) -> Option<String> {
    value.and_then(value_text).and_then(|s| known_text(&s))
}
