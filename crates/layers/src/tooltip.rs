use formats::normalize::{Record, known_text, raw_text};
use serde::Serialize;

pub const UNKNOWN: &str = "Unknown";

/// Hover display strings for one record. Missing values read "Unknown".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TooltipText {
    pub state: String,
    pub date: String,
    pub ef: String,
    pub wind: String,
    pub length: String,
    pub width: String,
    pub injuries: String,
    pub deaths: String,
    pub damage: String,
}

impl TooltipText {
    pub fn from_record(record: &Record) -> Self {
        let ef = record
            .raw
            .ef_display
            .as_deref()
            .and_then(known_text)
            .or_else(|| record.ef.map(|ef| format!("EF{ef}")));
        let wind = match (record.wind_low_mph, record.wind_high_mph) {
            (Some(lo), Some(hi)) => Some(format!("{lo}–{hi} mph")),
            _ => None,
        };
        let width = record
            .width_yards
            .map(|w| format!("{} yd", w.round() as i64));

        Self {
            state: or_unknown(record.state.clone()),
            date: or_unknown(record.date.clone()),
            ef: or_unknown(ef),
            wind: or_unknown(wind),
            length: or_unknown(record.length_miles.map(|l| format!("{l:.1} mi"))),
            width: or_unknown(width),
            injuries: or_unknown(raw_text(record.raw.injuries.as_ref())),
            deaths: or_unknown(raw_text(record.raw.deaths.as_ref())),
            damage: or_unknown(record.raw.damage_property.as_deref().and_then(known_text)),
        }
    }
}

fn or_unknown(v: Option<String>) -> String {
    v.unwrap_or_else(|| UNKNOWN.to_string())
}
