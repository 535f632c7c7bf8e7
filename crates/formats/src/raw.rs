use foundation::geo::GeoPoint;
use serde_json::{Map, Value};

/// One tornado record exactly as the source carried it.
///
/// Numeric-ish properties stay as JSON values because the source mixes
/// numbers, numeric strings and `null`. Text properties are stringified.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    pub point: Option<GeoPoint>,
    pub year: Option<Value>,
    pub ef: Option<Value>,
    pub ef_display: Option<String>,
    pub state: Option<String>,
    pub damage_property: Option<String>,
    pub injuries: Option<Value>,
    pub deaths: Option<Value>,
    pub length_miles: Option<Value>,
    pub width_yards: Option<Value>,
    pub date: Option<String>,
    pub wind_low: Option<Value>,
    pub wind_high: Option<Value>,
}

impl RawRecord {
    /// Picks the known keys out of a GeoJSON `properties` object.
    ///
    /// Unknown keys are ignored; JSON `null` is treated as absent.
    pub fn from_properties(point: Option<GeoPoint>, props: &Map<String, Value>) -> Self {
        Self {
            point,
            year: value_prop(props, "year"),
            ef: value_prop(props, "ef"),
            ef_display: text_prop(props, "ef_display"),
            state: text_prop(props, "state"),
            damage_property: text_prop(props, "damage_property"),
            injuries: value_prop(props, "injuries"),
            deaths: value_prop(props, "deaths"),
            length_miles: value_prop(props, "length_miles"),
            width_yards: value_prop(props, "width_yards"),
            date: text_prop(props, "date"),
            wind_low: value_prop(props, "wind_low"),
            wind_high: value_prop(props, "wind_high"),
        }
    }
}

fn value_prop(props: &Map<String, Value>, key: &str) -> Option<Value> {
    match props.get(key) {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.clone()),
    }
}

fn text_prop(props: &Map<String, Value>, key: &str) -> Option<String> {
    props.get(key).and_then(value_text)
}

/// Display text of a scalar JSON value. Arrays, objects and `null` have none.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::RawRecord;
    use serde_json::json;

    #[test]
    fn picks_known_keys_and_drops_nulls() {
        let props = json!({
            "year": 2011,
            "ef": null,
            "state": "AL",
            "damage_property": "1.5B",
            "injuries": "1500",
            "extra": "ignored"
        });
        let raw = RawRecord::from_properties(None, props.as_object().unwrap());
        assert_eq!(raw.year, Some(json!(2011)));
        assert_eq!(raw.ef, None);
        assert_eq!(raw.state.as_deref(), Some("AL"));
        assert_eq!(raw.damage_property.as_deref(), Some("1.5B"));
        assert_eq!(raw.injuries, Some(json!("1500")));
        assert_eq!(raw.deaths, None);
    }

    #[test]
    fn numeric_text_fields_are_stringified() {
        let props = json!({ "damage_property": 0, "state": 48 });
        let raw = RawRecord::from_properties(None, props.as_object().unwrap());
        assert_eq!(raw.damage_property.as_deref(), Some("0"));
        assert_eq!(raw.state.as_deref(), Some("48"));
    }
}
