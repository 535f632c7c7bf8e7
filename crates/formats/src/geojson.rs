use foundation::geo::GeoPoint;
use serde_json::Value;

use crate::raw::RawRecord;

/// Raw records read from one GeoJSON FeatureCollection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordChunk {
    pub records: Vec<RawRecord>,
    /// Features that could not become records, in source order.
    pub skipped: Vec<SkippedFeature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFeature {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug)]
pub enum RecordChunkError {
    Json(serde_json::Error),
    NotAFeatureCollection,
}

impl std::fmt::Display for RecordChunkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordChunkError::Json(e) => write!(f, "JSON parse error: {e}"),
            RecordChunkError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
        }
    }
}

impl std::error::Error for RecordChunkError {}

impl RecordChunk {
    pub fn from_geojson_str(payload: &str) -> Result<Self, RecordChunkError> {
        let value: Value = serde_json::from_str(payload).map_err(RecordChunkError::Json)?;
        Self::from_geojson_value(&value)
    }

    /// Reads every feature of a FeatureCollection.
    ///
    /// Only the collection shape is fatal. A feature that is not an object, or
    /// whose geometry is unusable, is recorded in `skipped` and loading goes on.
    /// Point features use their coordinate; LineString tracks use their first vertex.
    pub fn from_geojson_value(value: &Value) -> Result<Self, RecordChunkError> {
        let obj = value
            .as_object()
            .ok_or(RecordChunkError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(RecordChunkError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(RecordChunkError::NotAFeatureCollection);
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(RecordChunkError::NotAFeatureCollection)?;

        let mut chunk = RecordChunk {
            records: Vec::with_capacity(features_val.len()),
            skipped: Vec::new(),
        };
        for (index, feat_val) in features_val.iter().enumerate() {
            match parse_feature(feat_val) {
                Ok(raw) => chunk.records.push(raw),
                Err(reason) => chunk.skipped.push(SkippedFeature { index, reason }),
            }
        }
        Ok(chunk)
    }
}

fn parse_feature(value: &Value) -> Result<RawRecord, String> {
    let feat_obj = value
        .as_object()
        .ok_or("feature must be an object".to_string())?;

    let feat_type = feat_obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("feature missing type".to_string())?;
    if feat_type != "Feature" {
        return Err(format!("unexpected feature type: {feat_type}"));
    }

    let point = match feat_obj.get("geometry") {
        None | Some(Value::Null) => None,
        Some(geometry) => Some(parse_anchor_point(geometry)?),
    };

    let empty = serde_json::Map::new();
    let props = feat_obj
        .get("properties")
        .and_then(|v| v.as_object())
        .unwrap_or(&empty);

    Ok(RawRecord::from_properties(point, props))
}

fn parse_anchor_point(value: &Value) -> Result<GeoPoint, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;
    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Point" => parse_point(coords),
        "LineString" => {
            let first = coords
                .as_array()
                .and_then(|a| a.first())
                .ok_or("LineString must have at least one vertex".to_string())?;
            parse_point(first)
        }
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_point(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("Point coordinates must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("Point coordinates must have [lon, lat]".to_string());
    }
    let lon = arr[0]
        .as_f64()
        .ok_or("Point lon must be a number".to_string())?;
    let lat = arr[1]
        .as_f64()
        .ok_or("Point lat must be a number".to_string())?;
    Ok(GeoPoint::new(lon, lat))
}

#[cfg(test)]
mod tests {
    use super::{RecordChunk, RecordChunkError};
    use foundation::geo::GeoPoint;
    use serde_json::json;

    #[test]
    fn reads_points_and_tracks() {
        let payload = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [-97.5, 35.3] },
                    "properties": { "year": 1999, "ef": 5, "state": "OK" }
                },
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[-87.6, 33.2], [-86.8, 33.5]]
                    },
                    "properties": { "year": 2011, "ef": 4, "state": "AL" }
                }
            ]
        });
        let chunk = RecordChunk::from_geojson_value(&payload).expect("parse chunk");
        assert_eq!(chunk.records.len(), 2);
        assert!(chunk.skipped.is_empty());
        assert_eq!(chunk.records[0].point, Some(GeoPoint::new(-97.5, 35.3)));
        assert_eq!(chunk.records[1].point, Some(GeoPoint::new(-87.6, 33.2)));
    }

    #[test]
    fn bad_features_are_skipped_not_fatal() {
        let payload = json!({
            "type": "FeatureCollection",
            "features": [
                42,
                {
                    "type": "Feature",
                    "geometry": { "type": "Polygon", "coordinates": [] },
                    "properties": {}
                },
                { "type": "Feature", "geometry": null, "properties": { "year": 1953 } }
            ]
        });
        let chunk = RecordChunk::from_geojson_value(&payload).expect("parse chunk");
        assert_eq!(chunk.records.len(), 1);
        assert_eq!(chunk.records[0].point, None);
        let skipped: Vec<usize> = chunk.skipped.iter().map(|s| s.index).collect();
        assert_eq!(skipped, vec![0, 1]);
    }

    #[test]
    fn rejects_non_collections() {
        let err = RecordChunk::from_geojson_str(r#"{"type":"Feature"}"#).unwrap_err();
        assert!(matches!(err, RecordChunkError::NotAFeatureCollection));
        let err = RecordChunk::from_geojson_str("{not json").unwrap_err();
        assert!(matches!(err, RecordChunkError::Json(_)));
    }
}
