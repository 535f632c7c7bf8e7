use std::fs;
use std::path::{Path, PathBuf};

use crate::geojson::{RecordChunk, RecordChunkError, SkippedFeature};
use crate::normalize::{Record, normalize};

/// Normalized records plus load-time bookkeeping.
#[derive(Debug, Clone)]
pub struct LoadedRecords {
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedFeature>,
    /// blake3 hex digest of the source payload.
    pub fingerprint: String,
}

#[derive(Debug)]
pub enum DatasetLoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: RecordChunkError,
    },
}

impl std::fmt::Display for DatasetLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetLoadError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            DatasetLoadError::Parse { path, source } => {
                write!(f, "failed to parse {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DatasetLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetLoadError::Io { source, .. } => Some(source),
            DatasetLoadError::Parse { source, .. } => Some(source),
        }
    }
}

pub fn load_records_from_path(path: impl AsRef<Path>) -> Result<LoadedRecords, DatasetLoadError> {
    let path = path.as_ref();
    let payload = fs::read_to_string(path).map_err(|e| DatasetLoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_records_from_str(&payload).map_err(|e| DatasetLoadError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Parses and normalizes a GeoJSON payload. Normalization runs exactly once here.
pub fn load_records_from_str(payload: &str) -> Result<LoadedRecords, RecordChunkError> {
    let fingerprint = blake3::hash(payload.as_bytes()).to_hex().to_string();
    let chunk = RecordChunk::from_geojson_str(payload)?;
    Ok(LoadedRecords {
        records: normalize(&chunk.records),
        skipped: chunk.skipped,
        fingerprint,
    })
}

#[cfg(test)]
mod tests {
    use super::{DatasetLoadError, load_records_from_path};
    use std::io::Write;

    const PAYLOAD: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature",
              "geometry": { "type": "Point", "coordinates": [-101.9, 33.6] },
              "properties": { "year": 1970, "ef": 5, "state": "TX", "damage_property": "250M", "deaths": "26" } }
        ]
    }"#;

    #[test]
    fn loads_and_normalizes_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(PAYLOAD.as_bytes()).expect("write");

        let loaded = load_records_from_path(file.path()).expect("load");
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].damage_usd, 250_000_000.0);
        assert_eq!(loaded.records[0].deaths_num, 26);
        assert_eq!(loaded.fingerprint.len(), 64);
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = super::load_records_from_str(PAYLOAD).unwrap();
        let b = super::load_records_from_str(PAYLOAD).unwrap();
        let c = super::load_records_from_str(&PAYLOAD.replace("1970", "1971")).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_ne!(a.fingerprint, c.fingerprint);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_records_from_path("/definitely/not/here.geojson").unwrap_err();
        assert!(matches!(err, DatasetLoadError::Io { .. }));
        assert!(err.to_string().contains("not/here.geojson"));
    }
}
