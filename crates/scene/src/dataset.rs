use std::collections::BTreeSet;

use formats::normalize::Record;
use foundation::ids::RecordId;

/// The in-memory, read-only record store for a session.
///
/// Records are addressed by dense [`RecordId`]s assigned in load order.
#[derive(Debug, Default, Clone)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id.index() as usize)
    }

    /// Iterates records in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &Record)> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(idx, r)| (RecordId::new(idx as u32), r))
    }

    /// Sorted, distinct canonical state codes present in the data.
    pub fn state_codes(&self) -> Vec<String> {
        let codes: BTreeSet<&str> = self
            .records
            .iter()
            .filter_map(|r| r.state.as_deref())
            .collect();
        codes.into_iter().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Dataset;
    use formats::normalize::normalize;
    use formats::raw::RawRecord;
    use foundation::ids::RecordId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn dataset() -> Dataset {
        let raws: Vec<RawRecord> = [
            json!({ "year": 1990, "state": "ks" }),
            json!({ "year": 1955, "state": "TX" }),
            json!({ "year": "x", "state": "KS" }),
            json!({ "year": 2020 }),
        ]
        .iter()
        .map(|p| RawRecord::from_properties(None, p.as_object().unwrap()))
        .collect();
        Dataset::new(normalize(&raws))
    }

    #[test]
    fn state_codes_are_sorted_and_distinct() {
        let d = dataset();
        assert_eq!(d.state_codes(), vec!["KS".to_string(), "TX".to_string()]);
    }

    #[test]
    fn ids_follow_load_order() {
        let d = dataset();
        let ids: Vec<u32> = d.iter().map(|(id, _)| id.index()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(d.get(RecordId::new(1)).and_then(|r| r.year), Some(1955));
        assert!(d.get(RecordId::new(9)).is_none());
    }
}
