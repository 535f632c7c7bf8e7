use formats::normalize::MAX_EF;
use scene::Dataset;
use scene::query::Predicate;

use crate::chart::Bucket;

const BINS: usize = MAX_EF as usize + 1;

/// Record counts per EF rating.
///
/// Only records matching the full predicate are counted (window, EF, state
/// and brackets), so the histogram agrees with the map rather than counting
/// everything in the year window. Unrated records fall outside every bin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct EfHistogram {
    counts: [u32; BINS],
}

impl EfHistogram {
    pub fn build(dataset: &Dataset, predicate: &Predicate) -> Self {
        let mut counts = [0u32; BINS];
        for (_, r) in dataset.iter() {
            let Some(ef) = r.ef else { continue };
            if predicate.matches(r) {
                counts[usize::from(ef)] += 1;
            }
        }
        Self { counts }
    }

    /// Buckets for EF0..=EF5 in order, including empty ones.
    pub fn buckets(&self) -> Vec<Bucket> {
        self.counts
            .iter()
            .enumerate()
            .map(|(ef, &count)| Bucket {
                key: ef as i32,
                count,
                highlighted: false,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::EfHistogram;
    use formats::normalize::normalize;
    use formats::raw::RawRecord;
    use foundation::years::YearRange;
    use pretty_assertions::assert_eq;
    use scene::Dataset;
    use scene::query::compile_predicate;
    use scene::state::{FilterState, StateFilter};
    use serde_json::json;

    fn dataset() -> Dataset {
        let raws: Vec<RawRecord> = [
            json!({ "year": 2000, "ef": 1, "state": "TX" }),
            json!({ "year": 2000, "ef": 1 }),
            json!({ "year": 2000, "ef": 4, "state": "TX" }),
            json!({ "year": 2000 }),
            json!({ "year": 1980, "ef": 1 }),
        ]
        .iter()
        .map(|p| RawRecord::from_properties(None, p.as_object().unwrap()))
        .collect();
        Dataset::new(normalize(&raws))
    }

    #[test]
    fn counts_matching_records_per_rating() {
        let d = dataset();
        let h = EfHistogram::build(&d, &compile_predicate(&FilterState::default()));
        let counts: Vec<u32> = h.buckets().iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![0, 2, 0, 0, 1, 0]);
    }

    #[test]
    fn follows_the_year_window() {
        let d = dataset();
        let state = FilterState::with_range(YearRange::new(1950, 2025));
        let h = EfHistogram::build(&d, &compile_predicate(&state));
        assert_eq!(h.buckets()[1].count, 3);
    }

    #[test]
    fn counts_only_what_the_map_shows() {
        let d = dataset();
        let mut state = FilterState::default();
        state.state = StateFilter::Code("TX".into());
        let h = EfHistogram::build(&d, &compile_predicate(&state));
        let counts: Vec<u32> = h.buckets().iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![0, 1, 0, 0, 1, 0]);
    }
}
