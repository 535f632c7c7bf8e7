use foundation::years::{YearDomain, YearRange};
use scene::Dataset;

use crate::chart::Bucket;

/// Per-year record counts over the whole domain.
///
/// Built once per dataset; filters never change the counts. Only the
/// highlight of each bar follows the committed window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearTimeline {
    domain: YearDomain,
    counts: Vec<u32>,
}

impl YearTimeline {
    pub fn build(dataset: &Dataset, domain: YearDomain) -> Self {
        let mut counts = vec![0u32; domain.len()];
        for (_, r) in dataset.iter() {
            let Some(year) = r.year else { continue };
            if year < domain.min || year > domain.max {
                continue;
            }
            counts[(year - domain.min) as usize] += 1;
        }
        Self { domain, counts }
    }

    /// One bar per domain year; bars inside `range` are highlighted.
    pub fn bars(&self, range: YearRange) -> Vec<Bucket> {
        self.domain
            .years()
            .zip(self.counts.iter())
            .map(|(year, &count)| Bucket {
                key: year,
                count,
                highlighted: range.contains(year),
            })
            .collect()
    }
}
