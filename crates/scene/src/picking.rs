use foundation::bounds::Aabb2;
use foundation::ids::RecordId;

use crate::Dataset;
use crate::selection::SelectionSet;

/// Visible records whose point lies inside `region`, in ascending id order.
///
/// Ordering contract:
/// - When several records overlap, the lowest `RecordId` comes first, so a
///   hover takes the head of the list.
///
/// Records without a location are never hit.
pub fn records_in_region(
    dataset: &Dataset,
    visible: &SelectionSet,
    region: Aabb2,
) -> Vec<RecordId> {
    visible
        .iter()
        .filter(|id| {
            dataset
                .get(*id)
                .and_then(|r| r.point)
                .is_some_and(|p| region.contains(p))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::records_in_region;
    use crate::Dataset;
    use crate::selection::SelectionSet;
    use formats::normalize::normalize;
    use formats::raw::RawRecord;
    use foundation::bounds::Aabb2;
    use foundation::geo::GeoPoint;
    use foundation::ids::RecordId;
    use serde_json::json;

    fn dataset() -> Dataset {
        let empty = json!({});
        let props = empty.as_object().unwrap();
        Dataset::new(normalize(&[
            RawRecord::from_properties(Some(GeoPoint::new(-97.0, 35.0)), props),
            RawRecord::from_properties(Some(GeoPoint::new(-97.05, 35.05)), props),
            RawRecord::from_properties(None, props),
            RawRecord::from_properties(Some(GeoPoint::new(-80.0, 30.0)), props),
        ]))
    }

    fn all_visible(d: &Dataset) -> SelectionSet {
        d.iter().map(|(id, _)| id).collect()
    }

    #[test]
    fn lowest_id_wins_on_overlap() {
        let d = dataset();
        let region = Aabb2::around(GeoPoint::new(-97.02, 35.02), 0.1);
        assert_eq!(
            records_in_region(&d, &all_visible(&d), region),
            vec![RecordId::new(0), RecordId::new(1)]
        );
    }

    #[test]
    fn hidden_records_are_not_hit() {
        let d = dataset();
        let region = Aabb2::around(GeoPoint::new(-97.02, 35.02), 0.1);
        let visible: SelectionSet = [RecordId::new(1), RecordId::new(2)].into_iter().collect();
        let hits = records_in_region(&d, &visible, region);
        assert_eq!(hits, vec![RecordId::new(1)]);
        let none_visible = SelectionSet::new();
        assert!(records_in_region(&d, &none_visible, region).is_empty());
    }
}
