use foundation::geo::GeoPoint;
use foundation::ids::RecordId;
use scene::Dataset;
use scene::selection::SelectionSet;

use crate::layer::{HEAT_LAYER, Layer, LayerId, LayerKind, POINTS_LAYER};

/// Heat weight of an EF0 (or unrated) record.
pub const HEAT_WEIGHT_MIN: f64 = 0.1;
/// Heat weight of an EF5 record.
pub const HEAT_WEIGHT_MAX: f64 = 1.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointSample {
    pub id: RecordId,
    pub point: GeoPoint,
    pub ef: Option<u8>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HeatSample {
    pub point: GeoPoint,
    pub weight: f64,
}

/// Linear EF ramp for density weighting. Unrated records weigh as EF0.
pub fn heat_weight(ef: Option<u8>) -> f64 {
    let t = f64::from(ef.unwrap_or(0).min(5)) / 5.0;
    HEAT_WEIGHT_MIN + (HEAT_WEIGHT_MAX - HEAT_WEIGHT_MIN) * t
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PointLayer;

impl PointLayer {
    /// Drawable points for the visible records. Records without a location are skipped.
    pub fn extract(&self, dataset: &Dataset, visible: &SelectionSet) -> Vec<PointSample> {
        visible
            .iter()
            .filter_map(|id| {
                let r = dataset.get(id)?;
                Some(PointSample {
                    id,
                    point: r.point?,
                    ef: r.ef,
                })
            })
            .collect()
    }
}

impl Layer for PointLayer {
    fn id(&self) -> LayerId {
        POINTS_LAYER
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Points
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HeatmapLayer;

impl HeatmapLayer {
    pub fn extract(&self, dataset: &Dataset, visible: &SelectionSet) -> Vec<HeatSample> {
        visible
            .iter()
            .filter_map(|id| {
                let r = dataset.get(id)?;
                Some(HeatSample {
                    point: r.point?,
                    weight: heat_weight(r.ef),
                })
            })
            .collect()
    }
}

impl Layer for HeatmapLayer {
    fn id(&self) -> LayerId {
        HEAT_LAYER
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Heatmap
    }
}
