use std::collections::BTreeMap;
use std::sync::Arc;

use foundation::bounds::Aabb2;
use foundation::ids::RecordId;
use scene::Dataset;
use scene::expr::{ExprError, FilterExpr};
use scene::picking::records_in_region;
use scene::selection::SelectionSet;
use serde_json::Value;

use crate::layer::LayerId;

/// The map renderer as seen from the filter engine.
///
/// Filters cross this seam in their declarative JSON form only.
pub trait MapSurface {
    fn has_layer(&self, layer: LayerId) -> bool;

    /// Replaces the layer's filter and redraws it.
    fn set_filter(&mut self, layer: LayerId, filter: &Value);

    /// Rendered records of `layer` inside `region`, lowest id first.
    fn query_rendered(&self, layer: LayerId, region: Aabb2) -> Vec<RecordId>;
}

#[derive(Debug, Clone, Default)]
struct LayerSlot {
    filter: Option<FilterExpr>,
    visible: SelectionSet,
    redraws: u64,
}

/// Headless map surface that evaluates filters itself.
///
/// Used by the CLI and by tests as the reference renderer: whatever it shows
/// is what the declarative filter selects.
#[derive(Debug, Clone)]
pub struct InMemoryMapSurface {
    dataset: Arc<Dataset>,
    layers: BTreeMap<LayerId, LayerSlot>,
    last_error: Option<ExprError>,
}

impl InMemoryMapSurface {
    /// A surface with the given layers; each starts unfiltered.
    pub fn new(dataset: Arc<Dataset>, layers: &[LayerId]) -> Self {
        let all: SelectionSet = dataset.iter().map(|(id, _)| id).collect();
        let layers = layers
            .iter()
            .map(|id| {
                (
                    *id,
                    LayerSlot {
                        filter: None,
                        visible: all.clone(),
                        redraws: 0,
                    },
                )
            })
            .collect();
        Self {
            dataset,
            layers,
            last_error: None,
        }
    }

    pub fn visible(&self, layer: LayerId) -> Option<&SelectionSet> {
        self.layers.get(&layer).map(|slot| &slot.visible)
    }

    pub fn filter(&self, layer: LayerId) -> Option<&FilterExpr> {
        self.layers
            .get(&layer)
            .and_then(|slot| slot.filter.as_ref())
    }

    pub fn redraws(&self, layer: LayerId) -> u64 {
        self.layers
            .get(&layer)
            .map(|slot| slot.redraws)
            .unwrap_or(0)
    }

    /// Last filter the surface refused to apply.
    pub fn last_error(&self) -> Option<&ExprError> {
        self.last_error.as_ref()
    }
}

impl MapSurface for InMemoryMapSurface {
    fn has_layer(&self, layer: LayerId) -> bool {
        self.layers.contains_key(&layer)
    }

    fn set_filter(&mut self, layer: LayerId, filter: &Value) {
        let Some(slot) = self.layers.get_mut(&layer) else {
            return;
        };
        let expr = match FilterExpr::from_json(filter) {
            Ok(expr) => expr,
            Err(e) => {
                // A rejected filter leaves the previous rendering in place.
                self.last_error = Some(e);
                return;
            }
        };
        slot.visible = self
            .dataset
            .iter()
            .filter(|(_, r)| expr.eval(r))
            .map(|(id, _)| id)
            .collect();
        slot.filter = Some(expr);
        slot.redraws += 1;
    }

    fn query_rendered(&self, layer: LayerId, region: Aabb2) -> Vec<RecordId> {
        let Some(slot) = self.layers.get(&layer) else {
            return Vec::new();
        };
        records_in_region(&self.dataset, &slot.visible, region)
    }
}
