#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

/// Individual tornado points.
pub const POINTS_LAYER: LayerId = LayerId(1);
/// Density rendering of the same records.
pub const HEAT_LAYER: LayerId = LayerId(2);

/// Every layer the filter is pushed to, in redraw order.
pub const FILTERED_LAYERS: [LayerId; 2] = [HEAT_LAYER, POINTS_LAYER];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Points,
    Heatmap,
}

pub trait Layer {
    fn id(&self) -> LayerId;
    fn kind(&self) -> LayerKind;

    fn name(&self) -> &'static str {
        match self.kind() {
            LayerKind::Points => "tornado-points",
            LayerKind::Heatmap => "tornado-heat",
        }
    }
}
