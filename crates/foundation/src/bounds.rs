use crate::geo::GeoPoint;

/// Axis-aligned lon/lat box (degrees), inclusive on all edges.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 {
            min: [min[0].min(max[0]), min[1].min(max[1])],
            max: [min[0].max(max[0]), min[1].max(max[1])],
        }
    }

    /// Square hit box of `half_extent_deg` around `center`.
    pub fn around(center: GeoPoint, half_extent_deg: f64) -> Self {
        let h = half_extent_deg.abs();
        Aabb2::new(
            [center.lon_deg - h, center.lat_deg - h],
            [center.lon_deg + h, center.lat_deg + h],
        )
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lon_deg >= self.min[0]
            && p.lon_deg <= self.max[0]
            && p.lat_deg >= self.min[1]
            && p.lat_deg <= self.max[1]
    }
}
