/// Stable index of a record inside a loaded dataset.
///
/// Ids are assigned densely in load order, so they double as bitset indices.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub u32);

impl RecordId {
    pub fn new(index: u32) -> Self {
        RecordId(index)
    }

    pub fn index(&self) -> u32 {
        self.0
    }
}
