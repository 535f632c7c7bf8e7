use foundation::ids::RecordId;

/// Records that pass the current filter, one bit per [`RecordId`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    words: Vec<u64>,
    len: usize,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: RecordId) -> bool {
        let (slot, mask) = locate(id);
        self.words.get(slot).is_some_and(|w| w & mask != 0)
    }

    /// Adds `id`, growing the bitset as needed. `false` if it was already in.
    pub fn insert(&mut self, id: RecordId) -> bool {
        let (slot, mask) = locate(id);
        if slot >= self.words.len() {
            self.words.resize(slot + 1, 0);
        }
        let fresh = self.words[slot] & mask == 0;
        self.words[slot] |= mask;
        self.len += usize::from(fresh);
        fresh
    }

    /// Members of `self` that are not in `other`.
    pub fn diff(&self, other: &Self) -> Self {
        let words: Vec<u64> = self
            .words
            .iter()
            .enumerate()
            .map(|(slot, w)| w & !other.words.get(slot).copied().unwrap_or(0))
            .collect();
        let len = words.iter().map(|w| w.count_ones() as usize).sum();
        Self { words, len }
    }

    /// Ascending ids.
    pub fn iter(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.words.iter().enumerate().flat_map(|(slot, &word)| {
            let base = slot as u32 * 64;
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros();
                rest &= rest - 1;
                Some(RecordId::new(base + bit))
            })
        })
    }
}

impl FromIterator<RecordId> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = RecordId>>(iter: I) -> Self {
        let mut set = SelectionSet::new();
        iter.into_iter().for_each(|id| {
            set.insert(id);
        });
        set
    }
}

fn locate(id: RecordId) -> (usize, u64) {
    let index = id.index();
    ((index / 64) as usize, 1u64 << (index % 64))
}
