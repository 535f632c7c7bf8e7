//! Year primitives shared by the filter state, playback and charts.

/// First year covered by the tornado record domain.
pub const MIN_YEAR: i32 = 1950;
/// Last year covered by the tornado record domain.
pub const MAX_YEAR: i32 = 2025;

/// Closed year interval `[start, end]` with `start <= end`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    /// Builds a range, swapping the bounds if they arrive reversed.
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn single(year: i32) -> Self {
        Self {
            start: year,
            end: year,
        }
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    /// `end - start`; zero for a one-year window.
    pub fn width(&self) -> i32 {
        self.end - self.start
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }
}

/// The closed interval of years a session may select.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct YearDomain {
    pub min: i32,
    pub max: i32,
}

impl Default for YearDomain {
    fn default() -> Self {
        Self {
            min: MIN_YEAR,
            max: MAX_YEAR,
        }
    }
}

impl YearDomain {
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn clamp(&self, year: i32) -> i32 {
        year.clamp(self.min, self.max)
    }

    pub fn full_range(&self) -> YearRange {
        YearRange::new(self.min, self.max)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.min..=self.max
    }

    pub fn len(&self) -> usize {
        (self.max - self.min) as usize + 1
    }

    /// Normalizes a pair of candidate bounds into a valid range.
    ///
    /// Returns `None` if either input is not finite. Otherwise both values are
    /// rounded to whole years, clamped into the domain and ordered.
    pub fn normalize_range(&self, start: f64, end: f64) -> Option<YearRange> {
        if !start.is_finite() || !end.is_finite() {
            return None;
        }
        let lo = f64::from(self.min);
        let hi = f64::from(self.max);
        let s = start.round().clamp(lo, hi) as i32;
        let e = end.round().clamp(lo, hi) as i32;
        Some(YearRange::new(s, e))
    }

    /// Text-input flavour of [`YearDomain::normalize_range`].
    pub fn normalize_range_text(&self, start: &str, end: &str) -> Option<YearRange> {
        self.normalize_range(coerce_year(start)?, coerce_year(end)?)
    }
}

/// `normalize_range` over the default `[MIN_YEAR, MAX_YEAR]` domain.
pub fn normalize_range(start: f64, end: f64) -> Option<YearRange> {
    YearDomain::default().normalize_range(start, end)
}

/// Coerces free text to a year candidate. Blank or non-numeric text is rejected.
pub fn coerce_year(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Display label for a window: `"2000"` or `"1999–2001"`.
pub fn range_label(range: YearRange) -> String {
    if range.width() == 0 {
        range.start().to_string()
    } else {
        format!("{}–{}", range.start(), range.end())
    }
}
