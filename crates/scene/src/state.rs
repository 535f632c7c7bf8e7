//! Range/selection state: the single source of truth the filter is compiled from.

use std::fmt;
use std::str::FromStr;

use formats::normalize::{MAX_EF, Record};
use foundation::years::YearRange;
use serde::{Deserialize, Serialize};

/// Year shown when a session starts without configuration.
pub const DEFAULT_YEAR: i32 = 2000;

/// Subset of EF ratings 0..=5, stored as a bitmask.
///
/// The empty set is legal and selects nothing.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<u8>", from = "Vec<u8>")]
pub struct EfSet(u8);

impl EfSet {
    pub const fn empty() -> Self {
        EfSet(0)
    }

    pub const fn all() -> Self {
        EfSet(0b11_1111)
    }

    pub fn contains(&self, ef: u8) -> bool {
        ef <= MAX_EF && (self.0 & (1 << ef)) != 0
    }

    /// Adds or removes `ef`; ratings above 5 are ignored.
    pub fn set(&mut self, ef: u8, on: bool) {
        if ef > MAX_EF {
            return;
        }
        if on {
            self.0 |= 1 << ef;
        } else {
            self.0 &= !(1 << ef);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=MAX_EF).filter(|ef| self.contains(*ef))
    }
}

impl fmt::Debug for EfSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<u8> for EfSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = EfSet::empty();
        for ef in iter {
            set.set(ef, true);
        }
        set
    }
}

impl From<Vec<u8>> for EfSet {
    fn from(v: Vec<u8>) -> Self {
        v.into_iter().collect()
    }
}

impl From<EfSet> for Vec<u8> {
    fn from(set: EfSet) -> Self {
        set.iter().collect()
    }
}

/// `ALL` or a single canonical (upper-case) state code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StateFilter {
    #[default]
    All,
    Code(String),
}

impl StateFilter {
    pub fn matches(&self, state: Option<&str>) -> bool {
        match self {
            StateFilter::All => true,
            StateFilter::Code(code) => state == Some(code.as_str()),
        }
    }
}

impl From<String> for StateFilter {
    fn from(s: String) -> Self {
        let code = s.trim().to_ascii_uppercase();
        if code.is_empty() || code == "ALL" {
            StateFilter::All
        } else {
            StateFilter::Code(code)
        }
    }
}

impl From<StateFilter> for String {
    fn from(f: StateFilter) -> Self {
        match f {
            StateFilter::All => "ALL".to_string(),
            StateFilter::Code(code) => code,
        }
    }
}

/// Severity bracket shared by the damage, injury and fatality dropdowns.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Bracket {
    #[default]
    All,
    None,
    Low,
    Med,
    High,
}

impl Bracket {
    pub const OPTIONS: [Bracket; 5] = [
        Bracket::All,
        Bracket::None,
        Bracket::Low,
        Bracket::Med,
        Bracket::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bracket::All => "ALL",
            Bracket::None => "NONE",
            Bracket::Low => "LOW",
            Bracket::Med => "MED",
            Bracket::High => "HIGH",
        }
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBracket(pub String);

impl fmt::Display for UnknownBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown bracket {:?} (expected ALL, NONE, LOW, MED or HIGH)",
            self.0
        )
    }
}

impl std::error::Error for UnknownBracket {}

impl FromStr for Bracket {
    type Err = UnknownBracket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Bracket::OPTIONS
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownBracket(s.to_string()))
    }
}

/// A bracketed record quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Damage,
    Injuries,
    Fatalities,
}

pub const DAMAGE_LOW_MAX_USD: f64 = 1_000_000.0;
pub const DAMAGE_HIGH_MIN_USD: f64 = 10_000_000.0;

impl Quantity {
    pub const ALL: [Quantity; 3] = [Quantity::Damage, Quantity::Injuries, Quantity::Fatalities];

    /// The canonical field this quantity reads.
    pub fn value(&self, record: &Record) -> f64 {
        match self {
            Quantity::Damage => record.damage_usd,
            Quantity::Injuries => f64::from(record.injuries_num),
            Quantity::Fatalities => f64::from(record.deaths_num),
        }
    }

    /// Numeric interval for `bracket`; `None` means unrestricted.
    pub fn interval(&self, bracket: Bracket) -> Option<Interval> {
        let iv = match (self, bracket) {
            (_, Bracket::All) => return None,
            (_, Bracket::None) => Interval::closed(0.0, 0.0),
            (Quantity::Damage, Bracket::Low) => Interval::open(0.0, DAMAGE_LOW_MAX_USD),
            (Quantity::Damage, Bracket::Med) => {
                Interval::half_open(DAMAGE_LOW_MAX_USD, DAMAGE_HIGH_MIN_USD)
            }
            (Quantity::Damage, Bracket::High) => Interval::at_least(DAMAGE_HIGH_MIN_USD),
            (Quantity::Injuries, Bracket::Low) => Interval::closed(1.0, 10.0),
            (Quantity::Injuries, Bracket::Med) => Interval::closed(11.0, 50.0),
            (Quantity::Injuries, Bracket::High) => Interval::at_least(51.0),
            (Quantity::Fatalities, Bracket::Low) => Interval::closed(1.0, 5.0),
            (Quantity::Fatalities, Bracket::Med) => Interval::closed(6.0, 20.0),
            (Quantity::Fatalities, Bracket::High) => Interval::at_least(21.0),
        };
        Some(iv)
    }
}

/// Numeric interval with per-end inclusivity. `max: None` is unbounded.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub min_inclusive: bool,
    pub max: Option<f64>,
    pub max_inclusive: bool,
}

impl Interval {
    pub fn closed(min: f64, max: f64) -> Self {
        Self {
            min,
            min_inclusive: true,
            max: Some(max),
            max_inclusive: true,
        }
    }

    pub fn open(min: f64, max: f64) -> Self {
        Self {
            min,
            min_inclusive: false,
            max: Some(max),
            max_inclusive: false,
        }
    }

    pub fn half_open(min: f64, max: f64) -> Self {
        Self {
            min,
            min_inclusive: true,
            max: Some(max),
            max_inclusive: false,
        }
    }

    pub fn at_least(min: f64) -> Self {
        Self {
            min,
            min_inclusive: true,
            max: None,
            max_inclusive: false,
        }
    }

    pub fn contains(&self, v: f64) -> bool {
        let above = if self.min_inclusive {
            v >= self.min
        } else {
            v > self.min
        };
        let below = match self.max {
            None => true,
            Some(max) if self.max_inclusive => v <= max,
            Some(max) => v < max,
        };
        above && below
    }
}

/// Current filter selection across all six controls.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub range: YearRange,
    pub efs: EfSet,
    pub state: StateFilter,
    pub damage: Bracket,
    pub injuries: Bracket,
    pub fatalities: Bracket,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::with_range(YearRange::single(DEFAULT_YEAR))
    }
}

impl FilterState {
    /// Startup defaults: every EF selected, every other filter at `ALL`.
    pub fn with_range(range: YearRange) -> Self {
        Self {
            range,
            efs: EfSet::all(),
            state: StateFilter::All,
            damage: Bracket::All,
            injuries: Bracket::All,
            fatalities: Bracket::All,
        }
    }

    pub fn bracket(&self, quantity: Quantity) -> Bracket {
        match quantity {
            Quantity::Damage => self.damage,
            Quantity::Injuries => self.injuries,
            Quantity::Fatalities => self.fatalities,
        }
    }

    pub fn set_bracket(&mut self, quantity: Quantity, bracket: Bracket) {
        match quantity {
            Quantity::Damage => self.damage = bracket,
            Quantity::Injuries => self.injuries = bracket,
            Quantity::Fatalities => self.fatalities = bracket,
        }
    }
}
