use std::fmt;

use foundation::years::{YearDomain, YearRange};
use formats::normalize::MAX_EF;
use scene::state::{Bracket, FilterState, StateFilter};

use crate::controls::ControlView;
use crate::intent::Intent;

/// Result of applying one intent to the filter state.
#[derive(Debug, Clone, PartialEq)]
pub enum Reduction {
    /// A valid committed change. Always followed by a full recompute, even
    /// when the new state equals the old one.
    Commit(FilterState),
    /// The intent does not touch the filter state.
    Unchanged,
    Rejected(Rejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    InvalidRange { start: String, end: String },
    EfOutOfScale(u8),
    UnknownBracket(String),
    UnknownState(String),
    YearOutsideDomain(i32),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::InvalidRange { start, end } => {
                write!(f, "invalid year range {start:?}..{end:?}")
            }
            Rejection::EfOutOfScale(ef) => write!(f, "EF{ef} is outside EF0..EF{MAX_EF}"),
            Rejection::UnknownBracket(v) => write!(f, "unknown bracket {v:?}"),
            Rejection::UnknownState(code) => write!(f, "no records for state {code:?}"),
            Rejection::YearOutsideDomain(y) => write!(f, "year {y} is outside the timeline"),
        }
    }
}

/// Pure reducer: the next filter state for `intent`.
///
/// `view` supplies the slider positions a `ReleaseRange` commits and the
/// state codes a `SelectState` may pick. Rejected intents leave `state`
/// untouched.
pub fn reduce(
    state: &FilterState,
    intent: &Intent,
    view: &ControlView,
    domain: YearDomain,
) -> Reduction {
    let mut next = state.clone();
    match intent {
        Intent::DragRange { .. } | Intent::Play | Intent::Pause => return Reduction::Unchanged,
        Intent::ReleaseRange => {
            let pending = view.pending_range();
            match domain.normalize_range(f64::from(pending.start()), f64::from(pending.end())) {
                Some(range) => next.range = range,
                None => {
                    return Reduction::Rejected(Rejection::InvalidRange {
                        start: pending.start().to_string(),
                        end: pending.end().to_string(),
                    })
                }
            }
        }
        Intent::CommitText { start, end } => match domain.normalize_range_text(start, end) {
            Some(range) => next.range = range,
            None => {
                return Reduction::Rejected(Rejection::InvalidRange {
                    start: start.clone(),
                    end: end.clone(),
                })
            }
        },
        Intent::ToggleEf { ef, checked } => {
            if *ef > MAX_EF {
                return Reduction::Rejected(Rejection::EfOutOfScale(*ef));
            }
            next.efs.set(*ef, *checked);
        }
        Intent::SelectState { value } => match StateFilter::from(value.clone()) {
            StateFilter::Code(code) if !view.offers_state(&code) => {
                return Reduction::Rejected(Rejection::UnknownState(code));
            }
            filter => next.state = filter,
        },
        Intent::SelectBracket { quantity, value } => match value.parse::<Bracket>() {
            Ok(bracket) => next.set_bracket(*quantity, bracket),
            Err(e) => return Reduction::Rejected(Rejection::UnknownBracket(e.0)),
        },
        Intent::TimelineClick { year } => {
            if *year < domain.min || *year > domain.max {
                return Reduction::Rejected(Rejection::YearOutsideDomain(*year));
            }
            next.range = YearRange::single(*year);
        }
    }
    Reduction::Commit(next)
}
