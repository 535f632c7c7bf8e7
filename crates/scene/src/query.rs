use foundation::years::YearRange;

use formats::normalize::Record;

use crate::Dataset;
use crate::expr::{CmpOp, Field, FilterExpr, Literal};
use crate::selection::SelectionSet;
use crate::state::{EfSet, FilterState, Interval, Quantity, StateFilter};

/// EF value no record can carry. An empty EF selection compares against it
/// so the map filter matches nothing.
pub const EF_NO_MATCH: f64 = -999.0;

/// One independent dimension of the compiled filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Year(YearRange),
    /// An empty set matches no record.
    Ef(EfSet),
    State(String),
    Bracket(Quantity, Interval),
}

impl Clause {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Clause::Year(range) => record.year.is_some_and(|y| range.contains(y)),
            Clause::Ef(set) => record.ef.is_some_and(|ef| set.contains(ef)),
            Clause::State(code) => record.state.as_deref() == Some(code.as_str()),
            Clause::Bracket(quantity, interval) => interval.contains(quantity.value(record)),
        }
    }

    /// The same clause in the declarative map dialect.
    pub fn to_expr(&self) -> FilterExpr {
        match self {
            Clause::Year(range) => FilterExpr::All(vec![
                FilterExpr::num(CmpOp::Ge, Field::Year, f64::from(range.start())),
                FilterExpr::num(CmpOp::Le, Field::Year, f64::from(range.end())),
            ]),
            Clause::Ef(set) if set.is_empty() => FilterExpr::num(CmpOp::Eq, Field::Ef, EF_NO_MATCH),
            Clause::Ef(set) => FilterExpr::Any(
                set.iter()
                    .map(|ef| FilterExpr::num(CmpOp::Eq, Field::Ef, f64::from(ef)))
                    .collect(),
            ),
            Clause::State(code) => {
                FilterExpr::cmp(CmpOp::Eq, Field::State, Literal::Text(code.clone()))
            }
            Clause::Bracket(quantity, interval) => interval_expr(field_for(*quantity), interval),
        }
    }
}

fn field_for(quantity: Quantity) -> Field {
    match quantity {
        Quantity::Damage => Field::DamageUsd,
        Quantity::Injuries => Field::InjuriesNum,
        Quantity::Fatalities => Field::DeathsNum,
    }
}

fn interval_expr(field: Field, iv: &Interval) -> FilterExpr {
    if iv.max == Some(iv.min) && iv.min_inclusive && iv.max_inclusive {
        return FilterExpr::num(CmpOp::Eq, field, iv.min);
    }
    let lower_op = if iv.min_inclusive {
        CmpOp::Ge
    } else {
        CmpOp::Gt
    };
    let mut parts = vec![FilterExpr::num(lower_op, field, iv.min)];
    if let Some(max) = iv.max {
        let upper_op = if iv.max_inclusive {
            CmpOp::Le
        } else {
            CmpOp::Lt
        };
        parts.push(FilterExpr::num(upper_op, field, max));
    }
    if parts.len() == 1 {
        parts.remove(0)
    } else {
        FilterExpr::All(parts)
    }
}

/// Conjunction of clauses compiled from a [`FilterState`].
///
/// Year and EF clauses are always present, so records with an unknown year or
/// rating never match. State and bracket dimensions left at `ALL` contribute
/// no clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.clauses.iter().all(|c| c.matches(record))
    }

    /// Declarative form for the map surface. Agrees with [`Predicate::matches`]
    /// on every record.
    pub fn to_expr(&self) -> FilterExpr {
        FilterExpr::All(self.clauses.iter().map(Clause::to_expr).collect())
    }
}

/// Compiles the filter state into a predicate. Pure and idempotent.
pub fn compile_predicate(state: &FilterState) -> Predicate {
    let mut clauses = vec![Clause::Year(state.range), Clause::Ef(state.efs)];
    if let StateFilter::Code(code) = &state.state {
        clauses.push(Clause::State(code.clone()));
    }
    for quantity in Quantity::ALL {
        if let Some(interval) = quantity.interval(state.bracket(quantity)) {
            clauses.push(Clause::Bracket(quantity, interval));
        }
    }

    Predicate { clauses }
}

/// Records matching `predicate`, in id order.
pub fn filter_records(dataset: &Dataset, predicate: &Predicate) -> SelectionSet {
    dataset
        .iter()
        .filter(|(_, r)| predicate.matches(r))
        .map(|(id, _)| id)
        .collect()
}
