//! Declarative filter expressions in the map-surface JSON dialect.
//!
//! An expression is a tree such as
//! `["all", [">=", ["get", "year"], 1999], ["any", ["==", ["get", "ef"], 3]]]`.
//! The same tree is evaluated in-process against normalized records, so the
//! map and the charts agree on what is in view.

use std::fmt;

use formats::normalize::Record;
use serde_json::{Value, json};

/// Canonical record properties an expression may read.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Year,
    Ef,
    State,
    DamageUsd,
    InjuriesNum,
    DeathsNum,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Year,
        Field::Ef,
        Field::State,
        Field::DamageUsd,
        Field::InjuriesNum,
        Field::DeathsNum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Year => "year",
            Field::Ef => "ef",
            Field::State => "state",
            Field::DamageUsd => "damage_usd",
            Field::InjuriesNum => "injuries_num",
            Field::DeathsNum => "deaths_num",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.as_str() == name)
    }

    /// The field's value on `record`; `None` plays the role of JSON `null`.
    pub fn read(&self, record: &Record) -> Option<Literal> {
        match self {
            Field::Year => record.year.map(|y| Literal::Number(f64::from(y))),
            Field::Ef => record.ef.map(|ef| Literal::Number(f64::from(ef))),
            Field::State => record.state.clone().map(Literal::Text),
            Field::DamageUsd => Some(Literal::Number(record.damage_usd)),
            Field::InjuriesNum => Some(Literal::Number(f64::from(record.injuries_num))),
            Field::DeathsNum => Some(Literal::Number(f64::from(record.deaths_num))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Text(String),
}

impl Literal {
    fn to_json(&self) -> Value {
        match self {
            Literal::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => json!(*n as i64),
            Literal::Number(n) => json!(n),
            Literal::Text(s) => json!(s),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }

    fn from_name(name: &str) -> Option<CmpOp> {
        [CmpOp::Eq, CmpOp::Lt, CmpOp::Le, CmpOp::Gt, CmpOp::Ge]
            .into_iter()
            .find(|op| op.as_str() == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    All(Vec<FilterExpr>),
    Any(Vec<FilterExpr>),
    Cmp {
        op: CmpOp,
        field: Field,
        value: Literal,
    },
}

impl FilterExpr {
    pub fn cmp(op: CmpOp, field: Field, value: Literal) -> Self {
        FilterExpr::Cmp { op, field, value }
    }

    pub fn num(op: CmpOp, field: Field, value: f64) -> Self {
        FilterExpr::cmp(op, field, Literal::Number(value))
    }

    /// Evaluates against a record.
    ///
    /// A missing field behaves like JSON `null`: it is unequal to every
    /// literal and fails every ordering comparison. `all` of nothing is true
    /// and `any` of nothing is false.
    pub fn eval(&self, record: &Record) -> bool {
        match self {
            FilterExpr::All(items) => items.iter().all(|e| e.eval(record)),
            FilterExpr::Any(items) => items.iter().any(|e| e.eval(record)),
            FilterExpr::Cmp { op, field, value } => compare(*op, field.read(record), value),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FilterExpr::All(items) => tagged("all", items),
            FilterExpr::Any(items) => tagged("any", items),
            FilterExpr::Cmp { op, field, value } => {
                json!([op.as_str(), ["get", field.as_str()], value.to_json()])
            }
        }
    }

    pub fn from_json(value: &Value) -> Result<FilterExpr, ExprError> {
        match value {
            Value::Array(items) => {
                let head = items
                    .first()
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| ExprError::new("expression must start with an operator"))?;
                let args = &items[1..];
                match head {
                    "all" => Ok(FilterExpr::All(parse_all(args)?)),
                    "any" => Ok(FilterExpr::Any(parse_all(args)?)),
                    op => {
                        let op = CmpOp::from_name(op)
                            .ok_or_else(|| ExprError::new(format!("unknown operator {op:?}")))?;
                        parse_cmp(op, args)
                    }
                }
            }
            other => Err(ExprError::new(format!("unsupported expression {other}"))),
        }
    }
}

fn tagged(tag: &str, items: &[FilterExpr]) -> Value {
    let mut out = Vec::with_capacity(items.len() + 1);
    out.push(json!(tag));
    out.extend(items.iter().map(FilterExpr::to_json));
    Value::Array(out)
}

fn parse_all(args: &[Value]) -> Result<Vec<FilterExpr>, ExprError> {
    args.iter().map(FilterExpr::from_json).collect()
}

fn parse_cmp(op: CmpOp, args: &[Value]) -> Result<FilterExpr, ExprError> {
    let [getter, literal] = args else {
        let msg = format!("{} takes exactly two arguments", op.as_str());
        return Err(ExprError::new(msg));
    };
    let name = match getter.as_array().map(Vec::as_slice) {
        Some([Value::String(get), Value::String(name)]) if get == "get" => name,
        _ => return Err(ExprError::new("left operand must be [\"get\", <property>]")),
    };
    let field = Field::from_name(name)
        .ok_or_else(|| ExprError::new(format!("unknown property {name:?}")))?;
    let value = match literal {
        Value::Number(n) => Literal::Number(
            n.as_f64()
                .ok_or_else(|| ExprError::new("numeric literal out of range"))?,
        ),
        Value::String(s) => Literal::Text(s.clone()),
        other => return Err(ExprError::new(format!("unsupported literal {other}"))),
    };
    Ok(FilterExpr::Cmp { op, field, value })
}

fn compare(op: CmpOp, lhs: Option<Literal>, rhs: &Literal) -> bool {
    let ordering = match (&lhs, rhs) {
        (Some(Literal::Number(a)), Literal::Number(b)) => a.partial_cmp(b),
        (Some(Literal::Text(a)), Literal::Text(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    };
    match (op, ordering) {
        (_, None) => false,
        (CmpOp::Eq, Some(o)) => o.is_eq(),
        (CmpOp::Lt, Some(o)) => o.is_lt(),
        (CmpOp::Le, Some(o)) => o.is_le(),
        (CmpOp::Gt, Some(o)) => o.is_gt(),
        (CmpOp::Ge, Some(o)) => o.is_ge(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprError(String);

impl ExprError {
    fn new(msg: impl Into<String>) -> Self {
        ExprError(msg.into())
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid filter expression: {}", self.0)
    }
}

impl std::error::Error for ExprError {}
