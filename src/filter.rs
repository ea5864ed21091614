// Query filtering for records

use crate::models::Priority;
use crate::record::{IndexValue, Record};
use eyre::{Result, eyre};
use std::cmp::Ordering;
use tracing::trace;

/// Filter for querying records
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Field name to filter on
    pub field: String,
    /// Comparison operator
    pub op: FilterOp,
    /// Value to compare against
    pub value: IndexValue,
}

/// Comparison operators for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,       // ==
    Ne,       // !=
    Gt,       // >
    Lt,       // <
    Gte,      // >=
    Lte,      // <=
    Contains, // case-insensitive substring
}

// Longest symbols first so ">=" wins over ">"
const OPERATORS: [(&str, FilterOp); 7] = [
    ("!=", FilterOp::Ne),
    (">=", FilterOp::Gte),
    ("<=", FilterOp::Lte),
    ("=", FilterOp::Eq),
    (">", FilterOp::Gt),
    ("<", FilterOp::Lt),
    ("~", FilterOp::Contains),
];

impl FilterOp {
    pub fn symbol(self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Ne => "!=",
            FilterOp::Gt => ">",
            FilterOp::Lt => "<",
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
            FilterOp::Contains => "~",
        }
    }

    /// Compare a record's value against the filter value.
    /// Mismatched value types never match.
    pub fn apply(self, actual: &IndexValue, expected: &IndexValue) -> bool {
        if self == FilterOp::Contains {
            return match (actual, expected) {
                (IndexValue::String(a), IndexValue::String(e)) => a.to_lowercase().contains(&e.to_lowercase()),
                _ => false,
            };
        }

        let ordering = match (actual, expected) {
            (IndexValue::String(a), IndexValue::String(e)) => a.cmp(e),
            (IndexValue::Int(a), IndexValue::Int(e)) => a.cmp(e),
            (IndexValue::Bool(a), IndexValue::Bool(e)) => a.cmp(e),
            _ => return false,
        };

        match self {
            FilterOp::Eq => ordering == Ordering::Equal,
            FilterOp::Ne => ordering != Ordering::Equal,
            FilterOp::Gt => ordering == Ordering::Greater,
            FilterOp::Lt => ordering == Ordering::Less,
            FilterOp::Gte => ordering != Ordering::Less,
            FilterOp::Lte => ordering != Ordering::Greater,
            FilterOp::Contains => false,
        }
    }
}

impl std::fmt::Display for FilterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.field, self.op, self.value)
    }
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: IndexValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Parse `field<op>value`, e.g. `priority>=2`, `completed=false`, `title~milk`
    pub fn parse(expr: &str) -> Result<Self> {
        let (pos, symbol, op) = OPERATORS
            .iter()
            .filter_map(|(symbol, op)| expr.find(symbol).map(|pos| (pos, *symbol, *op)))
            .min_by_key(|(pos, symbol, _)| (*pos, std::cmp::Reverse(symbol.len())))
            .ok_or_else(|| eyre!("Invalid filter: {} (expected field<op>value)", expr))?;

        let field = expr[..pos].trim();
        let raw = expr[pos + symbol.len()..].trim();
        validate_field_name(field)?;

        let value = if op == FilterOp::Contains {
            IndexValue::String(raw.to_string())
        } else {
            parse_value(field, raw)
        };

        Ok(Self::new(field, op, value))
    }

    /// True if the record carries this field and the comparison holds
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        let fields = record.indexed_fields();
        let matched = fields
            .get(&self.field)
            .is_some_and(|actual| self.op.apply(actual, &self.value));
        trace!(id = %record.id(), filter = %self, matched, "Filter::matches");
        matched
    }
}

/// True if the record satisfies every filter
pub fn matches_all<R: Record>(record: &R, filters: &[Filter]) -> bool {
    filters.iter().all(|f| f.matches(record))
}

pub fn validate_field_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(eyre!("Field name cannot be empty"));
    }
    if name.len() > 64 {
        return Err(eyre!("Field name too long: {} (max 64 chars)", name));
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(eyre!("Invalid field name: {} (must be alphanumeric with _)", name));
    }
    Ok(())
}

fn parse_value(field: &str, raw: &str) -> IndexValue {
    if field == "title" {
        return IndexValue::String(raw.to_string());
    }
    if let Ok(b) = raw.parse::<bool>() {
        return IndexValue::Bool(b);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return IndexValue::Int(i);
    }
    if field == "priority" {
        if let Ok(p) = raw.parse::<Priority>() {
            return IndexValue::Int(p.weight());
        }
    }
    IndexValue::String(raw.to_string())
}
