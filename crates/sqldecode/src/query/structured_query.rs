//! # Structured Query
//!
//! The `{sel, agg, cond_conn_op, conds}` record produced by decoding and
//! consumed by scoring. The JSON form is the persisted result format:
//!
//! ```json
//! {"sel": [1], "agg": [0], "cond_conn_op": 0, "conds": [[0, 0, "Bob"]]}
//! ```

use std::fmt;

use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
    de::Error as _,
    ser::SerializeSeq,
};
use serde_json::Value;

use crate::{
    query::ops::{AggOp, CondConn, CondOp},
    table::format_number,
    types::TokenSpan,
};

/// The value slot of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CondValue {
    /// Literal value text.
    Text(String),

    /// An inclusive sub-word span into the question.
    Span(TokenSpan),
}

impl CondValue {
    /// The text, if this is a textual value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CondValue::Text(s) => Some(s),
            CondValue::Span(_) => None,
        }
    }

    /// The span, if this is a span value.
    pub fn as_span(&self) -> Option<TokenSpan> {
        match self {
            CondValue::Text(_) => None,
            CondValue::Span(span) => Some(*span),
        }
    }

    fn from_json(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(s) => Ok(CondValue::Text(s.clone())),
            Value::Number(n) => Ok(CondValue::Text(match n.as_i64() {
                Some(i) => i.to_string(),
                None => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
            })),
            Value::Array(items) if items.len() == 2 => {
                let pos = |v: &Value| {
                    v.as_u64()
                        .map(|x| x as usize)
                        .ok_or_else(|| format!("span bound {v} is not an index"))
                };
                Ok(CondValue::Span(TokenSpan::new(
                    pos(&items[0])?,
                    pos(&items[1])?,
                )))
            }
            other => Err(format!("unsupported condition value {other}")),
        }
    }
}

impl fmt::Display for CondValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            CondValue::Text(s) => f.write_str(s),
            CondValue::Span(span) => write!(f, "[{}, {}]", span.start, span.end),
        }
    }
}

impl From<&str> for CondValue {
    fn from(value: &str) -> Self {
        CondValue::Text(value.to_string())
    }
}

impl From<String> for CondValue {
    fn from(value: String) -> Self {
        CondValue::Text(value)
    }
}

impl From<TokenSpan> for CondValue {
    fn from(value: TokenSpan) -> Self {
        CondValue::Span(value)
    }
}

/// A `(column, operator, value)` WHERE triple.
///
/// Gold annotations may carry a fourth, canonical value; when present it is
/// the value scored against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    /// Column index.
    pub column: usize,

    /// Operator.
    pub op: CondOp,

    /// Value text or span.
    pub value: CondValue,

    /// Canonical value from gold annotations.
    pub canonical: Option<CondValue>,
}

impl Condition {
    /// Construct a new condition.
    pub fn new(
        column: usize,
        op: CondOp,
        value: impl Into<CondValue>,
    ) -> Self {
        Self {
            column,
            op,
            value: value.into(),
            canonical: None,
        }
    }

    /// The value compared during value scoring.
    pub fn scored_value(&self) -> &CondValue {
        self.canonical.as_ref().unwrap_or(&self.value)
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let len = if self.canonical.is_some() { 4 } else { 3 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.column)?;
        seq.serialize_element(&self.op)?;
        seq.serialize_element(&CondValueRef(&self.value))?;
        if let Some(canonical) = &self.canonical {
            seq.serialize_element(&CondValueRef(canonical))?;
        }
        seq.end()
    }
}

struct CondValueRef<'a>(&'a CondValue);

impl Serialize for CondValueRef<'_> {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match self.0 {
            CondValue::Text(s) => serializer.serialize_str(s),
            CondValue::Span(span) => span.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Vec<Value> = Vec::deserialize(deserializer)?;
        if !(3..=4).contains(&raw.len()) {
            return Err(D::Error::custom(format!(
                "condition must have 3 or 4 elements, found {}",
                raw.len()
            )));
        }

        let column = raw[0]
            .as_u64()
            .ok_or_else(|| D::Error::custom("condition column must be an index"))?
            as usize;
        let op = raw[1]
            .as_u64()
            .ok_or_else(|| D::Error::custom("condition operator must be an index"))
            .and_then(|i| CondOp::from_index(i as usize).map_err(D::Error::custom))?;
        let value = CondValue::from_json(&raw[2]).map_err(D::Error::custom)?;
        let canonical = raw
            .get(3)
            .map(CondValue::from_json)
            .transpose()
            .map_err(D::Error::custom)?;

        Ok(Self {
            column,
            op,
            value,
            canonical,
        })
    }
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        One(T),
        Many(Vec<T>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(x) => vec![x],
        OneOrMany::Many(xs) => xs,
    })
}

/// A structured SQL-like query over one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredQuery {
    /// Selected columns.
    #[serde(deserialize_with = "one_or_many")]
    pub sel: Vec<usize>,

    /// Aggregation per selected column.
    #[serde(deserialize_with = "one_or_many")]
    pub agg: Vec<AggOp>,

    /// Condition connector.
    #[serde(default)]
    pub cond_conn_op: CondConn,

    /// WHERE conditions.
    #[serde(default)]
    pub conds: Vec<Condition>,
}

impl StructuredQuery {
    /// The number of conditions.
    pub fn num_conditions(&self) -> usize {
        self.conds.len()
    }

    /// The condition columns, in condition order.
    pub fn condition_columns(&self) -> Vec<usize> {
        self.conds.iter().map(|c| c.column).collect()
    }

    /// The condition operators, in condition order.
    pub fn condition_ops(&self) -> Vec<CondOp> {
        self.conds.iter().map(|c| c.op).collect()
    }

    /// Stable-sort conditions by column ascending.
    pub fn sort_conditions(&mut self) {
        self.conds.sort_by_key(|c| c.column);
    }

    /// Apply the degenerate-condition rules.
    ///
    /// * A single condition cannot be conjoined: the connector becomes `None`.
    /// * A single condition on `sentinel_column` means "no filter": the
    ///   conditions become exactly `[sentinel_column, =, null_value]`.
    pub fn normalize_degenerate(
        &mut self,
        sentinel_column: usize,
        null_value: &str,
    ) {
        if self.conds.len() != 1 {
            return;
        }
        self.cond_conn_op = CondConn::None;
        if self.conds[0].column == sentinel_column {
            self.conds = vec![Condition::new(sentinel_column, CondOp::Eq, null_value)];
        }
    }
}
