//!
//! Typed projections of Open API payloads.
//!

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Wallet balance in a single currency.
///
/// XML bodies carry every value as text, so numeric fields accept both JSON numbers and strings.
/// Keys this type does not know about end up in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Balance {
    #[serde(deserialize_with = "lenient_integer")]
    pub user_id: Option<i64>,
    #[serde(deserialize_with = "lenient_integer")]
    pub currency_id: Option<i64>,
    pub amount: Option<Decimal>,
    pub safe_amount: Option<Decimal>,
    pub hold_amount: Option<Decimal>,
    pub available_amount: Option<Decimal>,
    pub overdraft: Option<Decimal>,
    pub update_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Balance {
    /// Nothing was projected: the entity a malformed body degrades to.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Result of a balance call: one entity for an object payload, a list for an array payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BalanceResponse {
    Single(Balance),
    Many(Vec<Balance>),
}

impl BalanceResponse {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Many),
            other => serde_json::from_value(other).map(Self::Single),
        }
    }

    pub fn into_vec(self) -> Vec<Balance> {
        match self {
            Self::Single(balance) => vec![balance],
            Self::Many(balances) => balances,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(balance) => balance.is_empty(),
            Self::Many(balances) => balances.is_empty(),
        }
    }
}

impl Default for BalanceResponse {
    fn default() -> Self {
        Self::Single(Balance::default())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntegerOrString {
    Integer(i64),
    String(String),
}

fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IntegerOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IntegerOrString::Integer(value)) => Ok(Some(value)),
        Some(IntegerOrString::String(value)) if value.trim().is_empty() => Ok(None),
        Some(IntegerOrString::String(value)) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
