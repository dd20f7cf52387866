use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{consts::fields, encoding::transcode_cp1251};

/// Value of a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    /// Text field. The value is taken as is; [`FieldList::add_text`] is the path that transcodes.
    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: FieldValue::Text(value.into()),
        }
    }

    pub fn number(key: impl Into<String>, value: i64) -> Self {
        Self {
            key: key.into(),
            value: FieldValue::Number(value),
        }
    }
}

/// Ordered payment form fields. Keys may repeat and the order is the one the signature covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldList(Vec<Field>);

impl FieldList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a text field after passing the value through cp1251.
    pub fn add_text(&mut self, key: &str, value: &str) {
        self.0.push(Field::text(key, transcode_cp1251(value)));
    }

    pub fn add_number(&mut self, key: &str, value: i64) {
        self.0.push(Field::number(key, value));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Field] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0
            .iter()
            .find(|field| field.key == key)
            .map(|field| &field.value)
    }

    /// Every value stored under `key`, in list order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a FieldValue> + 'a {
        self.0
            .iter()
            .filter(move |field| field.key == key)
            .map(|field| &field.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The trailing `WMI_SIGNATURE` value, if the list is signed.
    pub fn signature(&self) -> Option<&FieldValue> {
        self.0
            .last()
            .filter(|field| field.key == fields::SIGNATURE)
            .map(|field| &field.value)
    }

    /// Fields covered by the signature: everything but a trailing `WMI_SIGNATURE`.
    pub fn unsigned_fields(&self) -> &[Field] {
        match self.0.split_last() {
            Some((last, rest)) if last.key == fields::SIGNATURE => rest,
            _ => &self.0,
        }
    }

    /// `(key, value)` pairs ready to be rendered as hidden form inputs.
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.0
            .into_iter()
            .map(|field| {
                let value = field.value.to_string();
                (field.key, value)
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<FieldList> for Vec<Field> {
    fn from(list: FieldList) -> Self {
        list.0
    }
}

/// Payment methods the order's payment type allows, and whether receipts go through the
/// online cash register.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentTypeCapabilities {
    pub enabled_payment_methods: Vec<String>,
    pub disabled_payment_methods: Vec<String>,
    pub online_kassa_enabled: bool,
    pub online_kassa_provider_is_default: bool,
}

impl PaymentTypeCapabilities {
    pub fn sends_order_items(&self) -> bool {
        self.online_kassa_enabled && self.online_kassa_provider_is_default
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub title: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub sub_total: Decimal,
    pub tax: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryDetails {
    /// The delivery service is one the gateway dispatches itself.
    pub handled_by_gateway: bool,
    pub date_from: Option<OffsetDateTime>,
    pub date_till: Option<OffsetDateTime>,
    pub country: String,
    pub city: String,
    pub address: String,
    pub comment: Option<String>,
}
