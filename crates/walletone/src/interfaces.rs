//!
//! Read-only views of the host application's models the form builder works with.
//!

use std::convert::Infallible;

use masking::Secret;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    errors::CustomResult,
    types::{DeliveryDetails, OrderItem, PaymentTypeCapabilities},
};

pub trait PaymentOrder {
    /// Internal identifier, used for logging and order conditions.
    fn id(&self) -> &str;

    /// Identifier shown to the customer and sent as `WMI_PAYMENT_NO`.
    fn external_id(&self) -> &str;

    /// Amount to charge, delivery included.
    fn total_with_delivery_price(&self) -> Decimal;

    fn description(&self) -> &str;

    /// ISO 4217 numeric code, e.g. `643` for RUB.
    fn currency_iso_numeric(&self) -> u16;

    fn email(&self) -> Option<&str>;

    fn phone(&self) -> Option<&str>;

    /// Moment the unpaid order gets cancelled.
    fn will_cancel_at(&self) -> Option<OffsetDateTime>;

    fn items(&self) -> &[OrderItem];

    fn delivery(&self) -> Option<&DeliveryDetails>;

    fn payment_type(&self) -> &PaymentTypeCapabilities;
}

pub trait PaymentVendor {
    fn id(&self) -> &str;

    fn w1_merchant_id(&self) -> &str;

    /// Host of the vendor's storefront, with or without a scheme.
    fn home_host(&self) -> &str;

    /// `TaxType` of the vendor's line items, as the online cash register expects it.
    fn tax_type(&self) -> &str;
}

/// Looks up the merchant signing key of a vendor.
pub trait SigningKeySource {
    fn merchant_sign_key(&self, vendor: &dyn PaymentVendor) -> Option<Secret<String>>;
}

/// A single key shared by every vendor.
impl SigningKeySource for Secret<String> {
    fn merchant_sign_key(&self, _vendor: &dyn PaymentVendor) -> Option<Secret<String>> {
        Some(self.clone())
    }
}

/// Delivery conditions attached to orders. Only the "on create" event matters for the form.
pub trait OrderConditionStore {
    type Condition;
    type Error: error_stack::Context;

    /// First condition possible for the order on the "on create" event.
    fn on_create_condition(
        &self,
        order_id: &str,
    ) -> CustomResult<Option<Self::Condition>, Self::Error>;

    /// Records that the condition was consumed by the order.
    fn mark_used_with_order(
        &self,
        condition: &Self::Condition,
        order_id: &str,
    ) -> CustomResult<(), Self::Error>;
}

/// Store for hosts without delivery conditions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOrderConditions;

impl OrderConditionStore for NoOrderConditions {
    type Condition = Infallible;
    type Error = Infallible;

    fn on_create_condition(
        &self,
        _order_id: &str,
    ) -> CustomResult<Option<Self::Condition>, Self::Error> {
        Ok(None)
    }

    fn mark_used_with_order(
        &self,
        condition: &Self::Condition,
        _order_id: &str,
    ) -> CustomResult<(), Self::Error> {
        match *condition {}
    }
}
