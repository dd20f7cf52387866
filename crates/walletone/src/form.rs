//!
//! Signed field list of the WalletOne hosted payment page.
//!
//! Field order matters: the gateway recomputes the signature over the values in the order they
//! were posted.
//!

use error_stack::{report, ResultExt};
use router_env::{instrument, logger, Env};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use time::{
    format_description::BorrowedFormatItem, macros::format_description, OffsetDateTime, UtcOffset,
};

use crate::{
    configs::{DeliveryPolicy, FormSettings},
    consts::{
        fields, DELIVERY_COMMENT_LIMIT, DESCRIPTION_LIMIT, TEST_ORDER_COMMENT, TEST_PAYMENT_PREFIX,
    },
    crypto,
    errors::{CustomResult, FormError},
    interfaces::{OrderConditionStore, PaymentOrder, PaymentVendor, SigningKeySource},
    types::{DeliveryDetails, FieldList},
    utils,
};

const EXPIRED_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");
const DELIVERY_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Builds the payment form of an order.
#[derive(Debug)]
pub struct FormOptions<'a, K, C> {
    settings: &'a FormSettings,
    env: Env,
    keys: &'a K,
    conditions: &'a C,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct OrderItemPayload<'a> {
    title: &'a str,
    quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    sub_total: Decimal,
    tax_type: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    tax: Decimal,
}

impl<'a, K, C> FormOptions<'a, K, C>
where
    K: SigningKeySource,
    C: OrderConditionStore,
{
    pub fn new(settings: &'a FormSettings, env: Env, keys: &'a K, conditions: &'a C) -> Self {
        Self {
            settings,
            env,
            keys,
            conditions,
        }
    }

    /// Fields of the payment form, `WMI_SIGNATURE` last.
    ///
    /// Missing optional order data leaves the matching fields out. When an order condition
    /// enabled the delivery fields, it is marked as used by the order once the form is signed.
    #[instrument(skip_all, fields(vendor_id = vendor.id(), order_id = order.id()))]
    pub fn generate<O, V>(&self, order: &O, vendor: &V) -> CustomResult<FieldList, FormError>
    where
        O: PaymentOrder + ?Sized,
        V: PaymentVendor,
    {
        let (use_delivery, order_condition) = self.delivery_decision(order)?;

        let mut list = FieldList::new();
        self.fill_fields(&mut list, order, vendor, use_delivery)?;
        self.add_signature(&mut list, vendor)?;

        logger::info!(
            vendor_id = vendor.id(),
            order_id = order.id(),
            form = ?list,
            "Generate form"
        );

        if let Some(condition) = order_condition {
            self.conditions
                .mark_used_with_order(&condition, order.id())
                .change_context(FormError::OrderConditionUpdateFailed)
                .attach_printable_lazy(|| format!("order_id: {}", order.id()))?;
        }

        Ok(list)
    }

    fn fill_fields<O, V>(
        &self,
        list: &mut FieldList,
        order: &O,
        vendor: &V,
        use_delivery: bool,
    ) -> CustomResult<(), FormError>
    where
        O: PaymentOrder + ?Sized,
        V: PaymentVendor,
    {
        list.add_text(fields::PAYMENT_NO, order.external_id());
        list.add_text(fields::MERCHANT_ID, vendor.w1_merchant_id());
        list.add_text(
            fields::PAYMENT_AMOUNT,
            &format_amount(order.total_with_delivery_price()),
        );
        list.add_text(fields::DESCRIPTION, &self.payment_description(order));
        list.add_number(fields::CURRENCY_ID, i64::from(order.currency_iso_numeric()));

        self.add_return_urls(list, vendor)?;
        add_payment_methods(list, order);
        add_expired_date(list, order)?;

        if let Some(email) = utils::non_blank(order.email()) {
            list.add_text(fields::CUSTOMER_EMAIL, email);
        } else if let Some(phone) = utils::non_blank(order.phone()) {
            list.add_text(fields::CUSTOMER_PHONE, phone);
        }

        if order.payment_type().sends_order_items() {
            add_order_items(list, order, vendor)?;
        }

        if use_delivery {
            if let Some(delivery) = order.delivery() {
                add_delivery_dates(list, delivery)?;
                self.add_delivery(list, order, delivery);
            }
        }

        Ok(())
    }

    /// Whether delivery fields go into the form, and the order condition that allowed it.
    fn delivery_decision<O>(
        &self,
        order: &O,
    ) -> CustomResult<(bool, Option<C::Condition>), FormError>
    where
        O: PaymentOrder + ?Sized,
    {
        match self.settings.delivery_policy {
            DeliveryPolicy::Disabled => Ok((false, None)),
            DeliveryPolicy::Forced => Ok((order.delivery().is_some(), None)),
            DeliveryPolicy::OrderCondition => {
                let handled_by_gateway = order
                    .delivery()
                    .is_some_and(|delivery| delivery.handled_by_gateway);
                if !handled_by_gateway {
                    return Ok((false, None));
                }

                let condition = self
                    .conditions
                    .on_create_condition(order.id())
                    .change_context(FormError::OrderConditionLookupFailed)
                    .attach_printable_lazy(|| format!("order_id: {}", order.id()))?;
                Ok((condition.is_some(), condition))
            }
        }
    }

    fn payment_description<O>(&self, order: &O) -> String
    where
        O: PaymentOrder + ?Sized,
    {
        let description = if self.env.is_production() {
            order.description().to_string()
        } else {
            format!("{TEST_PAYMENT_PREFIX}{}", order.description())
        };
        utils::truncate_with_omission(&description, DESCRIPTION_LIMIT)
    }

    fn add_return_urls<V>(&self, list: &mut FieldList, vendor: &V) -> CustomResult<(), FormError>
    where
        V: PaymentVendor,
    {
        let success_url = return_url(vendor.home_host(), &self.settings.success_path)?;
        let failure_url = return_url(vendor.home_host(), &self.settings.failure_path)?;
        list.add_text(fields::SUCCESS_URL, &success_url);
        list.add_text(fields::FAIL_URL, &failure_url);
        Ok(())
    }

    fn add_delivery<O>(&self, list: &mut FieldList, order: &O, delivery: &DeliveryDetails)
    where
        O: PaymentOrder + ?Sized,
    {
        list.add_number(fields::DELIVERY_REQUEST, 1);
        list.add_text(fields::DELIVERY_COUNTRY, &delivery.country);
        list.add_text(fields::DELIVERY_CITY, &utils::squish(&delivery.city));
        list.add_text(fields::DELIVERY_ADDRESS, &utils::squish(&delivery.address));
        list.add_text(fields::DELIVERY_CONTACT_INFO, order.phone().unwrap_or_default());
        list.add_text(fields::DELIVERY_COMMENTS, self.delivery_comments(delivery));
        list.add_text(fields::DELIVERY_ORDER_ID, order.external_id());
        // Vendors with skip-instruction enabled on the gateway get their orders confirmed
        // automatically.
        list.add_number(fields::DELIVERY_SKIP_INSTRUCTION, 1);
    }

    fn delivery_comments<'d>(&self, delivery: &'d DeliveryDetails) -> &'d str {
        if self.env.is_production() {
            utils::truncate_chars(
                delivery.comment.as_deref().unwrap_or_default(),
                DELIVERY_COMMENT_LIMIT,
            )
        } else {
            TEST_ORDER_COMMENT
        }
    }

    fn add_signature<V>(&self, list: &mut FieldList, vendor: &V) -> CustomResult<(), FormError>
    where
        V: PaymentVendor,
    {
        let sign_key = self
            .keys
            .merchant_sign_key(vendor)
            .ok_or_else(|| report!(FormError::MissingSigningKey))
            .attach_printable_lazy(|| format!("vendor_id: {}", vendor.id()))?;

        let signature = crypto::generate_signature_from_list(
            list.as_slice(),
            &sign_key,
            self.settings.signature_algorithm,
        )
        .change_context(FormError::SignatureGenerationFailed)?;

        list.add_text(fields::SIGNATURE, &signature);
        Ok(())
    }
}

/// Amount with exactly two decimals, e.g. `1500.00`.
fn format_amount(amount: Decimal) -> String {
    let amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{amount:.2}")
}

/// `path` on the vendor's storefront. Hosts without a scheme are served over https.
fn return_url(home_host: &str, path: &str) -> CustomResult<String, FormError> {
    let home_host = home_host.trim();
    let base = if home_host.contains("://") {
        home_host.to_string()
    } else {
        format!("https://{home_host}")
    };

    let url = url::Url::parse(&base)
        .and_then(|base| base.join(path))
        .change_context(FormError::InvalidReturnUrl)
        .attach_printable_lazy(|| format!("host: {home_host}, path: {path}"))?;

    if url.host_str().is_none() {
        return Err(report!(FormError::InvalidReturnUrl))
            .attach_printable_lazy(|| format!("host: {home_host}, path: {path}"));
    }
    Ok(url.into())
}

fn add_payment_methods<O>(list: &mut FieldList, order: &O)
where
    O: PaymentOrder + ?Sized,
{
    let payment_type = order.payment_type();
    for method in &payment_type.enabled_payment_methods {
        list.add_text(fields::PT_ENABLED, method);
    }
    for method in &payment_type.disabled_payment_methods {
        list.add_text(fields::PT_DISABLED, method);
    }
}

fn add_expired_date<O>(list: &mut FieldList, order: &O) -> CustomResult<(), FormError>
where
    O: PaymentOrder + ?Sized,
{
    let Some(will_cancel_at) = order.will_cancel_at() else {
        return Ok(());
    };
    let expired_date = format_date(
        will_cancel_at.to_offset(UtcOffset::UTC),
        EXPIRED_DATE_FORMAT,
        fields::EXPIRED_DATE,
    )?;
    list.add_text(fields::EXPIRED_DATE, &expired_date);
    Ok(())
}

fn add_order_items<O, V>(list: &mut FieldList, order: &O, vendor: &V) -> CustomResult<(), FormError>
where
    O: PaymentOrder + ?Sized,
    V: PaymentVendor,
{
    let items = order
        .items()
        .iter()
        .map(|item| OrderItemPayload {
            title: &item.title,
            quantity: item.quantity,
            unit_price: item.unit_price,
            sub_total: item.sub_total,
            tax_type: vendor.tax_type(),
            tax: item.tax,
        })
        .collect::<Vec<_>>();

    let payload = serde_json::to_string(&items)
        .change_context(FormError::OrderItemsEncodingFailed)
        .attach_printable_lazy(|| format!("order_id: {}", order.id()))?;
    list.add_text(fields::ORDER_ITEMS, &payload);
    Ok(())
}

/// Both dates or none: the gateway rejects an open interval.
fn add_delivery_dates(
    list: &mut FieldList,
    delivery: &DeliveryDetails,
) -> CustomResult<(), FormError> {
    let (Some(date_from), Some(date_till)) = (delivery.date_from, delivery.date_till) else {
        return Ok(());
    };
    let date_from = format_date(date_from, DELIVERY_DATE_FORMAT, fields::DELIVERY_DATE_FROM)?;
    let date_till = format_date(date_till, DELIVERY_DATE_FORMAT, fields::DELIVERY_DATE_TILL)?;
    list.add_text(fields::DELIVERY_DATE_FROM, &date_from);
    list.add_text(fields::DELIVERY_DATE_TILL, &date_till);
    Ok(())
}

fn format_date(
    date: OffsetDateTime,
    format: &[BorrowedFormatItem<'static>],
    field_name: &'static str,
) -> CustomResult<String, FormError> {
    date.format(format)
        .change_context(FormError::DateFormattingFailed { field_name })
}
