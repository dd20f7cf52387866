#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::{cell::RefCell, convert::Infallible};

use masking::Secret;
use proptest::prelude::*;
use router_env::Env;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::{macros::datetime, OffsetDateTime};
use walletone::{
    configs::{DeliveryPolicy, FormSettings},
    consts::{fields, TEST_ORDER_COMMENT},
    crypto::{self, SignatureAlgorithm},
    errors::{CustomResult, FormError},
    interfaces::{
        NoOrderConditions, OrderConditionStore, PaymentOrder, PaymentVendor, SigningKeySource,
    },
    types::{DeliveryDetails, OrderItem, PaymentTypeCapabilities},
    FieldList, FieldValue, FormOptions,
};

const SIGN_KEY: &str = "5a6b4c3d2e1f";

#[derive(Debug, Clone)]
struct TestOrder {
    id: String,
    external_id: String,
    total: Decimal,
    description: String,
    currency: u16,
    email: Option<String>,
    phone: Option<String>,
    will_cancel_at: Option<OffsetDateTime>,
    items: Vec<OrderItem>,
    delivery: Option<DeliveryDetails>,
    payment_type: PaymentTypeCapabilities,
}

impl Default for TestOrder {
    fn default() -> Self {
        Self {
            id: "42".into(),
            external_id: "A-1042".into(),
            total: dec!(1500),
            description: "Заказ №1042".into(),
            currency: 643,
            email: Some("buyer@example.com".into()),
            phone: Some("+79001234567".into()),
            will_cancel_at: None,
            items: Vec::new(),
            delivery: None,
            payment_type: PaymentTypeCapabilities::default(),
        }
    }
}

impl PaymentOrder for TestOrder {
    fn id(&self) -> &str {
        &self.id
    }
    fn external_id(&self) -> &str {
        &self.external_id
    }
    fn total_with_delivery_price(&self) -> Decimal {
        self.total
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn currency_iso_numeric(&self) -> u16 {
        self.currency
    }
    fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
    fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
    fn will_cancel_at(&self) -> Option<OffsetDateTime> {
        self.will_cancel_at
    }
    fn items(&self) -> &[OrderItem] {
        &self.items
    }
    fn delivery(&self) -> Option<&DeliveryDetails> {
        self.delivery.as_ref()
    }
    fn payment_type(&self) -> &PaymentTypeCapabilities {
        &self.payment_type
    }
}

struct TestVendor {
    home_host: String,
}

impl Default for TestVendor {
    fn default() -> Self {
        Self {
            home_host: "shop.example.com".into(),
        }
    }
}

impl PaymentVendor for TestVendor {
    fn id(&self) -> &str {
        "7"
    }
    fn w1_merchant_id(&self) -> &str {
        "128788547235"
    }
    fn home_host(&self) -> &str {
        &self.home_host
    }
    fn tax_type(&self) -> &str {
        "tax_ru_1"
    }
}

struct NoKeys;

impl SigningKeySource for NoKeys {
    fn merchant_sign_key(&self, _vendor: &dyn PaymentVendor) -> Option<Secret<String>> {
        None
    }
}

#[derive(Debug, thiserror::Error)]
#[error("order condition store is unavailable")]
struct StoreError;

/// Hands out a single "on create" condition and records what was marked.
#[derive(Default)]
struct RecordingConditions {
    condition: Option<u32>,
    fail_marking: bool,
    marked: RefCell<Vec<(u32, String)>>,
}

impl OrderConditionStore for RecordingConditions {
    type Condition = u32;
    type Error = StoreError;

    fn on_create_condition(&self, _order_id: &str) -> CustomResult<Option<u32>, StoreError> {
        Ok(self.condition)
    }

    fn mark_used_with_order(&self, condition: &u32, order_id: &str) -> CustomResult<(), StoreError> {
        if self.fail_marking {
            return Err(error_stack::report!(StoreError));
        }
        self.marked
            .borrow_mut()
            .push((*condition, order_id.to_string()));
        Ok(())
    }
}

fn key() -> Secret<String> {
    Secret::new(SIGN_KEY.to_string())
}

fn delivery() -> DeliveryDetails {
    DeliveryDetails {
        handled_by_gateway: true,
        date_from: Some(datetime!(2024-03-02 10:00:00 +03:00)),
        date_till: Some(datetime!(2024-03-02 18:00:00 +03:00)),
        country: "RU".into(),
        city: "  Санкт-\n Петербург ".into(),
        address: "Невский   пр.,  1".into(),
        comment: Some("Позвонить за час".into()),
    }
}

fn generate(order: &TestOrder, env: Env) -> FieldList {
    let settings = FormSettings::default();
    let key = key();
    FormOptions::new(&settings, env, &key, &NoOrderConditions)
        .generate(order, &TestVendor::default())
        .unwrap()
}

fn generate_with<C: OrderConditionStore>(
    order: &TestOrder,
    env: Env,
    policy: DeliveryPolicy,
    conditions: &C,
) -> CustomResult<FieldList, FormError> {
    let settings = FormSettings {
        delivery_policy: policy,
        ..Default::default()
    };
    let key = key();
    FormOptions::new(&settings, env, &key, conditions).generate(order, &TestVendor::default())
}

fn keys(list: &FieldList) -> Vec<&str> {
    list.iter().map(|field| field.key.as_str()).collect()
}

fn text(list: &FieldList, key: &str) -> String {
    list.get(key).unwrap().to_string()
}

#[test]
fn basic_form_in_fixed_order() {
    let list = generate(&TestOrder::default(), Env::Production);

    assert_eq!(
        keys(&list),
        [
            fields::PAYMENT_NO,
            fields::MERCHANT_ID,
            fields::PAYMENT_AMOUNT,
            fields::DESCRIPTION,
            fields::CURRENCY_ID,
            fields::SUCCESS_URL,
            fields::FAIL_URL,
            fields::CUSTOMER_EMAIL,
            fields::SIGNATURE,
        ]
    );
    assert_eq!(text(&list, fields::PAYMENT_NO), "A-1042");
    assert_eq!(text(&list, fields::MERCHANT_ID), "128788547235");
    assert_eq!(text(&list, fields::PAYMENT_AMOUNT), "1500.00");
    assert_eq!(text(&list, fields::DESCRIPTION), "Заказ №1042");
    assert_eq!(list.get(fields::CURRENCY_ID), Some(&FieldValue::Number(643)));
    assert_eq!(
        text(&list, fields::SUCCESS_URL),
        "https://shop.example.com/vendor/payments/w1/success"
    );
    assert_eq!(
        text(&list, fields::FAIL_URL),
        "https://shop.example.com/vendor/payments/w1/failure"
    );
    assert_eq!(text(&list, fields::CUSTOMER_EMAIL), "buyer@example.com");
}

#[test]
fn signature_covers_every_field_before_it() {
    let list = generate(&TestOrder::default(), Env::Production);

    let expected = crypto::generate_signature_from_list(
        list.unsigned_fields(),
        &key(),
        SignatureAlgorithm::Md5,
    )
    .unwrap();
    assert_eq!(list.signature().unwrap().to_string(), expected);
    assert!(crypto::verify_signature(list.as_slice(), &key(), SignatureAlgorithm::Md5).unwrap());
    assert_eq!(list.get_all(fields::SIGNATURE).count(), 1);
}

#[test]
fn sha1_signature_when_configured() {
    let settings = FormSettings {
        signature_algorithm: SignatureAlgorithm::Sha1,
        ..Default::default()
    };
    let key = key();
    let list = FormOptions::new(&settings, Env::Production, &key, &NoOrderConditions)
        .generate(&TestOrder::default(), &TestVendor::default())
        .unwrap();

    assert!(crypto::verify_signature(list.as_slice(), &key, SignatureAlgorithm::Sha1).unwrap());
    assert!(!crypto::verify_signature(list.as_slice(), &key, SignatureAlgorithm::Md5).unwrap());
}

#[test]
fn generation_is_deterministic() {
    let order = TestOrder {
        will_cancel_at: Some(datetime!(2024-03-01 15:30:00 +03:00)),
        ..Default::default()
    };
    assert_eq!(generate(&order, Env::Sandbox), generate(&order, Env::Sandbox));
}

#[test]
fn payment_methods_keep_reported_order() {
    let order = TestOrder {
        payment_type: PaymentTypeCapabilities {
            enabled_payment_methods: vec!["CreditCardRUB".into(), "QiwiWalletRUB".into()],
            disabled_payment_methods: vec!["CashTerminalRUB".into()],
            ..Default::default()
        },
        ..Default::default()
    };
    let list = generate(&order, Env::Production);

    let methods = list
        .iter()
        .filter(|field| field.key == fields::PT_ENABLED || field.key == fields::PT_DISABLED)
        .map(|field| (field.key.as_str(), field.value.to_string()))
        .collect::<Vec<_>>();
    assert_eq!(
        methods,
        [
            (fields::PT_ENABLED, "CreditCardRUB".to_string()),
            (fields::PT_ENABLED, "QiwiWalletRUB".to_string()),
            (fields::PT_DISABLED, "CashTerminalRUB".to_string()),
        ]
    );
    let position = |key| keys(&list).iter().position(|k| *k == key).unwrap();
    assert!(position(fields::FAIL_URL) < position(fields::PT_ENABLED));
}

#[test]
fn expired_date_only_with_deadline() {
    let list = generate(&TestOrder::default(), Env::Production);
    assert!(!list.contains_key(fields::EXPIRED_DATE));

    let order = TestOrder {
        will_cancel_at: Some(datetime!(2024-03-01 15:30:00 +03:00)),
        ..Default::default()
    };
    let list = generate(&order, Env::Production);
    assert_eq!(text(&list, fields::EXPIRED_DATE), "2024-03-01T12:30:00Z");
}

#[test]
fn phone_only_without_email() {
    let list = generate(&TestOrder::default(), Env::Production);
    assert!(!list.contains_key(fields::CUSTOMER_PHONE));

    let order = TestOrder {
        email: Some("  ".into()),
        ..Default::default()
    };
    let list = generate(&order, Env::Production);
    assert!(!list.contains_key(fields::CUSTOMER_EMAIL));
    assert_eq!(text(&list, fields::CUSTOMER_PHONE), "+79001234567");

    let order = TestOrder {
        email: None,
        phone: None,
        ..Default::default()
    };
    let list = generate(&order, Env::Production);
    assert!(!list.contains_key(fields::CUSTOMER_EMAIL));
    assert!(!list.contains_key(fields::CUSTOMER_PHONE));
}

#[test]
fn order_items_only_with_default_kassa_provider() {
    let items = vec![OrderItem {
        title: "Чайник".into(),
        quantity: 2,
        unit_price: dec!(750),
        sub_total: dec!(1500),
        tax: dec!(250.5),
    }];
    let mut order = TestOrder {
        items,
        payment_type: PaymentTypeCapabilities {
            online_kassa_enabled: true,
            online_kassa_provider_is_default: false,
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(!generate(&order, Env::Production).contains_key(fields::ORDER_ITEMS));

    order.payment_type.online_kassa_provider_is_default = true;
    let list = generate(&order, Env::Production);
    assert_eq!(
        text(&list, fields::ORDER_ITEMS),
        r#"[{"Title":"Чайник","Quantity":2,"UnitPrice":750.0,"SubTotal":1500.0,"TaxType":"tax_ru_1","Tax":250.5}]"#
    );
}

#[test]
fn test_marker_outside_production() {
    let list = generate(&TestOrder::default(), Env::Sandbox);
    assert_eq!(
        text(&list, fields::DESCRIPTION),
        "Тестовый платеж! Заказ №1042"
    );
}

#[test]
fn long_description_is_truncated() {
    let order = TestOrder {
        description: "д".repeat(400),
        ..Default::default()
    };
    for env in [Env::Production, Env::Development] {
        let description = text(&generate(&order, env), fields::DESCRIPTION);
        assert_eq!(description.chars().count(), 250);
        assert!(description.ends_with("..."));
    }
}

#[test]
fn unmappable_characters_become_placeholders() {
    let order = TestOrder {
        description: "Подарок 🎁 для 日本".into(),
        ..Default::default()
    };
    let list = generate(&order, Env::Production);
    assert_eq!(text(&list, fields::DESCRIPTION), "Подарок ? для ??");
    assert!(crypto::verify_signature(list.as_slice(), &key(), SignatureAlgorithm::Md5).unwrap());
}

#[test]
fn delivery_disabled_by_default() {
    let conditions = RecordingConditions {
        condition: Some(5),
        ..Default::default()
    };
    let order = TestOrder {
        delivery: Some(delivery()),
        ..Default::default()
    };
    let list = generate_with(&order, Env::Production, DeliveryPolicy::Disabled, &conditions).unwrap();

    assert!(!list.contains_key(fields::DELIVERY_REQUEST));
    assert!(conditions.marked.borrow().is_empty());
}

#[test]
fn delivery_fields_with_order_condition() {
    let conditions = RecordingConditions {
        condition: Some(5),
        ..Default::default()
    };
    let order = TestOrder {
        delivery: Some(delivery()),
        ..Default::default()
    };
    let list = generate_with(
        &order,
        Env::Production,
        DeliveryPolicy::OrderCondition,
        &conditions,
    )
    .unwrap();

    let delivery_keys = keys(&list)
        .into_iter()
        .skip_while(|key| *key != fields::DELIVERY_DATE_FROM)
        .collect::<Vec<_>>();
    assert_eq!(
        delivery_keys,
        [
            fields::DELIVERY_DATE_FROM,
            fields::DELIVERY_DATE_TILL,
            fields::DELIVERY_REQUEST,
            fields::DELIVERY_COUNTRY,
            fields::DELIVERY_CITY,
            fields::DELIVERY_ADDRESS,
            fields::DELIVERY_CONTACT_INFO,
            fields::DELIVERY_COMMENTS,
            fields::DELIVERY_ORDER_ID,
            fields::DELIVERY_SKIP_INSTRUCTION,
            fields::SIGNATURE,
        ]
    );
    assert_eq!(text(&list, fields::DELIVERY_DATE_FROM), "2024-03-02T10:00:00");
    assert_eq!(list.get(fields::DELIVERY_REQUEST), Some(&FieldValue::Number(1)));
    assert_eq!(text(&list, fields::DELIVERY_CITY), "Санкт- Петербург");
    assert_eq!(text(&list, fields::DELIVERY_ADDRESS), "Невский пр., 1");
    assert_eq!(text(&list, fields::DELIVERY_CONTACT_INFO), "+79001234567");
    assert_eq!(text(&list, fields::DELIVERY_COMMENTS), "Позвонить за час");
    assert_eq!(text(&list, fields::DELIVERY_ORDER_ID), "A-1042");
    assert_eq!(*conditions.marked.borrow(), [(5, "42".to_string())]);
}

#[test]
fn no_condition_means_no_delivery() {
    let conditions = RecordingConditions::default();
    let order = TestOrder {
        delivery: Some(delivery()),
        ..Default::default()
    };
    let list = generate_with(
        &order,
        Env::Production,
        DeliveryPolicy::OrderCondition,
        &conditions,
    )
    .unwrap();
    assert!(!list.contains_key(fields::DELIVERY_REQUEST));

    let order = TestOrder {
        delivery: Some(DeliveryDetails {
            handled_by_gateway: false,
            ..delivery()
        }),
        ..Default::default()
    };
    let conditions = RecordingConditions {
        condition: Some(5),
        ..Default::default()
    };
    let list = generate_with(
        &order,
        Env::Production,
        DeliveryPolicy::OrderCondition,
        &conditions,
    )
    .unwrap();
    assert!(!list.contains_key(fields::DELIVERY_REQUEST));
    assert!(conditions.marked.borrow().is_empty());
}

#[test]
fn condition_is_marked_on_every_generation() {
    let conditions = RecordingConditions {
        condition: Some(5),
        ..Default::default()
    };
    let order = TestOrder {
        delivery: Some(delivery()),
        ..Default::default()
    };
    for _ in 0..2 {
        generate_with(
            &order,
            Env::Production,
            DeliveryPolicy::OrderCondition,
            &conditions,
        )
        .unwrap();
    }
    assert_eq!(conditions.marked.borrow().len(), 2);
}

#[test]
fn forced_delivery_skips_condition_lookup() {
    let conditions = RecordingConditions {
        condition: Some(5),
        ..Default::default()
    };
    let order = TestOrder {
        phone: None,
        delivery: Some(DeliveryDetails {
            date_till: None,
            comment: Some("к".repeat(300)),
            ..delivery()
        }),
        ..Default::default()
    };
    let list = generate_with(&order, Env::Production, DeliveryPolicy::Forced, &conditions).unwrap();

    assert!(!list.contains_key(fields::DELIVERY_DATE_FROM));
    assert!(!list.contains_key(fields::DELIVERY_DATE_TILL));
    assert_eq!(text(&list, fields::DELIVERY_CONTACT_INFO), "");
    assert_eq!(text(&list, fields::DELIVERY_COMMENTS).chars().count(), 255);
    assert!(conditions.marked.borrow().is_empty());
}

#[test]
fn delivery_comment_replaced_outside_production() {
    let order = TestOrder {
        delivery: Some(delivery()),
        ..Default::default()
    };
    let list =
        generate_with(&order, Env::Sandbox, DeliveryPolicy::Forced, &NoOrderConditions).unwrap();
    assert_eq!(text(&list, fields::DELIVERY_COMMENTS), TEST_ORDER_COMMENT);
}

#[test]
fn failed_condition_marking_is_an_error() {
    let conditions = RecordingConditions {
        condition: Some(5),
        fail_marking: true,
        ..Default::default()
    };
    let order = TestOrder {
        delivery: Some(delivery()),
        ..Default::default()
    };
    let error = generate_with(
        &order,
        Env::Production,
        DeliveryPolicy::OrderCondition,
        &conditions,
    )
    .unwrap_err();
    assert!(matches!(
        error.current_context(),
        FormError::OrderConditionUpdateFailed
    ));
}

#[test]
fn configuration_errors() {
    let settings = FormSettings::default();
    let vendor = TestVendor {
        home_host: String::new(),
    };
    let key = key();
    let error = FormOptions::new(&settings, Env::Production, &key, &NoOrderConditions)
        .generate(&TestOrder::default(), &vendor)
        .unwrap_err();
    assert!(matches!(error.current_context(), FormError::InvalidReturnUrl));

    let error = FormOptions::new(&settings, Env::Production, &NoKeys, &NoOrderConditions)
        .generate(&TestOrder::default(), &TestVendor::default())
        .unwrap_err();
    assert!(matches!(error.current_context(), FormError::MissingSigningKey));
}

#[test]
fn no_order_conditions_never_hands_out_one() {
    let condition: Option<Infallible> = NoOrderConditions.on_create_condition("42").unwrap();
    assert!(condition.is_none());
}

proptest! {
    #[test]
    fn description_and_comments_stay_within_limits(
        description in ".{0,600}",
        comment in ".{0,600}",
        production in any::<bool>(),
    ) {
        let env = if production { Env::Production } else { Env::Development };
        let order = TestOrder {
            description,
            delivery: Some(DeliveryDetails { comment: Some(comment), ..delivery() }),
            ..Default::default()
        };
        let list = generate_with(&order, env, DeliveryPolicy::Forced, &NoOrderConditions).unwrap();

        prop_assert!(text(&list, fields::DESCRIPTION).chars().count() <= 250);
        let comments = text(&list, fields::DELIVERY_COMMENTS);
        if production {
            prop_assert!(comments.chars().count() <= 255);
        } else {
            prop_assert_eq!(comments, TEST_ORDER_COMMENT);
        }
        prop_assert!(crypto::verify_signature(list.as_slice(), &key(), SignatureAlgorithm::Md5).unwrap());
    }
}
