//! Constants of the WalletOne protocol.

/// Byte written in place of characters Windows-1251 cannot represent.
pub const CP1251_PLACEHOLDER: u8 = b'?';

/// Maximum number of characters the gateway accepts in `WMI_DESCRIPTION`.
pub const DESCRIPTION_LIMIT: usize = 250;

/// Maximum number of characters kept from the customer's delivery comment.
pub const DELIVERY_COMMENT_LIMIT: usize = 255;

/// Appended to a description that had to be cut.
pub const TRUNCATION_OMISSION: &str = "...";

/// Prefix of every payment description outside production.
pub const TEST_PAYMENT_PREFIX: &str = "Тестовый платеж! ";

/// Delivery comment sent instead of the customer's one outside production.
pub const TEST_ORDER_COMMENT: &str = "ТЕСТОВЫЙ ЗАКАЗ. НЕ ВЫПОЛНЯТЬ!";

/// Default base URL of the Open API.
pub const OPEN_API_BASE_URL: &str = "https://api.w1.ru/OpenApi/";

/// Versioned vendor media type, sent as both `Accept` and `Content-Type`.
pub const OPEN_API_MEDIA_TYPE: &str = "application/vnd.wallet.openapi.v1+json";

/// Default Open API request timeout.
pub const OPEN_API_TIMEOUT_MS: u64 = 1_000;

/// Payment form field names.
pub mod fields {
    pub const PAYMENT_NO: &str = "WMI_PAYMENT_NO";
    pub const MERCHANT_ID: &str = "WMI_MERCHANT_ID";
    pub const PAYMENT_AMOUNT: &str = "WMI_PAYMENT_AMOUNT";
    pub const DESCRIPTION: &str = "WMI_DESCRIPTION";
    pub const CURRENCY_ID: &str = "WMI_CURRENCY_ID";
    pub const SUCCESS_URL: &str = "WMI_SUCCESS_URL";
    pub const FAIL_URL: &str = "WMI_FAIL_URL";
    pub const PT_ENABLED: &str = "WMI_PTENABLED";
    pub const PT_DISABLED: &str = "WMI_PTDISABLED";
    pub const EXPIRED_DATE: &str = "WMI_EXPIRED_DATE";
    pub const CUSTOMER_EMAIL: &str = "WMI_CUSTOMER_EMAIL";
    pub const CUSTOMER_PHONE: &str = "WMI_CUSTOMER_PHONE";
    pub const ORDER_ITEMS: &str = "WMI_ORDER_ITEMS";
    pub const DELIVERY_DATE_FROM: &str = "WMI_DELIVERY_DATEFROM";
    pub const DELIVERY_DATE_TILL: &str = "WMI_DELIVERY_DATETILL";
    pub const DELIVERY_REQUEST: &str = "WMI_DELIVERY_REQUEST";
    pub const DELIVERY_COUNTRY: &str = "WMI_DELIVERY_COUNTRY";
    pub const DELIVERY_CITY: &str = "WMI_DELIVERY_CITY";
    pub const DELIVERY_ADDRESS: &str = "WMI_DELIVERY_ADDRESS";
    pub const DELIVERY_CONTACT_INFO: &str = "WMI_DELIVERY_CONTACTINFO";
    pub const DELIVERY_COMMENTS: &str = "WMI_DELIVERY_COMMENTS";
    pub const DELIVERY_ORDER_ID: &str = "WMI_DELIVERY_ORDERID";
    pub const DELIVERY_SKIP_INSTRUCTION: &str = "WMI_DELIVERY_SKIPINSTRUCTION";
    pub const SIGNATURE: &str = "WMI_SIGNATURE";
}

pub(crate) mod headers {
    pub const ACCEPT: &str = "Accept";
    pub const CONTENT_TYPE: &str = "Content-Type";
}
