pub mod settings;

pub use settings::{DeliveryPolicy, FormSettings, OpenApiSettings, Settings};
