pub mod config;
pub mod orders;
pub mod period;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, WebhookConfig};
pub use orders::{
    order_line_query, order_query, resolve_order_type, FilterOperator, OrderError, OrderResource,
    QueryFilter, QueryOptions, QueryPayload,
};
pub use period::{resolve, DateRange, PeriodError, PeriodRule};
