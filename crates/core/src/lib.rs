pub mod catalog;
pub mod config;
pub mod domain;
pub mod extract;
pub mod session;
pub mod validation;

pub use catalog::{CatalogEntry, ProductCatalog, DEFAULT_PRODUCT};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use domain::chat::{ChatRole, ChatTurn, TurnMeta, TurnResult};
pub use domain::order::{Order, OrderData, OrderId};
pub use extract::{ActionFlags, ACTION_SHOW_FORM, ACTION_SUBMIT_ORDER};
pub use session::{OrderDraft, SessionStore, REQUIRED_SLOTS};
pub use validation::{validate_order_fields, ValidationReport, VALID_FEEDBACK};
