//! Core module - stock model, condensation and persistence

pub mod condense;
pub mod config;
pub mod dialog;
pub mod item;
pub mod ops;
pub mod project;
pub mod schema;
pub mod status;
pub mod store;
pub mod validate;

pub use condense::{condense, sort_groups, sorted_groups, CondensedGroup};
pub use config::Config;
pub use dialog::{Dialog, DialogState, Mutation};
pub use item::{GroupKey, Identity, LineItem};
pub use ops::OpError;
pub use project::{Project, ProjectError};
pub use schema::CategorySchema;
pub use status::{StockStatus, Thresholds};
pub use store::{Inventory, LoadReport, StoreError};
pub use validate::{ItemInput, ValidationError};
