//! Catalog extraction strategies.
//!
//! The portal has been served by two API generations. Each one is a
//! [`CatalogStrategy`]; the parser picks one at construction time and never
//! mixes them.

pub mod html;
pub mod service;
pub mod strategy;

pub use html::HtmlStrategy;
pub use service::ServiceStrategy;
pub use strategy::{CatalogStrategy, Route};
