pub mod config;
pub mod document;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod reporting;

pub use document::{DocumentError, DocumentRenderer, TeraDocumentRenderer};
pub use domain::estimate::{EstimateContext, EstimateRecord, LineItem, PricedLineItem};
pub use domain::inventory::{InventorySnapshot, StockDeficit};
pub use domain::job::{ClientId, ClientJob, PurchaseEntry, PurchaseId};
pub use domain::margin::{MarginOverride, MarginSet};
pub use domain::settings::GlobalSettings;
pub use engine::breakdown::ProfitBreakdown;
pub use engine::units::{find_unknown_units, Unit, UnknownUnit};
pub use engine::{
    price_estimate, DeterministicEstimateEngine, EstimateEngine, EstimateEvaluation, PricingResult,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use reporting::ProfitAndLossReport;
