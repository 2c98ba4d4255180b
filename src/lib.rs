//! Sales Lens: filter and summarize tabular office-supplies sales records.
//!
//! The [`data`] module is the UI-free core (load → filter → aggregate →
//! export). The desktop dashboard in the binary target only consumes it.

pub mod data;

pub use data::aggregate::{
    Correlation, Describe, ItemDistribution, NotComputable, Summary, YearMonth, correlation,
    describe, item_distribution, monthly_totals, regional_totals,
};
pub use data::cache::DatasetCache;
pub use data::error::{ExportError, FilterError, LoadError};
pub use data::export::to_csv;
pub use data::filter::{DateRange, FilterCriteria, FilteredView, filter};
pub use data::loader::{Source, load};
pub use data::model::{Dataset, Record};
