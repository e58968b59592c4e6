//! Raster time-series aggregation pipeline.
//!
//! Takes a time-indexed satellite raster collection, filters it by date and
//! region, reduces each image to a scalar regional value, assembles a
//! date-ordered time series, and computes aggregate statistics over the
//! temporal-mean composite of the whole window. All numeric reduction is
//! delegated to a [`raster_store::RasterService`]; this crate owns the
//! orchestration, ordering and absence-of-data semantics.

pub mod analysis;
pub mod overlay;
pub mod query;
pub mod reducer;
pub mod statistics;
pub mod timeseries;

pub use analysis::{run_analysis, AnalysisRequest, LayerAnalysis, LayerOutcome};
pub use overlay::MapOverlay;
pub use query::CollectionQuery;
pub use reducer::{RegionReducer, REDUCTION_SCALE_METERS};
pub use statistics::StatisticsAggregator;
pub use timeseries::TimeSeriesBuilder;
