//! Common types and utilities shared across the air-quality analysis services.

pub mod error;
pub mod layer;
pub mod region;
pub mod series;
pub mod time;

pub use error::{AqError, AqResult};
pub use layer::{LayerDescriptor, LayerId};
pub use region::RegionSpec;
pub use series::{SamplePoint, StatisticsRecord, TimeSeries};
pub use time::DateRange;
