//! Remote raster service contract and backends.
//!
//! The satellite imagery catalog and its distributed reduction engine are an
//! external system. This crate pins down the narrow query contract the
//! pipeline consumes ([`RasterService`]) and provides a deterministic
//! in-memory implementation for tests and demos, so the pipeline is never
//! exercised against a live backend.

pub mod memory;
pub mod scene;
pub mod service;
pub mod timeout;

pub use memory::{GridRaster, MemoryRasterService};
pub use service::{CollectionHandle, ImageRef, RasterService, RasterStoreError, ReducerKind};
pub use timeout::TimeoutRasterService;
