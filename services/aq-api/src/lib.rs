//! Air-quality analysis API library.
//!
//! Serves the raster time-series pipeline over HTTP: layer registry, map
//! overlays, regional time series (JSON and CSV) and aggregate statistics.

pub mod config;
pub mod handlers;
pub mod state;
