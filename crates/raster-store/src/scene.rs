//! Synthetic demo scene for the in-memory backend.
//!
//! A January 2024 archive over the Bangkok rectangle with smooth,
//! deterministic fields for every supported layer: a plume-shaped AOD field
//! that drifts through the month, a few fully cloud-covered AOD days, and
//! flatter trace-gas fields. Values stay inside each layer's documented
//! valid range.

use chrono::{DateTime, TimeZone, Utc};

use aq_common::{LayerDescriptor, LayerId, RegionSpec};

use crate::memory::{GridRaster, MemoryRasterService};

/// The Bangkok study rectangle used by the demo scene.
pub fn bangkok() -> RegionSpec {
    // Constructed from literals; cannot fail.
    RegionSpec::new(100.3, 13.5, 100.9, 14.0).expect("bangkok rectangle is valid")
}

/// AOD days with no valid retrievals at all (full cloud cover).
const CLOUDY_DAYS: [u32; 2] = [8, 22];

const GRID_WIDTH: usize = 24;
const GRID_HEIGHT: usize = 20;

fn utc_day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 3, 30, 0)
        .single()
        .expect("valid demo timestamp")
}

/// Plume-shaped AOD field: a Gaussian bump centered near the city that
/// drifts east through the month, over a slowly varying background.
fn aod_value(lon: f64, lat: f64, day: u32) -> f64 {
    let t = day as f64 / 31.0;
    let center_lon = 100.5 + 0.2 * t;
    let center_lat = 13.75;
    let d2 = (lon - center_lon).powi(2) + (lat - center_lat).powi(2);
    let plume = 0.35 * (-d2 / 0.02).exp();
    let background = 0.25 + 0.1 * (t * std::f64::consts::TAU).sin();
    (background + plume).clamp(0.0, 1.0)
}

fn aod_raster(day: u32) -> GridRaster {
    if CLOUDY_DAYS.contains(&day) {
        return GridRaster::from_fn(bangkok(), GRID_WIDTH, GRID_HEIGHT, |_, _| None);
    }
    GridRaster::from_fn(bangkok(), GRID_WIDTH, GRID_HEIGHT, move |lon, lat| {
        // Scattered invalid pixels in the north-east corner.
        if lon > 100.85 && lat > 13.95 {
            None
        } else {
            Some(aod_value(lon, lat, day))
        }
    })
}

/// Flat trace-gas field spanning a fraction of the layer's valid range.
fn gas_raster(desc: &LayerDescriptor, day: u32) -> GridRaster {
    let span = desc.valid_max - desc.valid_min;
    GridRaster::from_fn(bangkok(), GRID_WIDTH, GRID_HEIGHT, move |lon, _| {
        let gradient = (lon - 100.3) / 0.6;
        let level = 0.2 + 0.4 * gradient + 0.1 * (day as f64 / 31.0);
        Some(desc.valid_min + span * level.clamp(0.0, 0.9))
    })
}

/// Build the demo backend: daily AOD granules for January 2024 plus
/// every-third-day granules for the Sentinel-5P layers.
pub fn demo_service() -> MemoryRasterService {
    let mut svc = MemoryRasterService::new();

    let aod = LayerDescriptor::get(LayerId::Aod);
    for day in 1..=31 {
        svc.add_granule(aod.collection_id, aod.band, utc_day(day), aod_raster(day));
    }

    for &id in &[LayerId::AerosolIndex, LayerId::No2, LayerId::Co] {
        let desc = LayerDescriptor::get(id);
        for day in (1..=31).step_by(3) {
            svc.add_granule(
                desc.collection_id,
                desc.band,
                utc_day(day),
                gas_raster(desc, day),
            );
        }
    }

    svc
}
