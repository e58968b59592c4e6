//! Data layer definitions and the static layer registry.

use serde::{Deserialize, Serialize};

use crate::error::{AqError, AqResult};

/// Identifier for a supported air-quality data layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerId {
    /// MODIS aerosol optical depth, a proxy for ground-level PM2.5.
    Aod,
    /// Sentinel-5P UV absorbing aerosol index.
    AerosolIndex,
    /// Sentinel-5P NO2 column density (traffic/industrial indicator).
    No2,
    /// Sentinel-5P CO column density.
    Co,
}

impl LayerId {
    /// All supported layers, in display order.
    pub fn all() -> &'static [LayerId] {
        &[
            LayerId::Aod,
            LayerId::AerosolIndex,
            LayerId::No2,
            LayerId::Co,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerId::Aod => "aod",
            LayerId::AerosolIndex => "aerosol_index",
            LayerId::No2 => "no2",
            LayerId::Co => "co",
        }
    }

    /// Parse a layer identifier. Unknown names are a request error, caught
    /// before any remote call is made.
    pub fn parse(s: &str) -> AqResult<Self> {
        match s {
            "aod" => Ok(LayerId::Aod),
            "aerosol_index" => Ok(LayerId::AerosolIndex),
            "no2" => Ok(LayerId::No2),
            "co" => Ok(LayerId::Co),
            other => Err(AqError::UnknownLayer(other.to_string())),
        }
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one data layer: where it lives in the satellite
/// archive and how to display it.
#[derive(Debug, Clone, Serialize)]
pub struct LayerDescriptor {
    pub id: LayerId,
    /// Human-readable title.
    pub title: &'static str,
    /// Remote collection identifier.
    pub collection_id: &'static str,
    /// Band to select within the collection.
    pub band: &'static str,
    /// Documented valid range of band values; out-of-range regional means
    /// indicate a reducer or filter bug.
    pub valid_min: f64,
    pub valid_max: f64,
    /// Display palette, low to high.
    pub palette: &'static [&'static str],
    /// Display opacity for the map overlay.
    pub opacity: f64,
    /// Units of the band values (empty for dimensionless indices).
    pub units: &'static str,
}

static LAYERS: [LayerDescriptor; 4] = [
    LayerDescriptor {
        id: LayerId::Aod,
        title: "Aerosol Optical Depth (PM2.5 proxy)",
        collection_id: "MODIS/061/MCD19A2_GRANULES",
        band: "Optical_Depth_047",
        valid_min: 0.0,
        valid_max: 1.0,
        palette: &["green", "yellow", "orange", "red", "purple", "maroon"],
        opacity: 0.7,
        units: "",
    },
    LayerDescriptor {
        id: LayerId::AerosolIndex,
        title: "Absorbing Aerosol Index",
        collection_id: "COPERNICUS/S5P/NRTI/L3_AER_AI",
        band: "absorbing_aerosol_index",
        valid_min: -1.0,
        valid_max: 2.0,
        palette: &["blue", "green", "yellow", "orange", "red"],
        opacity: 0.6,
        units: "",
    },
    LayerDescriptor {
        id: LayerId::No2,
        title: "NO2 Concentration",
        collection_id: "COPERNICUS/S5P/NRTI/L3_NO2",
        band: "NO2_column_number_density",
        valid_min: 0.0,
        valid_max: 0.0002,
        palette: &["black", "blue", "purple", "cyan", "green", "yellow", "red"],
        opacity: 0.6,
        units: "mol/m^2",
    },
    LayerDescriptor {
        id: LayerId::Co,
        title: "CO Concentration",
        collection_id: "COPERNICUS/S5P/NRTI/L3_CO",
        band: "CO_column_number_density",
        valid_min: 0.0,
        valid_max: 0.05,
        palette: &["black", "blue", "purple", "cyan", "green", "yellow", "red"],
        opacity: 0.6,
        units: "mol/m^2",
    },
];

impl LayerDescriptor {
    /// The full layer registry. Read-only reference data, initialized once.
    pub fn registry() -> &'static [LayerDescriptor] {
        &LAYERS
    }

    /// Look up the descriptor for a layer.
    pub fn get(id: LayerId) -> &'static LayerDescriptor {
        match id {
            LayerId::Aod => &LAYERS[0],
            LayerId::AerosolIndex => &LAYERS[1],
            LayerId::No2 => &LAYERS[2],
            LayerId::Co => &LAYERS[3],
        }
    }

    /// Look up a descriptor by its string identifier.
    pub fn lookup(name: &str) -> AqResult<&'static LayerDescriptor> {
        Ok(Self::get(LayerId::parse(name)?))
    }

    /// Whether a regional mean is within the documented valid range.
    pub fn value_in_range(&self, value: f64) -> bool {
        value >= self.valid_min && value <= self.valid_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_all_layers() {
        for &id in LayerId::all() {
            let desc = LayerDescriptor::get(id);
            assert_eq!(desc.id, id);
            assert!(desc.valid_min < desc.valid_max);
            assert!(!desc.palette.is_empty());
            assert!(desc.opacity > 0.0 && desc.opacity <= 1.0);
        }
    }

    #[test]
    fn test_parse_roundtrip() {
        for &id in LayerId::all() {
            assert_eq!(LayerId::parse(id.as_str()).unwrap(), id);
        }
    }

    #[test]
    fn test_unknown_layer() {
        let err = LayerDescriptor::lookup("pm10").unwrap_err();
        assert!(matches!(err, AqError::UnknownLayer(_)));
    }

    #[test]
    fn test_aod_descriptor() {
        let aod = LayerDescriptor::get(LayerId::Aod);
        assert_eq!(aod.collection_id, "MODIS/061/MCD19A2_GRANULES");
        assert_eq!(aod.band, "Optical_Depth_047");
        assert!(aod.value_in_range(0.3));
        assert!(!aod.value_in_range(1.5));
    }
}
