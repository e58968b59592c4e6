//! Multi-layer analysis driver.

use serde::Serialize;
use tracing::warn;

use aq_common::{AqError, AqResult, DateRange, LayerId, RegionSpec, StatisticsRecord, TimeSeries};
use raster_store::RasterService;

use crate::overlay::MapOverlay;
use crate::query::CollectionQuery;
use crate::statistics::StatisticsAggregator;
use crate::timeseries::TimeSeriesBuilder;

/// One analysis request: which layers are active, over which window and
/// region. Layers are toggled independently; zero, one or many may be
/// active.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub layers: Vec<LayerId>,
    pub range: DateRange,
    pub region: RegionSpec,
}

/// Complete per-layer result.
#[derive(Debug, Clone, Serialize)]
pub struct LayerAnalysis {
    pub layer: LayerId,
    /// Date-ordered regional mean series.
    pub series: TimeSeries,
    /// Descriptive statistics of the series values over time.
    pub temporal: StatisticsRecord,
    /// Spatial statistics of the temporal mean composite. Answers a
    /// different question than `temporal`; keep them apart.
    pub spatial: StatisticsRecord,
    /// Renderable composite plus display mapping for the map widget.
    pub overlay: MapOverlay,
}

/// Outcome for one requested layer. Failures are carried per-layer so the
/// caller can render successes and failures side by side.
#[derive(Debug)]
pub struct LayerOutcome {
    pub layer: LayerId,
    pub result: AqResult<LayerAnalysis>,
}

/// Run the full pipeline for every requested layer.
///
/// Each layer is one independent pipeline invocation against its own
/// filtered collection; a `ServiceUnavailable` or `ReductionFailed` on one
/// layer never aborts the others.
pub async fn run_analysis(svc: &dyn RasterService, req: &AnalysisRequest) -> Vec<LayerOutcome> {
    let mut outcomes = Vec::with_capacity(req.layers.len());
    for &layer in &req.layers {
        let result = analyze_layer(svc, layer, req.range, req.region).await;
        if let Err(err) = &result {
            warn!(layer = %layer, error = %err, "layer analysis failed");
        }
        outcomes.push(LayerOutcome { layer, result });
    }
    outcomes
}

/// Run the pipeline for a single layer: filter once, then derive the time
/// series, the composite statistics and the overlay from the same handle.
pub async fn analyze_layer(
    svc: &dyn RasterService,
    layer: LayerId,
    range: DateRange,
    region: RegionSpec,
) -> Result<LayerAnalysis, AqError> {
    let handle = CollectionQuery::new(layer, range, region).run(svc).await?;

    let series = TimeSeriesBuilder::new(svc).build(&handle, &region).await?;
    let temporal = series.summary();
    let spatial = StatisticsAggregator::new(svc)
        .aggregate(&handle, &region)
        .await?;
    let overlay = MapOverlay::build(svc, &handle, layer).await?;

    Ok(LayerAnalysis {
        layer,
        series,
        temporal,
        spatial,
        overlay,
    })
}
