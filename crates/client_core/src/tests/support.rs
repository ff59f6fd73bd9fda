use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex as StdMutex,
    },
};

use async_trait::async_trait;
use reqwest::StatusCode;
use shared::{
    domain::{DistrictId, LatLng, LatLngBounds},
    protocol::{parse_boundary, Boundary, District, Endpoint, Hotel, PopulationPoint},
};
use tokio::sync::{oneshot, Mutex};

use crate::{
    error::FetchError,
    layers::LayerKind,
    source::MapDataSource,
    style::{BoundaryStyle, HeatLayerOptions},
    surface::{HotelMarker, LayerId, MapSurface},
};

pub(crate) const SQUARE_BOUNDARY: &str = r#"{"type": "Polygon", "coordinates": [[[2.10, 41.30], [2.20, 41.30], [2.20, 41.40], [2.10, 41.40], [2.10, 41.30]]]}"#;

pub(crate) fn square_boundary() -> Boundary {
    parse_boundary(SQUARE_BOUNDARY.as_bytes()).expect("square boundary")
}

pub(crate) fn point(lat: f64, lng: f64, intensity: f64) -> PopulationPoint {
    PopulationPoint {
        position: LatLng::new(lat, lng),
        intensity,
    }
}

pub(crate) fn hotel(name: &str, district: &str) -> Hotel {
    Hotel {
        name: name.to_string(),
        district: district.to_string(),
        location: LatLng::new(41.39, 2.17),
    }
}

pub(crate) fn backend_failure(endpoint: Endpoint) -> FetchError {
    FetchError::Status {
        endpoint,
        status: StatusCode::INTERNAL_SERVER_ERROR,
        detail: Some("backend exploded".to_string()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SurfaceOp {
    AddHeat { id: LayerId, points: usize },
    AddBoundary { id: LayerId },
    AddCluster { id: LayerId, markers: usize },
    Remove(LayerId),
    FitBounds(LatLngBounds),
    Alert(String),
    DistrictOptions(usize),
}

/// In-memory surface that tracks which layers are live.
#[derive(Default)]
pub(crate) struct RecordingSurface {
    next_id: AtomicU64,
    live: StdMutex<BTreeMap<LayerId, LayerKind>>,
    ops: StdMutex<Vec<SurfaceOp>>,
    heat_points: StdMutex<Vec<Vec<PopulationPoint>>>,
    markers: StdMutex<Vec<Vec<HotelMarker>>>,
}

impl RecordingSurface {
    fn add(&self, kind: LayerKind) -> LayerId {
        let id = LayerId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.live.lock().expect("live").insert(id, kind);
        id
    }

    fn record(&self, op: SurfaceOp) {
        self.ops.lock().expect("ops").push(op);
    }

    pub(crate) fn live_count(&self, kind: LayerKind) -> usize {
        self.live
            .lock()
            .expect("live")
            .values()
            .filter(|live| **live == kind)
            .count()
    }

    pub(crate) fn live_total(&self) -> usize {
        self.live.lock().expect("live").len()
    }

    pub(crate) fn ops(&self) -> Vec<SurfaceOp> {
        self.ops.lock().expect("ops").clone()
    }

    pub(crate) fn alerts(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                SurfaceOp::Alert(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn fitted_bounds(&self) -> Vec<LatLngBounds> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                SurfaceOp::FitBounds(bounds) => Some(bounds),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn last_heat_points(&self) -> Option<Vec<PopulationPoint>> {
        self.heat_points.lock().expect("heat").last().cloned()
    }

    pub(crate) fn last_markers(&self) -> Option<Vec<HotelMarker>> {
        self.markers.lock().expect("markers").last().cloned()
    }
}

impl MapSurface for RecordingSurface {
    fn add_heat_layer(&self, points: &[PopulationPoint], _options: &HeatLayerOptions) -> LayerId {
        let id = self.add(LayerKind::Heat);
        self.heat_points.lock().expect("heat").push(points.to_vec());
        self.record(SurfaceOp::AddHeat {
            id,
            points: points.len(),
        });
        id
    }

    fn add_boundary_layer(&self, _boundary: &Boundary, _style: &BoundaryStyle) -> LayerId {
        let id = self.add(LayerKind::Boundary);
        self.record(SurfaceOp::AddBoundary { id });
        id
    }

    fn add_marker_cluster(&self, markers: &[HotelMarker]) -> LayerId {
        let id = self.add(LayerKind::HotelCluster);
        self.markers.lock().expect("markers").push(markers.to_vec());
        self.record(SurfaceOp::AddCluster {
            id,
            markers: markers.len(),
        });
        id
    }

    fn remove_layer(&self, layer: LayerId) {
        let removed = self.live.lock().expect("live").remove(&layer);
        assert!(removed.is_some(), "removed a layer that is not live: {layer:?}");
        self.record(SurfaceOp::Remove(layer));
    }

    fn fit_bounds(&self, bounds: LatLngBounds) {
        self.record(SurfaceOp::FitBounds(bounds));
    }

    fn alert(&self, message: &str) {
        self.record(SurfaceOp::Alert(message.to_string()));
    }

    fn set_district_options(&self, districts: &[District]) {
        self.record(SurfaceOp::DistrictOptions(districts.len()));
    }
}

/// Data source with canned answers. Population requests for a gated year wait
/// until the gate is released.
#[derive(Default)]
pub(crate) struct ScriptedSource {
    pub(crate) districts: Option<Vec<District>>,
    pub(crate) boundaries: HashMap<String, Boundary>,
    pub(crate) failing_boundaries: Vec<String>,
    pub(crate) population: HashMap<u16, Vec<PopulationPoint>>,
    pub(crate) population_fails: bool,
    pub(crate) hotels: Option<Vec<Hotel>>,
    gates: Mutex<HashMap<u16, oneshot::Receiver<()>>>,
    calls: StdMutex<Vec<String>>,
}

impl ScriptedSource {
    pub(crate) async fn gate_year(&self, year: u16) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().await.insert(year, rx);
        tx
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls").push(call);
    }
}

#[async_trait]
impl MapDataSource for ScriptedSource {
    async fn districts(&self) -> Result<Vec<District>, FetchError> {
        self.record("districts".to_string());
        self.districts
            .clone()
            .ok_or_else(|| backend_failure(Endpoint::Districts))
    }

    async fn population(
        &self,
        year: u16,
        district: Option<&DistrictId>,
    ) -> Result<Vec<PopulationPoint>, FetchError> {
        self.record(match district {
            Some(district) => format!("population:{year}:{district}"),
            None => format!("population:{year}"),
        });
        let gate = self.gates.lock().await.remove(&year);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.population_fails {
            return Err(backend_failure(Endpoint::PopulationData));
        }
        Ok(self.population.get(&year).cloned().unwrap_or_default())
    }

    async fn boundary(&self, district: &DistrictId) -> Result<Option<Boundary>, FetchError> {
        self.record(format!("boundary:{district}"));
        if self.failing_boundaries.iter().any(|d| d == district.as_str()) {
            return Err(backend_failure(Endpoint::Boundaries));
        }
        Ok(self.boundaries.get(district.as_str()).cloned())
    }

    async fn hotels(&self) -> Result<Vec<Hotel>, FetchError> {
        self.record("hotels".to_string());
        self.hotels
            .clone()
            .ok_or_else(|| backend_failure(Endpoint::Hotels))
    }
}

pub(crate) fn synchronizer(
    source: ScriptedSource,
) -> (
    Arc<crate::sync::ViewSynchronizer>,
    Arc<ScriptedSource>,
    Arc<RecordingSurface>,
) {
    let source = Arc::new(source);
    let surface = Arc::new(RecordingSurface::default());
    let sync = Arc::new(crate::sync::ViewSynchronizer::new(
        source.clone(),
        surface.clone(),
    ));
    (sync, source, surface)
}
