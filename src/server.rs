use crate::config::AppConfig;
use crate::html::INDEX_HTML;
use crate::presentation::MapSpec;
use crate::processing::{partition, Threshold};
use crate::types::Observation;
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json},
    routing::get,
    Router,
};
use geo::{HaversineDistance, Point};
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing::info;

// R-tree entry. Positions are scaled so that a degree of longitude and a
// degree of latitude cover the same ground distance near the map center.
pub struct ObservationIndex {
    index: usize,
    position: [f64; 2],
}

impl RTreeObject for ObservationIndex {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for ObservationIndex {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

pub struct AppState {
    pub observations: Vec<Observation>,
    pub tree: RTree<ObservationIndex>,
    pub config: AppConfig,
    lon_scale: f64,
}

impl AppState {
    pub fn new(config: AppConfig, observations: Vec<Observation>) -> Self {
        let lon_scale = config.map.latitude.to_radians().cos();
        let items: Vec<ObservationIndex> = observations
            .iter()
            .enumerate()
            .map(|(index, o)| ObservationIndex {
                index,
                position: [o.lon() * lon_scale, o.lat()],
            })
            .collect();

        Self {
            observations,
            tree: RTree::bulk_load(items),
            config,
            lon_scale,
        }
    }

    fn nearest(&self, lat: f64, lon: f64) -> Option<(&Observation, f64)> {
        let candidate = self.tree.nearest_neighbor(&[lon * self.lon_scale, lat])?;
        let obs = self.observations.get(candidate.index)?;
        let distance = obs.point.haversine_distance(&Point::new(lon, lat));
        Some((obs, distance))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MapParams {
    threshold: Option<i64>,
    show_pumps: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct QueryParams {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct QueryResponse {
    kind: &'static str,
    count: i64,
    lon: f64,
    lat: f64,
    distance_m: f64,
}

type ApiError = (StatusCode, Json<Value>);

/// Opens the reference image once so a missing file stops startup.
pub fn inspect_reference_image(path: &Path) -> Result<(u32, u32)> {
    let (width, height) = image::image_dimensions(path)
        .with_context(|| format!("Failed to open reference image: {:?}", path))?;
    info!("Reference image {:?} is {}x{}", path, width, height);
    Ok((width, height))
}

pub fn router(state: Arc<AppState>) -> Router {
    let image_service = ServeFile::new(&state.config.input.reference_image);

    Router::new()
        .route("/", get(index_handler))
        .route("/healthz", get(healthz))
        .route("/api/map", get(map_handler))
        .route("/api/query", get(query_handler))
        .route_service("/static/reference.jpg", image_service)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: AppConfig, observations: Vec<Observation>) -> Result<()> {
    inspect_reference_image(&config.input.reference_image)?;

    info!("Building spatial index for {} observations", observations.len());
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.server.host, config.server.port))?;
    let state = Arc::new(AppState::new(config, observations));

    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn map_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MapParams>,
) -> Result<Json<MapSpec>, ApiError> {
    let controls = &state.config.controls;
    let threshold = match params.threshold {
        Some(value) => Threshold::new(value, controls)
            .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))))?,
        None => Threshold::default_for(controls),
    };
    let show_pumps = params.show_pumps.unwrap_or(controls.show_pumps);

    let partition = partition(&state.observations, threshold, show_pumps);
    Ok(Json(MapSpec::build(&state.config, &partition, threshold)))
}

async fn query_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Json<Option<QueryResponse>> {
    // rstar orders candidates with partial_cmp and panics on NaN.
    if !params.lat.is_finite() || !params.lon.is_finite() {
        return Json(None);
    }

    let hit = state
        .nearest(params.lat, params.lon)
        .filter(|(_, distance)| *distance <= state.config.server.query_tolerance_m)
        .map(|(obs, distance)| QueryResponse {
            kind: if obs.is_pump() { "pump" } else { "death" },
            count: obs.count,
            lon: obs.lon(),
            lat: obs.lat(),
            distance_m: distance,
        });

    Json(hit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(
            AppConfig::default(),
            vec![
                Observation::new(3, -0.136, 51.513),
                Observation::new(1, -0.1355, 51.5128),
                Observation::new(-999, -0.137, 51.514),
            ],
        ))
    }

    #[tokio::test]
    async fn map_uses_configured_defaults() {
        let Json(spec) = map_handler(State(state()), Query(MapParams::default()))
            .await
            .unwrap();
        assert_eq!(spec.slider.value, 2);
        assert!(spec.checkbox.checked);
        assert_eq!(spec.layers[0].data.len(), 1);
        assert_eq!(spec.layers[1].data.len(), 1);
    }

    #[tokio::test]
    async fn map_applies_controls() {
        let params = MapParams {
            threshold: Some(0),
            show_pumps: Some(false),
        };
        let Json(spec) = map_handler(State(state()), Query(params)).await.unwrap();
        assert_eq!(spec.map_title, "Map of more than 0 deaths");
        assert_eq!(spec.layers[0].data.len(), 2);
        assert!(!spec.checkbox.checked);
        assert_eq!(spec.layers[1].data.len(), 1);
    }

    #[tokio::test]
    async fn out_of_range_threshold_is_rejected() {
        let params = MapParams {
            threshold: Some(16),
            show_pumps: None,
        };
        let (status, Json(body)) = map_handler(State(state()), Query(params)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("16"));
    }

    #[tokio::test]
    async fn query_finds_nearby_pump() {
        let params = QueryParams { lat: 51.51401, lon: -0.13701 };
        let Json(hit) = query_handler(State(state()), Query(params)).await;
        let hit = hit.expect("pump within tolerance");
        assert_eq!(hit.kind, "pump");
        assert_eq!(hit.count, -999);
        assert!(hit.distance_m < 5.0);
    }

    #[tokio::test]
    async fn query_far_from_everything_is_empty() {
        let params = QueryParams { lat: 51.52, lon: -0.12 };
        let Json(hit) = query_handler(State(state()), Query(params)).await;
        assert_eq!(hit, None);
    }

    #[tokio::test]
    async fn query_with_non_finite_coordinates_is_empty() {
        let cases = [
            (f64::NAN, f64::NAN),
            (51.514, f64::NAN),
            (f64::NAN, -0.137),
            (f64::INFINITY, -0.137),
            (51.514, f64::NEG_INFINITY),
        ];
        for (lat, lon) in cases {
            let Json(hit) = query_handler(State(state()), Query(QueryParams { lat, lon })).await;
            assert_eq!(hit, None, "lat={lat} lon={lon}");
        }
    }

    #[test]
    fn missing_reference_image_is_fatal() {
        assert!(inspect_reference_image(Path::new("no/such/image.jpg")).is_err());
    }
}
