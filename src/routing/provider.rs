//! External routing and place-search provider
//!
//! Wraps the AMap v5 REST API for driving, walking, cycling, and integrated
//! transit directions, plus around-search for POI-backed candidates. Any
//! provider failure is surfaced as an error; the route cost service converts
//! it to the closed-form estimate.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::Result;
use crate::config::MeetpointConfig;
use crate::error::MeetpointError;
use crate::models::{CandidatePoint, Coordinate, RouteCost, SegmentKind, TransitSegment, TransportMode};

/// Resolves the travel cost between two points for a transport mode
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
        city: Option<&str>,
    ) -> Result<RouteCost>;
}

/// Searches named places around a center point
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search_around(
        &self,
        center: Coordinate,
        radius_m: u32,
        types: &str,
    ) -> Result<Vec<CandidatePoint>>;
}

/// AMap REST API client
pub struct AmapClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl AmapClient {
    pub fn new(config: &MeetpointConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.routing.timeout_seconds.into()))
            .user_agent(concat!("meetpoint/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MeetpointError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.routing.api_key.clone(),
            base_url: config.routing.base_url.clone(),
        })
    }

    fn key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| MeetpointError::config("Routing API key not configured"))
    }

    fn direction_url(&self, mode: TransportMode, city: Option<&str>) -> (String, Vec<(String, String)>) {
        let mut params = Vec::new();
        let endpoint = match mode {
            TransportMode::Walking => "/v5/direction/walking",
            TransportMode::Cycling => "/v5/direction/bicycling",
            TransportMode::Transit => {
                let city = city.unwrap_or("010");
                params.push(("city1".to_string(), city.to_string()));
                params.push(("city2".to_string(), city.to_string()));
                "/v5/direction/transit/integrated"
            }
            TransportMode::Driving => "/v5/direction/driving",
        };
        (format!("{}{}", self.base_url, endpoint), params)
    }
}

#[async_trait]
impl RoutingProvider for AmapClient {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
        city: Option<&str>,
    ) -> Result<RouteCost> {
        let key = self.key()?;
        let (url, extra_params) = self.direction_url(mode, city);

        debug!(mode = mode.as_str(), "requesting route from provider");
        let mut request = self.client.get(&url).query(&[
            ("key", key),
            ("origin", &origin.format()),
            ("destination", &destination.format()),
            ("show_fields", "cost,polyline"),
        ]);
        for (name, value) in &extra_params {
            request = request.query(&[(name.as_str(), value.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MeetpointError::provider(format!("Direction request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(MeetpointError::provider(format!(
                "Direction API returned HTTP {}",
                response.status()
            )));
        }

        let body: DirectionResponse = response
            .json()
            .await
            .map_err(|e| MeetpointError::provider(format!("Invalid direction response: {e}")))?;

        if body.status != "1" {
            return Err(MeetpointError::provider(format!(
                "Direction API error: {}",
                body.info.unwrap_or_else(|| "unknown".to_string())
            )));
        }

        let route = body
            .route
            .ok_or_else(|| MeetpointError::provider("Direction response has no route"))?;

        match mode {
            TransportMode::Transit => parse_transit_route(&route),
            _ => parse_path_route(&route),
        }
    }
}

#[async_trait]
impl PlaceSearch for AmapClient {
    async fn search_around(
        &self,
        center: Coordinate,
        radius_m: u32,
        types: &str,
    ) -> Result<Vec<CandidatePoint>> {
        let key = self.key()?;
        let url = format!("{}/v5/place/around", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", key),
                ("location", &center.format()),
                ("radius", &radius_m.to_string()),
                ("types", types),
                ("page_size", "20"),
            ])
            .send()
            .await
            .map_err(|e| MeetpointError::provider(format!("Place search failed: {e}")))?;

        let body: PlaceResponse = response
            .json()
            .await
            .map_err(|e| MeetpointError::provider(format!("Invalid place response: {e}")))?;

        if body.status != "1" {
            return Err(MeetpointError::provider(format!(
                "Place API error: {}",
                body.info.unwrap_or_else(|| "unknown".to_string())
            )));
        }

        let candidates: Vec<CandidatePoint> = body
            .pois
            .into_iter()
            .filter_map(|poi| {
                let coordinate = parse_location(&poi.location)?;
                Some(CandidatePoint {
                    id: poi.id,
                    name: poi.name,
                    coordinate,
                    address: poi.address,
                })
            })
            .collect();

        info!("place search returned {} candidates", candidates.len());
        Ok(candidates)
    }
}

// --- AMap v5 response shapes; all numbers arrive as strings ---

#[derive(Debug, Deserialize)]
struct DirectionResponse {
    status: String,
    info: Option<String>,
    route: Option<DirectionRoute>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DirectionRoute {
    paths: Vec<PathDetail>,
    transits: Vec<TransitDetail>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PathDetail {
    distance: Option<String>,
    cost: Option<CostDetail>,
    polyline: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CostDetail {
    duration: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TransitDetail {
    distance: Option<String>,
    cost: Option<CostDetail>,
    segments: Vec<TransitSegmentDetail>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TransitSegmentDetail {
    walking: Option<WalkingDetail>,
    bus: Option<BusDetail>,
    railway: Option<RailwayDetail>,
    taxi: Option<TaxiDetail>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct WalkingDetail {
    distance: Option<String>,
    cost: Option<CostDetail>,
    steps: Vec<WalkStep>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct WalkStep {
    polyline: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BusDetail {
    buslines: Vec<BuslineDetail>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuslineDetail {
    name: Option<String>,
    distance: Option<String>,
    cost: Option<CostDetail>,
    departure_stop: Option<StopDetail>,
    arrival_stop: Option<StopDetail>,
    polyline: Option<PolylineDetail>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RailwayDetail {
    name: Option<String>,
    distance: Option<String>,
    time: Option<String>,
    departure_stop: Option<StopDetail>,
    arrival_stop: Option<StopDetail>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TaxiDetail {
    distance: Option<String>,
    drivetime: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StopDetail {
    name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PolylineDetail {
    polyline: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceResponse {
    status: String,
    info: Option<String>,
    #[serde(default)]
    pois: Vec<PoiDetail>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PoiDetail {
    id: String,
    name: String,
    location: String,
    address: Option<String>,
}

fn parse_num(value: Option<&String>, default: f64) -> f64 {
    value.and_then(|v| v.parse::<f64>().ok()).unwrap_or(default)
}

fn parse_location(raw: &str) -> Option<Coordinate> {
    let (lng, lat) = raw.split_once(',')?;
    let coordinate = Coordinate::new(lng.trim().parse().ok()?, lat.trim().parse().ok()?);
    coordinate.is_valid().then_some(coordinate)
}

fn parse_polyline(polyline: &str) -> Vec<Coordinate> {
    polyline
        .split(';')
        .filter_map(parse_location)
        .collect()
}

fn parse_path_route(route: &DirectionRoute) -> Result<RouteCost> {
    let path = route
        .paths
        .first()
        .ok_or_else(|| MeetpointError::provider("Direction response has no paths"))?;

    let duration_s = parse_num(path.cost.as_ref().and_then(|c| c.duration.as_ref()), 1800.0);
    let distance_m = parse_num(path.distance.as_ref(), 0.0);

    Ok(RouteCost {
        duration_min: (duration_s / 60.0).round(),
        distance_km: (distance_m / 100.0).round() / 10.0,
        path: path.polyline.as_deref().map(parse_polyline).unwrap_or_default(),
        segments: vec![],
        estimated: false,
    })
}

fn parse_transit_route(route: &DirectionRoute) -> Result<RouteCost> {
    let transit = route
        .transits
        .first()
        .ok_or_else(|| MeetpointError::provider("Transit response has no plans"))?;

    let duration_s = parse_num(transit.cost.as_ref().and_then(|c| c.duration.as_ref()), 1800.0);
    let distance_m = parse_num(transit.distance.as_ref(), 0.0);

    let mut segments = Vec::new();
    let mut path = Vec::new();
    for segment in &transit.segments {
        if let Some(walking) = &segment.walking {
            segments.push(TransitSegment {
                kind: SegmentKind::Walk,
                line_name: None,
                start_station: None,
                end_station: None,
                duration_min: (parse_num(
                    walking.cost.as_ref().and_then(|c| c.duration.as_ref()),
                    0.0,
                ) / 60.0)
                    .round(),
                distance_m: parse_num(walking.distance.as_ref(), 0.0),
            });
            for step in &walking.steps {
                if let Some(polyline) = &step.polyline {
                    path.extend(parse_polyline(polyline));
                }
            }
        }
        if let Some(busline) = segment.bus.as_ref().and_then(|b| b.buslines.first()) {
            let name = busline.name.clone().unwrap_or_default();
            segments.push(TransitSegment {
                kind: if is_subway_line(&name) {
                    SegmentKind::Subway
                } else {
                    SegmentKind::Bus
                },
                line_name: Some(name),
                start_station: busline.departure_stop.as_ref().and_then(|s| s.name.clone()),
                end_station: busline.arrival_stop.as_ref().and_then(|s| s.name.clone()),
                duration_min: (parse_num(
                    busline.cost.as_ref().and_then(|c| c.duration.as_ref()),
                    0.0,
                ) / 60.0)
                    .round(),
                distance_m: parse_num(busline.distance.as_ref(), 0.0),
            });
            if let Some(polyline) = busline.polyline.as_ref().and_then(|p| p.polyline.as_ref()) {
                path.extend(parse_polyline(polyline));
            }
        }
        if let Some(railway) = &segment.railway {
            segments.push(TransitSegment {
                kind: SegmentKind::Railway,
                line_name: railway.name.clone(),
                start_station: railway.departure_stop.as_ref().and_then(|s| s.name.clone()),
                end_station: railway.arrival_stop.as_ref().and_then(|s| s.name.clone()),
                duration_min: (parse_num(railway.time.as_ref(), 0.0) / 60.0).round(),
                distance_m: parse_num(railway.distance.as_ref(), 0.0),
            });
        }
        if let Some(taxi) = &segment.taxi {
            segments.push(TransitSegment {
                kind: SegmentKind::Taxi,
                line_name: None,
                start_station: None,
                end_station: None,
                duration_min: (parse_num(taxi.drivetime.as_ref(), 0.0) / 60.0).round(),
                distance_m: parse_num(taxi.distance.as_ref(), 0.0),
            });
        }
    }

    Ok(RouteCost {
        duration_min: (duration_s / 60.0).round(),
        distance_km: (distance_m / 100.0).round() / 10.0,
        path,
        segments,
        estimated: false,
    })
}

fn is_subway_line(name: &str) -> bool {
    name.contains("地铁") || name.contains("号线") || name.contains("轨道")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        let coord = parse_location("116.427115,39.903536").unwrap();
        assert_eq!(coord.lng, 116.427_115);
        assert_eq!(coord.lat, 39.903_536);

        assert!(parse_location("not-a-coordinate").is_none());
        assert!(parse_location("200.0,39.9").is_none());
    }

    #[test]
    fn test_parse_polyline() {
        let path = parse_polyline("116.1,39.1;116.2,39.2;bogus");
        assert_eq!(path.len(), 2);
        assert_eq!(path[1], Coordinate::new(116.2, 39.2));
    }

    #[test]
    fn test_parse_path_route() {
        let body = r#"{
            "status": "1",
            "route": {
                "paths": [{
                    "distance": "2874",
                    "cost": { "duration": "720" },
                    "polyline": "116.427,39.903;116.459,39.909"
                }]
            }
        }"#;
        let response: DirectionResponse = serde_json::from_str(body).unwrap();
        let cost = parse_path_route(&response.route.unwrap()).unwrap();

        assert_eq!(cost.duration_min, 12.0);
        assert_eq!(cost.distance_km, 2.9);
        assert_eq!(cost.path.len(), 2);
        assert!(!cost.estimated);
    }

    #[test]
    fn test_parse_transit_route_segments() {
        let body = r#"{
            "status": "1",
            "route": {
                "transits": [{
                    "distance": "8500",
                    "cost": { "duration": "2400" },
                    "segments": [
                        { "walking": { "distance": "400", "cost": { "duration": "300" } } },
                        { "bus": { "buslines": [{
                            "name": "地铁1号线(四惠--古城)",
                            "distance": "7600",
                            "cost": { "duration": "1800" },
                            "departure_stop": { "name": "国贸" },
                            "arrival_stop": { "name": "王府井" }
                        }] } }
                    ]
                }]
            }
        }"#;
        let response: DirectionResponse = serde_json::from_str(body).unwrap();
        let cost = parse_transit_route(&response.route.unwrap()).unwrap();

        assert_eq!(cost.duration_min, 40.0);
        assert_eq!(cost.segments.len(), 2);
        assert_eq!(cost.segments[0].kind, SegmentKind::Walk);
        assert_eq!(cost.segments[1].kind, SegmentKind::Subway);
        assert_eq!(cost.segments[1].start_station.as_deref(), Some("国贸"));
    }

    #[test]
    fn test_subway_line_detection() {
        assert!(is_subway_line("地铁10号线"));
        assert!(is_subway_line("轨道交通昌平线"));
        assert!(!is_subway_line("快速公交1线路"));
    }
}
