use haulmap::{
    geocode::{self, Geocoder},
    proximity::route::{self, Directions},
    shared::Coordinate,
};
use reqwest::{Client, Url, header::ACCEPT_ENCODING};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

/// LocationIQ backed geocoding and driving directions.
pub struct LocationIq {
    client: Client,
    base_url: String,
    key: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// GeoJSON order, longitude first.
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug)]
enum FetchError {
    Request(String),
    Decode(String),
}

impl LocationIq {
    pub fn new(base_url: &str, key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let mut query = vec![("key", self.key.clone())];
        query.extend(params.iter().cloned());
        let url = Url::parse_with_params(&format!("{}{}", self.base_url, path), &query)
            .map_err(|err| FetchError::Request(err.to_string()))?;
        debug!("GET {}{}", self.base_url, path);

        let response = self
            .client
            .get(url)
            .header(ACCEPT_ENCODING, "gzip, deflate")
            .send()
            .await
            .map_err(|err| FetchError::Request(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Request(format!("{status}: {body}")));
        }
        response
            .json()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))
    }
}

impl From<FetchError> for geocode::Error {
    fn from(value: FetchError) -> Self {
        match value {
            FetchError::Request(err) => geocode::Error::Request(err),
            FetchError::Decode(err) => geocode::Error::InvalidResponse(err),
        }
    }
}

impl From<FetchError> for route::Error {
    fn from(value: FetchError) -> Self {
        match value {
            FetchError::Request(err) => route::Error::Request(err),
            FetchError::Decode(err) => route::Error::InvalidResponse(err),
        }
    }
}

impl Geocoder for LocationIq {
    async fn reverse(&self, position: Coordinate) -> Result<String, geocode::Error> {
        let params = [
            ("lat", position.latitude.to_string()),
            ("lon", position.longitude.to_string()),
            ("format", "json".to_string()),
        ];
        let response: ReverseResponse = self.get_json("/v1/reverse", &params).await?;
        response
            .display_name
            .filter(|name| !name.is_empty())
            .ok_or(geocode::Error::NoResult)
    }

    async fn forward(&self, query: &str) -> Result<Coordinate, geocode::Error> {
        let params = [
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("limit", "1".to_string()),
        ];
        let response: Vec<SearchResponse> = self.get_json("/v1/search", &params).await?;
        let first = response.first().ok_or(geocode::Error::NoResult)?;
        let latitude: f64 = first
            .lat
            .parse()
            .map_err(|_| geocode::Error::InvalidResponse(format!("bad latitude {}", first.lat)))?;
        let longitude: f64 = first
            .lon
            .parse()
            .map_err(|_| geocode::Error::InvalidResponse(format!("bad longitude {}", first.lon)))?;
        Ok(Coordinate::new(latitude, longitude))
    }
}

impl Directions for LocationIq {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<Coordinate>, route::Error> {
        let path = format!(
            "/v1/directions/driving/{},{};{},{}",
            origin.longitude, origin.latitude, destination.longitude, destination.latitude
        );
        let params = [
            ("overview", "full".to_string()),
            ("geometries", "geojson".to_string()),
        ];
        let response: DirectionsResponse = self.get_json(&path, &params).await?;
        let route = response.routes.into_iter().next().ok_or(route::Error::NoRoute)?;
        Ok(route
            .geometry
            .coordinates
            .into_iter()
            .map(|[longitude, latitude]| Coordinate::new(latitude, longitude))
            .collect())
    }
}
