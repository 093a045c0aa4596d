use std::path::PathBuf;

use serde::Deserialize;

use crate::persist::AtomicFileWriter;
use crate::types::{
    ApiError, ClientSettings, MapFragment, NewRoute, RouteDto, RouteId, StatisticsDto,
};

/// `{success, error?}` acknowledgement used by every mutating endpoint.
#[derive(Debug, Deserialize)]
struct AckResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MapResponse {
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Thin JSON client for the route-tracking server.
#[derive(Debug, Clone)]
pub struct RouteApi {
    client: reqwest::Client,
    settings: ClientSettings,
}

impl RouteApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    pub async fn routes(&self) -> Result<Vec<RouteDto>, ApiError> {
        let response = self
            .client
            .get(self.url("/get_routes"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        parse_json(check_status(response)?).await
    }

    pub async fn add_route(&self, route: &NewRoute) -> Result<(), ApiError> {
        self.ack(self.client.post(self.url("/add_route")).json(route))
            .await
    }

    pub async fn update_route(&self, id: RouteId, route: &NewRoute) -> Result<(), ApiError> {
        self.ack(
            self.client
                .put(self.url(&format!("/update_route/{id}")))
                .json(route),
        )
        .await
    }

    pub async fn delete_route(&self, id: RouteId) -> Result<(), ApiError> {
        self.ack(self.client.delete(self.url(&format!("/delete_route/{id}"))))
            .await
    }

    pub async fn statistics(&self) -> Result<StatisticsDto, ApiError> {
        let response = self
            .client
            .get(self.url("/get_statistics"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        parse_json(check_status(response)?).await
    }

    /// The map arrives as an opaque server-rendered HTML fragment.
    pub async fn map(&self) -> Result<MapFragment, ApiError> {
        let response = self
            .client
            .get(self.url("/get_map"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: MapResponse = parse_json(check_status(response)?).await?;
        match body.html {
            Some(html) => Ok(MapFragment { html }),
            None => Err(ApiError::Rejected(
                body.error.unwrap_or_else(|| "map unavailable".to_string()),
            )),
        }
    }

    /// Downloads the CSV export and persists it atomically next to the
    /// server's own naming convention.
    pub async fn export_csv(&self) -> Result<PathBuf, ApiError> {
        let response = self
            .client
            .get(self.url("/export_csv"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let bytes = check_status(response)?
            .bytes()
            .await
            .map_err(|err| ApiError::Body(err.to_string()))?;

        let filename = format!(
            "routes_export_{}.csv",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        );
        let writer = AtomicFileWriter::new(self.settings.export_dir.clone());
        let path = writer.write(&filename, &bytes)?;
        Ok(path)
    }

    pub async fn backup(&self) -> Result<(), ApiError> {
        self.ack(self.client.post(self.url("/backup_database"))).await
    }

    pub async fn clear(&self) -> Result<(), ApiError> {
        self.ack(self.client.post(self.url("/clear_database"))).await
    }

    async fn ack(&self, request: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        // The server reports failures in the body, sometimes alongside a
        // non-2xx status; prefer the body's reason when it parses.
        let status = response.status();
        match response.json::<AckResponse>().await {
            Ok(ack) if ack.success => Ok(()),
            Ok(ack) => Err(ApiError::Rejected(
                ack.error.unwrap_or_else(|| "request rejected".to_string()),
            )),
            Err(_) if !status.is_success() => Err(ApiError::Status(status.as_u16())),
            Err(err) => Err(ApiError::Body(err.to_string())),
        }
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status(status.as_u16()))
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    response
        .json()
        .await
        .map_err(|err| ApiError::Body(err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Network("timeout".to_string());
    }
    ApiError::Network(err.to_string())
}
