//! reqwest-backed implementation of the remote API seams.
//!
//! Authentication is cookie based: the client keeps a cookie store and the
//! session cookie is sent with every request. A 401 triggers one coalesced
//! session refresh and a single retry of the original request.

use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use nooryx_core::{Barcode, LocationCode, SkuCode};
use nooryx_inventory::{ListQuery, ListResult};

use crate::api::{
    BarcodeRegistry, InventoryApi, InventoryPage, SkuMatch, SkuSnapshot, TrendBody, TrendPeriod,
    TrendPoint,
};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionRefresher;

/// HTTP client for the Nooryx backend.
#[derive(Debug)]
pub struct HttpInventoryApi {
    client: reqwest::Client,
    base_url: Url,
    session: SessionRefresher,
}

impl HttpInventoryApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self {
            client,
            base_url,
            session: SessionRefresher::new(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended (each one percent-encoded).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ApiError::Network(format!("base URL cannot take a path: {}", self.base_url))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Send a request, refreshing the session once on 401.
    async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Response, ApiError> {
        let observed = self.session.generation().await;
        let response = self.execute(&method, &url, body).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return ensure_success(response).await;
        }

        tracing::warn!(%url, "request unauthorized, attempting session refresh");
        self.session
            .refresh(observed, || self.refresh_session())
            .await
            .map_err(|_| ApiError::Auth)?;

        let retry = self.execute(&method, &url, body).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(%url, "still unauthorized after session refresh");
            return Err(ApiError::Auth);
        }
        ensure_success(retry).await
    }

    async fn execute(&self, method: &Method, url: &Url, body: Option<&Value>) -> Result<Response, ApiError> {
        let mut req = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            req = req.json(body);
        }
        req.send().await.map_err(|e| ApiError::Network(e.to_string()))
    }

    /// `POST /auth/sessions/refresh`. Never routed through [`Self::send`].
    async fn refresh_session(&self) -> Result<(), ApiError> {
        let url = self.endpoint(&["auth", "sessions", "refresh"])?;
        let resp = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            tracing::warn!(status = resp.status().as_u16(), "session refresh rejected");
            Err(ApiError::Auth)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let resp = self.send(Method::GET, url, None).await?;
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Map a non-2xx response to [`ApiError::Http`]. An unparseable body becomes `None`.
async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let bytes = response.bytes().await.unwrap_or_default();
    let body = serde_json::from_slice::<Value>(&bytes).ok();
    Err(ApiError::http(status.as_u16(), body))
}

#[async_trait]
impl InventoryApi for HttpInventoryApi {
    async fn list_inventory(&self, query: &ListQuery) -> Result<ListResult, ApiError> {
        let mut url = self.endpoint(&["inventory"])?;
        url.query_pairs_mut().extend_pairs(query.request_params());

        tracing::debug!(%url, "fetching inventory page");
        let page: InventoryPage = self.get_json(url).await?;
        Ok(page.into())
    }

    async fn sku_snapshot(
        &self,
        sku: &SkuCode,
        location: Option<&LocationCode>,
    ) -> Result<SkuSnapshot, ApiError> {
        let mut url = self.endpoint(&["inventory", sku.as_str()])?;
        if let Some(location) = location {
            url.query_pairs_mut().append_pair("location", location.as_str());
        }
        self.get_json(url).await
    }

    async fn inventory_trend(
        &self,
        sku: &SkuCode,
        period: TrendPeriod,
        location: Option<&LocationCode>,
    ) -> Result<Vec<TrendPoint>, ApiError> {
        let mut url = self.endpoint(&["reports", "trend", "inventory", sku.as_str()])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("period", period.as_str());
            if let Some(location) = location {
                pairs.append_pair("location", location.as_str());
            }
        }
        let body: TrendBody = self.get_json(url).await?;
        Ok(body.into())
    }
}

#[async_trait]
impl BarcodeRegistry for HttpInventoryApi {
    async fn lookup(&self, code: &Barcode) -> Result<Option<SkuMatch>, ApiError> {
        let url = self.endpoint(&["barcodes", code.as_str()])?;
        match self.get_json::<SkuMatch>(url).await {
            Ok(found) => Ok(Some(found)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn map_barcode(&self, code: &Barcode, sku: &SkuCode) -> Result<SkuMatch, ApiError> {
        let url = self.endpoint(&["barcodes", code.as_str()])?;
        let body = serde_json::json!({ "sku_code": sku });
        let resp = self.send(Method::POST, url, Some(&body)).await?;
        resp.json::<SkuMatch>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpInventoryApi {
        HttpInventoryApi::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn endpoint_appends_encoded_segments() {
        let api = api("http://localhost:8000/api/v1/");
        let url = api.endpoint(&["inventory", "WID 001/A"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/inventory/WID%20001%2FA");
    }

    #[test]
    fn endpoint_without_trailing_slash() {
        let api = api("http://localhost:8000/api/v1");
        let url = api.endpoint(&["auth", "sessions", "refresh"]).unwrap();
        assert_eq!(url.path(), "/api/v1/auth/sessions/refresh");
    }

    #[test]
    fn default_list_query_url() {
        let api = api("http://localhost:8000");
        let mut url = api.endpoint(&["inventory"]).unwrap();
        url.query_pairs_mut().extend_pairs(ListQuery::default().request_params());
        assert_eq!(url.as_str(), "http://localhost:8000/inventory?page=1&size=10");
    }
}
