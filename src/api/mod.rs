//! Client for the external inventory REST API
//!
//! `InventoryApi` is the seam the session and the equipment controller talk
//! to; `HttpApi` is the reqwest implementation used in production.

pub mod auth;
pub mod equipment;

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    config::ApiConfig,
    error::{AppError, AppResult},
    models::{Equipment, EquipmentDraft, EquipmentType},
};

pub use auth::{LoginRequest, LoginResponse};

/// Operations offered by the external API.
///
/// Mutations return the server's human readable message, if it sent one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse>;

    async fn list_equipment(&self, token: &str) -> AppResult<Vec<Equipment>>;

    async fn list_equipment_types(&self, token: &str) -> AppResult<Vec<EquipmentType>>;

    async fn create_equipment(&self, token: &str, draft: &EquipmentDraft) -> AppResult<Option<String>>;

    async fn update_equipment(
        &self,
        token: &str,
        id: i64,
        draft: &EquipmentDraft,
    ) -> AppResult<Option<String>>;

    async fn delete_equipment(&self, token: &str, id: i64) -> AppResult<Option<String>>;
}

/// Body shape shared by every error response and every mutation response
#[derive(Debug, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// `{ data: [...] }` list envelope
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// reqwest-backed implementation of [`InventoryApi`]
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header(AUTHORIZATION, format!("Bearer {}", token))
    }

    async fn send(builder: RequestBuilder) -> AppResult<Response> {
        builder
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))
    }

    /// Turn a non-success response into `AppError::Api`, keeping the server message
    async fn check_status(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .ok()
            .and_then(|text| serde_json::from_str::<MessageBody>(&text).ok())
            .and_then(|body| body.message);

        tracing::debug!("API responded {} ({:?})", status, message);

        Err(AppError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let response = Self::check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::UnexpectedResponse(e.to_string()))
    }

    /// Success bodies of mutations may be empty or lack a message
    async fn read_message(response: Response) -> AppResult<Option<String>> {
        let response = Self::check_status(response).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str::<MessageBody>(&text)
            .ok()
            .and_then(|body| body.message))
    }
}

#[async_trait]
impl InventoryApi for HttpApi {
    async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        self.auth_login(username, password).await
    }

    async fn list_equipment(&self, token: &str) -> AppResult<Vec<Equipment>> {
        self.equipment_list(token).await
    }

    async fn list_equipment_types(&self, token: &str) -> AppResult<Vec<EquipmentType>> {
        self.equipment_types(token).await
    }

    async fn create_equipment(&self, token: &str, draft: &EquipmentDraft) -> AppResult<Option<String>> {
        self.equipment_create(token, draft).await
    }

    async fn update_equipment(
        &self,
        token: &str,
        id: i64,
        draft: &EquipmentDraft,
    ) -> AppResult<Option<String>> {
        self.equipment_update(token, id, draft).await
    }

    async fn delete_equipment(&self, token: &str, id: i64) -> AppResult<Option<String>> {
        self.equipment_delete(token, id).await
    }
}
