//! Credential exchange

use serde::{Deserialize, Serialize};

use super::HttpApi;
use crate::{error::AppResult, models::User};

/// Login request body. The API expects the Spanish `usuario` key.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    #[serde(rename = "usuario")]
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful login payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

impl HttpApi {
    /// POST /auth/login (no bearer token)
    pub async fn auth_login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        tracing::debug!("POST /auth/login for {}", username);

        let request = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { username, password });

        let response = Self::send(request).await?;
        Self::read_json(response).await
    }
}
