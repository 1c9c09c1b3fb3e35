//! REST client for the profile and room list endpoints

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::game::LocalProfile;
use crate::room::RoomSummary;

/// Bearer-authenticated client for the game's REST api
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(&config.api_base_url, &config.auth_token)
    }

    pub fn with_base_url(base_url: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.api_url(path))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(ApiError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(ApiError::Parse)
    }

    /// The signed-in user; its id becomes the local player id
    pub async fn get_profile(&self) -> Result<LocalProfile, ApiError> {
        self.get("user").await
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomSummary>, ApiError> {
        self.get("rooms").await
    }

    /// Rooms that are waiting and still have a free slot
    pub async fn joinable_rooms(&self) -> Result<Vec<RoomSummary>, ApiError> {
        let rooms = self.list_rooms().await?;
        Ok(rooms.into_iter().filter(RoomSummary::is_joinable).collect())
    }
}

/// REST errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::get,
        Json, Router,
    };
    use serde_json::json;

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer secret")
    }

    async fn user(headers: HeaderMap) -> impl IntoResponse {
        if !authorized(&headers) {
            return (StatusCode::UNAUTHORIZED, "no token").into_response();
        }
        Json(json!({
            "id": "u1",
            "username": "alice",
            "coins": 40,
            "equipment": [{"id": "e1", "name": "Boots", "effect": "speed"}]
        }))
        .into_response()
    }

    async fn rooms() -> Json<serde_json::Value> {
        Json(json!([
            {"id": "r1", "name": "Open", "gameMode": "classic", "players": 1, "maxPlayers": 4, "status": "waiting"},
            {"id": "r2", "name": "Full", "gameMode": "infection", "players": 4, "maxPlayers": 4, "status": "waiting"},
            {"id": "r3", "name": "Busy", "gameMode": "bodyguard", "players": 2, "maxPlayers": 6, "status": "playing"}
        ]))
    }

    async fn spawn_api() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new()
            .route("/api/user", get(user))
            .route("/api/rooms", get(rooms));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn fetches_profile_with_bearer_token() {
        let api = ApiClient::with_base_url(&spawn_api().await, "secret");
        let profile = api.get_profile().await.unwrap();
        assert_eq!(profile.id, "u1");
        assert_eq!(profile.coins, 40);
        assert_eq!(profile.equipment.len(), 1);
    }

    #[tokio::test]
    async fn rejected_token_surfaces_status() {
        let api = ApiClient::with_base_url(&spawn_api().await, "wrong");
        match api.get_profile().await {
            Err(ApiError::Api { status, .. }) => assert_eq!(status, 401),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn filters_joinable_rooms() {
        let api = ApiClient::with_base_url(&spawn_api().await, "secret");
        assert_eq!(api.list_rooms().await.unwrap().len(), 3);
        let joinable = api.joinable_rooms().await.unwrap();
        assert_eq!(joinable.len(), 1);
        assert_eq!(joinable[0].id, "r1");
    }
}
