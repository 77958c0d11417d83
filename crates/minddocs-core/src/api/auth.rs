use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub domain: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl ApiClient {
    /// `POST /auth/login` with a form-encoded body.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let request = self
            .post("/auth/login")
            .form(&[("username", username), ("password", password)]);
        self.send_json(request).await
    }

    /// `POST /auth/register` with a JSON body. Registration does not log
    /// the user in.
    pub async fn register(&self, account: &RegisterRequest) -> Result<RegisterResponse> {
        let request = self.post("/auth/register").json(account);
        self.send_json(request).await
    }
}
