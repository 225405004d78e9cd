//! Session DTOs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity claims a signed-in user asks to have a session token minted for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRequest {
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            extra: Map::new(),
        }
    }
}

/// Answer to session endpoints (`/jwt`, `/logOut`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success: bool,
}
