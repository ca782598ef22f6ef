use serde::{Deserialize, Serialize};

use crate::models::UserProfile;

/// Cuerpo de `POST /users/auth/telegram/`. El backend espera camelCase.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthRequest {
    #[serde(rename = "initData")]
    pub init_data: String,
}

// initData es una credencial firmada: nunca aparece en logs
impl std::fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRequest")
            .field("init_data_len", &self.init_data.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    pub user: UserProfile,
}

/// Cuerpo de error del backend: `{ error | detail | message }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Mensaje del backend con la misma prioridad que usa la UI: error > detail > message
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.detail)
            .or(self.message)
            .filter(|m| !m.trim().is_empty())
    }
}
