use serde::{Deserialize, Serialize};

use crate::models::UserProfile;

// ============================================================================
// SESSION - Estado de autenticación publicado al resto de la app
// ============================================================================

/// Detalle técnico del último fallo de autenticación (panel de debug)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DebugInfo {
    /// El backend respondió
    Response {
        status: u16,
        status_text: String,
        data: serde_json::Value,
        url: String,
        method: String,
    },
    /// No hubo respuesta (red caída, CORS, host ausente...)
    NoResponse { message: String },
}

impl DebugInfo {
    pub fn no_response(message: impl Into<String>) -> Self {
        DebugInfo::NoResponse { message: message.into() }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            DebugInfo::Response { status, .. } => Some(*status),
            DebugInfo::NoResponse { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// Única instancia por proceso, mutada solo por `SessionManager`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub authenticated: bool,
    pub authenticating: bool,
    pub user: Option<UserProfile>,
    pub auth_error: Option<String>,
    pub debug_info: Option<DebugInfo>,
    /// refresh_user en curso
    pub loading: bool,
    /// Error no relacionado con auth (p.ej. refresh_user)
    pub error: Option<String>,
}

// Derivaciones puras: se recalculan en cada lectura
impl Session {
    pub fn phase(&self) -> SessionPhase {
        if self.authenticating {
            SessionPhase::Authenticating
        } else if self.authenticated {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Unauthenticated
        }
    }

    pub fn user_name(&self) -> String {
        self.user
            .as_ref()
            .map(|u| u.first_name.clone())
            .unwrap_or_default()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn user_balance(&self) -> f64 {
        self.user.as_ref().map(|u| u.balance).unwrap_or(0.0)
    }

    pub fn has_auth_error(&self) -> bool {
        self.auth_error.is_some()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
