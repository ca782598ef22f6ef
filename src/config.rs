use serde::{Deserialize, Serialize};

use crate::utils::constants::{
    DEFAULT_BACKEND_URL_DEVELOPMENT, DEFAULT_BACKEND_URL_PRODUCTION, STORAGE_KEY_AUTH_TOKEN,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend_url_development: String,
    pub backend_url_production: String,
    pub environment: String,
    pub enable_logging: bool,
    pub log_level: String,
    /// Autenticación mock cuando no hay initData (solo fuera de producción)
    pub dev_mock_auth: bool,
    pub auth_token_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url_development: DEFAULT_BACKEND_URL_DEVELOPMENT.to_string(),
            backend_url_production: DEFAULT_BACKEND_URL_PRODUCTION.to_string(),
            environment: "development".to_string(),
            enable_logging: true,
            log_level: "info".to_string(),
            dev_mock_auth: true,
            auth_token_key: STORAGE_KEY_AUTH_TOKEN.to_string(),
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno en tiempo de compilación
    pub fn from_env() -> Self {
        let environment = option_env!("ENVIRONMENT").unwrap_or("development").to_string();
        // En desarrollo el mock está activo salvo que se desactive explícitamente
        let dev_mock_default = environment != "production";

        Self {
            backend_url_development: option_env!("BACKEND_URL_DEVELOPMENT")
                .unwrap_or(DEFAULT_BACKEND_URL_DEVELOPMENT)
                .to_string(),
            backend_url_production: option_env!("BACKEND_URL_PRODUCTION")
                .unwrap_or(DEFAULT_BACKEND_URL_PRODUCTION)
                .to_string(),
            enable_logging: option_env!("ENABLE_LOGGING")
                .unwrap_or("true")
                .parse()
                .unwrap_or(true),
            log_level: option_env!("LOG_LEVEL").unwrap_or("info").to_string(),
            dev_mock_auth: option_env!("DEV_MOCK_AUTH")
                .and_then(|v| v.parse().ok())
                .unwrap_or(dev_mock_default),
            auth_token_key: option_env!("AUTH_TOKEN_KEY")
                .unwrap_or(STORAGE_KEY_AUTH_TOKEN)
                .to_string(),
            environment,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtiene la URL del backend según el entorno actual
    pub fn backend_url(&self) -> &str {
        if self.is_production() {
            &self.backend_url_production
        } else {
            &self.backend_url_development
        }
    }

    /// El override de desarrollo nunca se aplica en producción
    pub fn dev_override_enabled(&self) -> bool {
        self.dev_mock_auth && !self.is_production()
    }

    pub fn log_level(&self) -> log::Level {
        if !self.enable_logging {
            return log::Level::Error;
        }
        match self.log_level.to_ascii_lowercase().as_str() {
            "trace" => log::Level::Trace,
            "debug" => log::Level::Debug,
            "warn" => log::Level::Warn,
            "error" => log::Level::Error,
            _ => log::Level::Info,
        }
    }
}

// Configuración global estática
lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}
