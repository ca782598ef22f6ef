/// URL del backend en desarrollo (sobrescribible con BACKEND_URL_DEVELOPMENT)
pub const DEFAULT_BACKEND_URL_DEVELOPMENT: &str = "http://localhost:8000";

/// URL del backend en producción (sobrescribible con BACKEND_URL_PRODUCTION)
pub const DEFAULT_BACKEND_URL_PRODUCTION: &str = "https://promptly.freedynamicdns.org";

/// Clave de localStorage con el bearer token
pub const STORAGE_KEY_AUTH_TOKEN: &str = "auth_token";

/// Token que persiste la autenticación mock de desarrollo
pub const MOCK_AUTH_TOKEN: &str = "mock-token-dev";

/// Idioma por defecto cuando el host no informa language_code
pub const DEFAULT_LANGUAGE_CODE: &str = "ru";
