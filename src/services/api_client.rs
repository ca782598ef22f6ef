// ============================================================================
// API CLIENT - Comunicación con el backend + ciclo de vida del token
// ============================================================================
// Adjunta `Authorization: Bearer` si hay token guardado.
// Un 401 en CUALQUIER llamada borra el token antes de devolver el error.
// ============================================================================

use serde::{de::DeserializeOwned, Serialize};

use crate::config::AppConfig;
use crate::models::{AuthRequest, AuthResponse, ErrorBody, UserProfile};
use crate::services::errors::{ApiError, FailedResponse, MSG_AUTH_FAILED, MSG_RETRY_LATER};
use crate::services::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::utils::constants::MOCK_AUTH_TOKEN;
use crate::utils::storage::{StorageError, TokenStore};

const AUTH_PATH: &str = "/users/auth/telegram/";
const ME_PATH: &str = "/users/me/";

#[cfg(target_arch = "wasm32")]
const MOCK_AUTH_DELAY_MS: u32 = 500;

/// Perfil fijo del modo desarrollo (sin Telegram)
pub fn mock_profile() -> UserProfile {
    UserProfile {
        id: 123456789,
        first_name: "Test".to_string(),
        last_name: Some("User".to_string()),
        username: Some("testuser".to_string()),
        balance: 1000.0,
        is_premium: false,
        language_code: "ru".to_string(),
    }
}

fn is_json_body(response: &HttpResponse) -> bool {
    serde_json::from_str::<serde_json::Value>(&response.body).is_ok()
}

fn backend_message(response: &HttpResponse) -> Option<String> {
    response.json::<ErrorBody>().ok().and_then(ErrorBody::into_message)
}

#[derive(Serialize)]
struct ChatMessage<'a, M> {
    model_id: M,
    message: &'a str,
}

#[derive(Serialize)]
struct AmountBody {
    amount: f64,
}

#[derive(Serialize)]
struct InviteBody {
    friend_id: i64,
}

/// Qué endpoint produjo la respuesta: cambia cómo se clasifica un 4xx
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    IdentityExchange,
    Regular,
}

/// Cliente del backend. Único dueño (junto con SessionManager) del token.
pub struct RemoteAuthClient<T, S> {
    transport: T,
    store: S,
    base_url: String,
    dev_override: bool,
}

impl<T: HttpTransport, S: TokenStore> RemoteAuthClient<T, S> {
    pub fn new(transport: T, store: S, base_url: &str) -> Self {
        Self {
            transport,
            store,
            base_url: base_url.trim_end_matches('/').to_string(),
            dev_override: false,
        }
    }

    pub fn from_config(transport: T, store: S, config: &AppConfig) -> Self {
        Self::new(transport, store, config.backend_url()).with_dev_override(config.dev_override_enabled())
    }

    /// Sin initData: perfil + token mock en lugar de llamar al backend
    pub fn with_dev_override(mut self, enabled: bool) -> Self {
        self.dev_override = enabled;
        self
    }

    pub fn dev_override(&self) -> bool {
        self.dev_override
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<String> {
        self.store.load()
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    pub fn clear_token(&self) -> Result<(), StorageError> {
        self.store.clear()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: HttpRequest) -> HttpRequest {
        match self.store.load() {
            Some(token) => request.header("Authorization", &format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let request = self.authorize(request);
        log::debug!("🌐 [API] {} {}", request.method.as_str(), request.url);

        let response = self.transport.send(request).await.map_err(|e| {
            log::error!("❌ [API] Sin respuesta: {}", e);
            ApiError::Network(e.0)
        })?;

        if response.status == 401 {
            log::warn!("🔑 [API] 401 en {}: se elimina el token guardado", response.url);
            if let Err(e) = self.store.clear() {
                log::error!("❌ [API] No se pudo eliminar el token: {}", e);
            }
        }

        Ok(response)
    }

    fn classify<R: DeserializeOwned>(
        &self,
        response: HttpResponse,
        endpoint: Endpoint,
    ) -> Result<R, ApiError> {
        if response.ok() {
            if response.is_html() {
                return Err(self.html_error(&response));
            }
            return response.json::<R>().map_err(|e| {
                log::error!("❌ [API] Respuesta inválida de {}: {}", response.url, e);
                ApiError::AuthTransport {
                    message: format!("Некорректный ответ сервера. Status: {}. {}", response.status, MSG_RETRY_LATER),
                    response: Box::new(FailedResponse::from(&response)),
                }
            });
        }

        log::error!(
            "❌ [API] {} {} → {} {}",
            response.method.as_str(),
            response.url,
            response.status,
            response.status_text
        );

        if response.status == 401 {
            return Err(ApiError::AuthRejected {
                message: backend_message(&response).unwrap_or_else(|| MSG_AUTH_FAILED.to_string()),
                response: Box::new(FailedResponse::from(&response)),
            });
        }

        if response.is_html() {
            return Err(self.html_error(&response));
        }

        if !is_json_body(&response) {
            return Err(ApiError::AuthTransport {
                message: format!("Некорректный ответ сервера. Status: {}. {}", response.status, MSG_RETRY_LATER),
                response: Box::new(FailedResponse::from(&response)),
            });
        }

        let message = backend_message(&response);
        let rejected = endpoint == Endpoint::IdentityExchange && (400..500).contains(&response.status);
        let failed = Box::new(FailedResponse::from(&response));

        if rejected {
            Err(ApiError::AuthRejected {
                message: message.unwrap_or_else(|| MSG_AUTH_FAILED.to_string()),
                response: failed,
            })
        } else {
            Err(ApiError::Http {
                message: message.unwrap_or_else(|| response.status_text.clone()),
                response: failed,
            })
        }
    }

    fn html_error(&self, response: &HttpResponse) -> ApiError {
        ApiError::AuthTransport {
            message: format!("Сервер вернул HTML вместо JSON. Status: {}. {}", response.status, MSG_RETRY_LATER),
            response: Box::new(FailedResponse::from(response)),
        }
    }

    // ===== AUTH =====

    /// Intercambia initData por token + perfil. Persiste el token recibido.
    pub async fn exchange_identity(&self, payload: &str) -> Result<AuthResponse, ApiError> {
        if payload.is_empty() {
            if self.dev_override {
                return self.mock_exchange().await;
            }
            log::error!("❌ [AUTH] initData vacío y sin override de desarrollo");
            return Err(ApiError::HostUnavailable);
        }

        log::info!("🔐 [AUTH] Autenticando con backend (initData: {} bytes)", payload.len());

        let request = HttpRequest::post_json(
            &self.url(AUTH_PATH),
            &AuthRequest {
                init_data: payload.to_string(),
            },
        )
        .map_err(|e| ApiError::Serialization(e.to_string()))?;

        let response = self.execute(request).await?;
        let auth: AuthResponse = self.classify(response, Endpoint::IdentityExchange)?;

        if let Some(token) = auth.token.as_deref() {
            self.store.save(token)?;
        } else {
            log::warn!("⚠️ [AUTH] Respuesta de auth sin token");
        }

        log::info!("✅ [AUTH] Autenticación correcta (user id: {})", auth.user.id);
        Ok(auth)
    }

    async fn mock_exchange(&self) -> Result<AuthResponse, ApiError> {
        log::info!("🔧 [AUTH] Modo desarrollo: autenticación mock");

        #[cfg(target_arch = "wasm32")]
        gloo_timers::future::TimeoutFuture::new(MOCK_AUTH_DELAY_MS).await;

        self.store.save(MOCK_AUTH_TOKEN)?;
        Ok(AuthResponse {
            token: Some(MOCK_AUTH_TOKEN.to_string()),
            user: mock_profile(),
        })
    }

    /// Perfil confirmado por el backend. Un 401 borra el token.
    pub async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        self.get_json(ME_PATH).await
    }

    // ===== PETICIONES GENÉRICAS =====

    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let response = self.execute(HttpRequest::get(&self.url(path))).await?;
        self.classify(response, Endpoint::Regular)
    }

    pub async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let request = HttpRequest::post_json(&self.url(path), body)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        let response = self.execute(request).await?;
        self.classify(response, Endpoint::Regular)
    }

    // ===== ENDPOINTS =====

    pub async fn get_balance(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json("/users/balance/").await
    }

    pub async fn get_token_history(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json("/users/token-history/").await
    }

    pub async fn get_replenishments(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json("/users/transactions/replenishments/").await
    }

    pub async fn get_write_offs(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json("/users/transactions/write-offs/").await
    }

    pub async fn get_settings(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json("/users/settings/").await
    }

    pub async fn update_settings<B: Serialize>(&self, settings: &B) -> Result<serde_json::Value, ApiError> {
        self.post_json("/users/settings/", settings).await
    }

    pub async fn get_models(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json("/models/").await
    }

    pub async fn send_message<M: Serialize>(
        &self,
        model_id: M,
        message: &str,
    ) -> Result<serde_json::Value, ApiError> {
        self.post_json("/chat/send/", &ChatMessage { model_id, message })
            .await
    }

    pub async fn add_balance(&self, amount: f64) -> Result<serde_json::Value, ApiError> {
        self.post_json("/users/add-balance/", &AmountBody { amount }).await
    }

    pub async fn invite_friend(&self, friend_id: i64) -> Result<serde_json::Value, ApiError> {
        self.post_json("/users/invite/", &InviteBody { friend_id }).await
    }
}
