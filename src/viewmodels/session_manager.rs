// ============================================================================
// SESSION MANAGER - Máquina de estados de la sesión
// ============================================================================
// Unauthenticated → Authenticating → Authenticated
// Único que muta `Session`. Los errores de auth quedan en
// `auth_error`/`debug_info` además de devolverse al llamador.
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use crate::host::HostBridge;
use crate::models::{Session, UserProfile};
use crate::services::api_client::RemoteAuthClient;
use crate::services::errors::{ApiError, MSG_NETWORK};
use crate::services::http::HttpTransport;
use crate::state::{ReactiveState, SubscriptionId};
use crate::utils::storage::TokenStore;

/// Mensaje para el usuario a partir del error
fn user_message(error: &ApiError) -> String {
    match error {
        ApiError::Network(_) => MSG_NETWORK.to_string(),
        other => other.to_string(),
    }
}

pub struct SessionManager<T, S> {
    bridge: Rc<HostBridge>,
    client: RemoteAuthClient<T, S>,
    state: ReactiveState<Session>,
    // Sube con cada logout; una respuesta de otra época se descarta
    epoch: Cell<u64>,
}

impl<T: HttpTransport, S: TokenStore> SessionManager<T, S> {
    pub fn new(bridge: Rc<HostBridge>, client: RemoteAuthClient<T, S>) -> Self {
        Self {
            bridge,
            client,
            state: ReactiveState::new(Session::default()),
            epoch: Cell::new(0),
        }
    }

    pub fn bridge(&self) -> &Rc<HostBridge> {
        &self.bridge
    }

    /// Para los endpoints secundarios (balance, modelos, chat...)
    pub fn client(&self) -> &RemoteAuthClient<T, S> {
        &self.client
    }

    /// Copia del estado actual
    pub fn session(&self) -> Session {
        self.state.snapshot()
    }

    /// Estado compartido (los clones ven los mismos cambios)
    pub fn store(&self) -> ReactiveState<Session> {
        self.state.clone()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Session) + 'static,
    {
        self.state.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.state.unsubscribe(id);
    }

    pub fn is_authenticating(&self) -> bool {
        self.state.with(|s| s.authenticating)
    }

    /// Arranque: revalida el token guardado y, si no vale, autentica de cero
    pub async fn init(&self) -> Result<(), ApiError> {
        log::info!("🚀 [SESSION] Inicializando sesión");
        self.bridge.init();

        if self.client.has_token() {
            log::info!("🔑 [SESSION] Token guardado encontrado, verificando...");
            let epoch = self.epoch.get();
            let result = self.client.fetch_profile().await;
            if self.epoch.get() != epoch {
                log::info!("👋 [SESSION] Logout durante la verificación del token");
                return Ok(());
            }
            match result {
                Ok(user) => {
                    log::info!("✅ [SESSION] Token válido (user id: {})", user.id);
                    self.state.update(|s| {
                        s.user = Some(user);
                        s.authenticated = true;
                    });
                    return Ok(());
                }
                Err(e) => {
                    let stale = ApiError::StaleToken(e.to_string());
                    log::warn!("⚠️ [SESSION] {}", stale);
                    self.state.update(|s| {
                        s.user = None;
                        s.authenticated = false;
                    });
                }
            }
        }

        self.authenticate().await.map(|_| ())
    }

    /// Intercambia el initData del host por un token. Nunca hay dos a la vez.
    pub async fn authenticate(&self) -> Result<UserProfile, ApiError> {
        if self.is_authenticating() {
            log::warn!("⏳ [SESSION] Autenticación ya en curso, se ignora la llamada");
            return Err(ApiError::AuthInProgress);
        }

        self.state.update(|s| {
            s.authenticating = true;
            s.auth_error = None;
            s.debug_info = None;
        });

        let epoch = self.epoch.get();
        let payload = self.bridge.identity_payload();
        let result = self.client.exchange_identity(&payload).await;

        if self.epoch.get() != epoch {
            log::warn!("👋 [SESSION] Logout durante la autenticación, se descarta el resultado");
            if result.is_ok() {
                if let Err(e) = self.client.clear_token() {
                    log::error!("❌ [SESSION] No se pudo borrar el token: {}", e);
                }
            }
            self.state.update(|s| s.authenticating = false);
            return Err(ApiError::SessionClosed);
        }

        match result {
            Ok(auth) => {
                let user = auth.user;
                self.state.update(|s| {
                    s.user = Some(user.clone());
                    s.authenticated = true;
                    s.authenticating = false;
                });
                Ok(user)
            }
            Err(e) => {
                log::error!("❌ [SESSION] Error de autenticación: {}", e);
                let message = user_message(&e);
                let debug_info = e.debug_info();
                self.state.update(|s| {
                    s.user = None;
                    s.authenticated = false;
                    s.authenticating = false;
                    s.auth_error = Some(message);
                    s.debug_info = Some(debug_info);
                });
                Err(e)
            }
        }
    }

    /// Vuelve a pedir `/users/me/`. Un 401 cierra la sesión.
    pub async fn refresh_user(&self) -> Result<UserProfile, ApiError> {
        self.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let epoch = self.epoch.get();
        let result = self.client.fetch_profile().await;
        if self.epoch.get() != epoch {
            self.state.update(|s| s.loading = false);
            return Err(ApiError::SessionClosed);
        }
        match &result {
            Ok(user) => {
                let user = user.clone();
                self.state.update(|s| {
                    s.user = Some(user);
                    s.loading = false;
                });
            }
            Err(e) => {
                log::error!("❌ [SESSION] Error actualizando usuario: {}", e);
                let message = user_message(e);
                self.state.update(|s| {
                    s.loading = false;
                    s.error = Some(message);
                });
                self.handle_failure(e);
            }
        }
        result
    }

    /// Para llamadas autenticadas hechas fuera del manager: un 401 cierra la sesión
    pub fn handle_failure(&self, error: &ApiError) {
        if error.is_unauthorized() && self.state.with(|s| s.authenticated) {
            log::warn!("🔑 [SESSION] 401 con sesión activa: se cierra la sesión");
            self.state.update(|s| {
                s.user = None;
                s.authenticated = false;
            });
        }
    }

    pub fn logout(&self) {
        log::info!("👋 [SESSION] Cerrando sesión");
        self.epoch.set(self.epoch.get() + 1);
        if let Err(e) = self.client.clear_token() {
            log::error!("❌ [SESSION] No se pudo borrar el token: {}", e);
        }
        self.state.update(|s| {
            s.user = None;
            s.authenticated = false;
            s.auth_error = None;
            s.debug_info = None;
        });
    }

    pub fn clear_error(&self) {
        self.state.update(|s| {
            s.error = None;
            s.auth_error = None;
            s.debug_info = None;
        });
    }
}
