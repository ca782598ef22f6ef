// ============================================================================
// APP - Composición de la aplicación en el navegador
// ============================================================================
// Construye bridge, sesión y pinner una sola vez y los inyecta.
// ============================================================================

use std::rc::Rc;

use crate::config::AppConfig;
use crate::host::web::{DocumentStyle, WebAppRuntime};
use crate::host::{HostBridge, HostRuntime};
use crate::services::{GlooTransport, HomeScreenPinner, RemoteAuthClient};
use crate::utils::storage::{LocalTokenStore, MemoryTokenStore, TokenStore};
use crate::viewmodels::{BackButtonProxy, HapticsProxy, HostViewModel, MainButtonProxy, SessionManager};

pub type BrowserSession = SessionManager<GlooTransport, Box<dyn TokenStore>>;

pub struct App {
    bridge: Rc<HostBridge>,
    session: Rc<BrowserSession>,
    host_view: HostViewModel,
    pinner: HomeScreenPinner,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        let runtime = WebAppRuntime::detect().map(|r| Rc::new(r) as Rc<dyn HostRuntime>);
        if runtime.is_none() {
            log::warn!("⚠️ [APP] Fuera de Telegram: funciones del host desactivadas");
        }
        let bridge = Rc::new(HostBridge::new(runtime, Rc::new(DocumentStyle)));

        let store: Box<dyn TokenStore> = if LocalTokenStore::is_available() {
            Box::new(LocalTokenStore::new(&config.auth_token_key))
        } else {
            log::warn!("⚠️ [APP] localStorage no disponible, token solo en memoria");
            Box::new(MemoryTokenStore::new())
        };

        let client = RemoteAuthClient::from_config(GlooTransport, store, config);
        log::info!(
            "🌐 [APP] Backend: {} (entorno: {})",
            client.base_url(),
            config.environment
        );

        Self {
            session: Rc::new(SessionManager::new(bridge.clone(), client)),
            host_view: HostViewModel::new(bridge.clone()),
            pinner: HomeScreenPinner::for_browser(bridge.clone()),
            bridge,
        }
    }

    /// Escucha eventos del host y lanza `init()` de la sesión
    pub fn start(&self) {
        self.host_view.mount();

        let session = self.session.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match session.init().await {
                Ok(()) => log::info!("✅ [APP] Sesión lista"),
                Err(e) => log::error!("❌ [APP] Sesión sin autenticar: {}", e),
            }
        });
    }

    pub fn bridge(&self) -> Rc<HostBridge> {
        self.bridge.clone()
    }

    pub fn session(&self) -> Rc<BrowserSession> {
        self.session.clone()
    }

    pub fn host_view(&self) -> &HostViewModel {
        &self.host_view
    }

    pub fn pinner(&self) -> &HomeScreenPinner {
        &self.pinner
    }

    pub fn main_button(&self) -> MainButtonProxy {
        MainButtonProxy::new(self.bridge.clone())
    }

    pub fn back_button(&self) -> BackButtonProxy {
        BackButtonProxy::new(self.bridge.clone())
    }

    pub fn haptics(&self) -> HapticsProxy {
        HapticsProxy::new(self.bridge.clone())
    }
}
