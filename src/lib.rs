// ============================================================================
// PROMPTLY MINI APP - Sesión + bridge del host de Telegram (RUST PURO)
// ============================================================================
// - Host: acceso a Telegram.WebApp con degradación controlada
// - Services: backend (auth, perfil, endpoints) + pantalla de inicio
// - ViewModels: máquina de estados de la sesión + affordances del host
// - State: estado reactivo con Rc<RefCell>
// - Models: estructuras compartidas con backend y host
// ============================================================================

pub mod config;
pub mod host;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
pub mod viewmodels;

#[cfg(target_arch = "wasm32")]
pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod hooks;

#[cfg(test)]
mod testing;

#[cfg(target_arch = "wasm32")]
pub use wasm_entry::*;

#[cfg(target_arch = "wasm32")]
mod wasm_entry {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_logger::Config;

    use crate::app::App;
    use crate::config::CONFIG;

    // Instancia única de App, creada en `main`
    thread_local! {
        static APP: RefCell<Option<Rc<App>>> = RefCell::new(None);
    }

    /// App en marcha (para componentes y exports)
    pub fn current_app() -> Option<Rc<App>> {
        APP.with(|app| app.borrow().clone())
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        wasm_logger::init(Config::new(CONFIG.log_level()));
        log::info!("🚀 Promptly Mini App - Rust + Telegram WebApp");

        let app = Rc::new(App::new(&CONFIG));
        app.start();
        APP.with(|cell| *cell.borrow_mut() = Some(app));
        Ok(())
    }

    /// Ancla la mini-app a la pantalla de inicio (llamable desde JavaScript)
    #[wasm_bindgen]
    pub async fn pin_to_home_screen() -> bool {
        match current_app() {
            Some(app) => app.pinner().pin().await,
            None => {
                log::warn!("⚠️ [APP] App no está inicializada");
                false
            }
        }
    }

    /// Reintenta la autenticación tras un error (botón "reintentar")
    #[wasm_bindgen]
    pub async fn retry_authentication() -> bool {
        let Some(app) = current_app() else {
            return false;
        };
        let session = app.session();
        if session.is_authenticating() {
            return false;
        }
        session.clear_error();
        session.authenticate().await.is_ok()
    }

    #[wasm_bindgen]
    pub fn logout() {
        if let Some(app) = current_app() {
            app.session().logout();
        }
    }
}
