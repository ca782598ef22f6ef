// ============================================================================
// HOME SCREEN SERVICE - Anclar la mini-app a la pantalla de inicio
// ============================================================================
// Nunca falla: cada rama devuelve si el anclado se llegó a invocar.
// ============================================================================

use std::rc::Rc;

use crate::host::HostBridge;
use crate::models::{HomeScreenStatus, Platform, PopupParams};

pub const INSTRUCTIONS_TITLE: &str = "Добавить на главный экран";
pub const INSTRUCTIONS_OK: &str = "Понятно";
pub const MSG_ALREADY_ADDED: &str = "Бот уже добавлен на главный экран! 🎉";

const INSTRUCTIONS_IOS: &str = "📱 Инструкция для iOS:\n\n1. Откройте бота в Safari\n2. Нажмите кнопку \"Поделиться\" (квадрат со стрелкой)\n3. Выберите \"На экран Домой\"\n4. Нажмите \"Добавить\"";
const INSTRUCTIONS_ANDROID: &str = "📱 Инструкция для Android:\n\n1. Откройте меню браузера (три точки)\n2. Выберите \"Добавить на главный экран\"\n3. Подтвердите добавление";
const INSTRUCTIONS_GENERIC: &str = "📱 Как добавить на главный экран:\n\nК сожалению, ваше устройство не поддерживает автоматическое добавление.\n\nВы можете добавить бота вручную через настройки браузера:\n• Найдите опцию \"Добавить на главный экран\"\n• Или создайте закладку для быстрого доступа";

/// Texto de instrucciones manuales según la plataforma
pub fn instructions_for(platform: &Platform) -> &'static str {
    match platform {
        Platform::Ios => INSTRUCTIONS_IOS,
        Platform::Android => INSTRUCTIONS_ANDROID,
        Platform::Other(_) => INSTRUCTIONS_GENERIC,
    }
}

/// Aviso cuando no hay popup del host: (título, mensaje)
pub type FallbackNotice = Box<dyn Fn(&str, &str)>;

pub struct HomeScreenPinner {
    bridge: Rc<HostBridge>,
    fallback: FallbackNotice,
}

impl HomeScreenPinner {
    pub fn new(bridge: Rc<HostBridge>, fallback: FallbackNotice) -> Self {
        Self { bridge, fallback }
    }

    /// En el navegador el aviso de respaldo es `window.alert`
    #[cfg(target_arch = "wasm32")]
    pub fn for_browser(bridge: Rc<HostBridge>) -> Self {
        Self::new(bridge, Box::new(browser_alert))
    }

    pub async fn pin(&self) -> bool {
        let caps = self.bridge.capabilities();
        log::debug!(
            "📌 [HOME] Inicio (disponible: {}, plataforma: {})",
            caps.available,
            caps.platform.as_str()
        );

        if !self.bridge.is_available() {
            log::debug!("📌 [HOME] Telegram no disponible");
            self.show_instructions().await;
            return false;
        }

        log::debug!(
            "📌 [HOME] checkHomeScreenStatus: {}, addToHomeScreen: {}",
            caps.home_screen_status,
            caps.add_to_home_screen
        );

        if !caps.home_screen_status {
            if self.bridge.add_to_home_screen() {
                log::debug!("📌 [HOME] addToHomeScreen invocado directamente");
                return true;
            }
            log::debug!("📌 [HOME] Sin capacidades de pantalla de inicio");
            self.show_instructions().await;
            return false;
        }

        let status = self.bridge.home_screen_status().await;
        log::debug!("📌 [HOME] Estado: {:?}", status);

        match status {
            HomeScreenStatus::Unsupported => {
                self.show_instructions().await;
                false
            }
            HomeScreenStatus::Added => {
                self.bridge.alert(MSG_ALREADY_ADDED).await;
                true
            }
            HomeScreenStatus::NotAdded | HomeScreenStatus::Unknown => {
                if self.bridge.add_to_home_screen() {
                    return true;
                }
                log::debug!("📌 [HOME] Estado consultado pero sin addToHomeScreen");
                self.show_instructions().await;
                false
            }
        }
    }

    async fn show_instructions(&self) {
        let message = instructions_for(self.bridge.platform());

        if !self.bridge.capabilities().popup {
            (self.fallback)(INSTRUCTIONS_TITLE, message);
            return;
        }

        let params = PopupParams::notice(INSTRUCTIONS_TITLE, message, INSTRUCTIONS_OK);
        if let Err(e) = self.bridge.popup(&params).await {
            log::warn!("⚠️ [HOME] {}", e);
            (self.fallback)(INSTRUCTIONS_TITLE, message);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn browser_alert(title: &str, message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(&format!("{}\n\n{}", title, message));
    }
}
