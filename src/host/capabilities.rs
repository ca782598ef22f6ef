use crate::host::traits::{HostButton, HostRuntime};
use crate::models::Platform;

const MEMBER_HAPTICS: &str = "HapticFeedback";
const MEMBER_ALERT: &str = "showAlert";
const MEMBER_CONFIRM: &str = "showConfirm";
const MEMBER_POPUP: &str = "showPopup";
const MEMBER_EVENTS: &str = "onEvent";
const MEMBER_HOME_STATUS: &str = "checkHomeScreenStatus";
const MEMBER_ADD_TO_HOME: &str = "addToHomeScreen";

/// Capacidades del host, calculadas UNA vez al construir el bridge.
/// Lo que falta al arrancar se considera ausente durante toda la sesión.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityFlags {
    pub available: bool,
    pub platform: Platform,
    pub version: String,
    pub main_button: bool,
    pub back_button: bool,
    pub haptics: bool,
    pub alert: bool,
    pub confirm: bool,
    pub popup: bool,
    pub events: bool,
    pub home_screen_status: bool,
    pub add_to_home_screen: bool,
}

impl CapabilityFlags {
    /// Sin host: todo deshabilitado
    pub fn none() -> Self {
        Self {
            available: false,
            platform: Platform::unknown(),
            version: "0".to_string(),
            main_button: false,
            back_button: false,
            haptics: false,
            alert: false,
            confirm: false,
            popup: false,
            events: false,
            home_screen_status: false,
            add_to_home_screen: false,
        }
    }

    pub fn detect(runtime: Option<&dyn HostRuntime>) -> Self {
        let Some(host) = runtime else {
            return Self::none();
        };

        Self {
            available: true,
            platform: host
                .platform()
                .map(|p| Platform::parse(&p))
                .unwrap_or_else(Platform::unknown),
            version: host.version().unwrap_or_else(|| "0".to_string()),
            main_button: host.has_member(HostButton::Main.member()),
            back_button: host.has_member(HostButton::Back.member()),
            haptics: host.has_member(MEMBER_HAPTICS),
            alert: host.has_member(MEMBER_ALERT),
            confirm: host.has_member(MEMBER_CONFIRM),
            popup: host.has_member(MEMBER_POPUP),
            events: host.has_member(MEMBER_EVENTS),
            home_screen_status: host.has_member(MEMBER_HOME_STATUS),
            add_to_home_screen: host.has_member(MEMBER_ADD_TO_HOME),
        }
    }

    pub fn supports_button(&self, button: HostButton) -> bool {
        match button {
            HostButton::Main => self.main_button,
            HostButton::Back => self.back_button,
        }
    }
}
