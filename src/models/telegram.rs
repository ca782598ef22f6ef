// ============================================================================
// TELEGRAM WEBAPP - Tipos compartidos con el host
// ============================================================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    Light,
    #[default]
    Dark,
}

impl ColorScheme {
    /// Valores desconocidos caen en oscuro, igual que sin host
    pub fn parse(value: &str) -> Self {
        match value {
            "light" => ColorScheme::Light,
            _ => ColorScheme::Dark,
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, ColorScheme::Dark)
    }
}

/// `themeParams` del host. Cada clave es opcional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeParams {
    #[serde(default)]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub hint_color: Option<String>,
    #[serde(default)]
    pub link_color: Option<String>,
    #[serde(default)]
    pub button_color: Option<String>,
    #[serde(default)]
    pub button_text_color: Option<String>,
    #[serde(default)]
    pub secondary_bg_color: Option<String>,
}

impl ThemeParams {
    /// Pares (variable CSS, valor) solo para las claves presentes
    pub fn css_variables(&self) -> Vec<(&'static str, &str)> {
        [
            ("--tg-bg-color", &self.bg_color),
            ("--tg-text-color", &self.text_color),
            ("--tg-hint-color", &self.hint_color),
            ("--tg-link-color", &self.link_color),
            ("--tg-button-color", &self.button_color),
            ("--tg-button-text-color", &self.button_text_color),
            ("--tg-secondary-bg-color", &self.secondary_bg_color),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.css_variables().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticKind {
    Light,
    Medium,
    Heavy,
    Selection,
    Success,
    Error,
    Warning,
}

impl HapticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HapticKind::Light => "light",
            HapticKind::Medium => "medium",
            HapticKind::Heavy => "heavy",
            HapticKind::Selection => "selection",
            HapticKind::Success => "success",
            HapticKind::Error => "error",
            HapticKind::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Android,
    Other(String),
}

impl Platform {
    pub fn parse(value: &str) -> Self {
        match value {
            "ios" => Platform::Ios,
            "android" | "android_x" => Platform::Android,
            other => Platform::Other(other.to_string()),
        }
    }

    pub fn unknown() -> Self {
        Platform::Other("unknown".to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeScreenStatus {
    Unsupported,
    Added,
    NotAdded,
    Unknown,
}

impl HomeScreenStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "unsupported" => HomeScreenStatus::Unsupported,
            "added" => HomeScreenStatus::Added,
            "missed" => HomeScreenStatus::NotAdded,
            _ => HomeScreenStatus::Unknown,
        }
    }
}

const POPUP_MESSAGE_MAX: usize = 256;
const POPUP_TITLE_MAX: usize = 64;
const POPUP_BUTTONS_MAX: usize = 3;
const POPUP_BUTTON_FIELD_MAX: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopupButtonKind {
    Default,
    Ok,
    Close,
    Cancel,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupButton {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PopupButtonKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
}

impl PopupButton {
    pub fn ok(text: &str) -> Self {
        Self {
            id: String::new(),
            kind: PopupButtonKind::Ok,
            text: text.to_string(),
        }
    }

    pub fn new(id: &str, kind: PopupButtonKind, text: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupParams {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub message: String,
    pub buttons: Vec<PopupButton>,
}

impl PopupParams {
    /// Popup informativo con un único botón "ok"
    pub fn notice(title: &str, message: &str, ok_text: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            buttons: vec![PopupButton::ok(ok_text)],
        }
    }

    /// Límites de `showPopup`: el host rechaza (y lanza) fuera de ellos
    pub fn validate(&self) -> Result<(), String> {
        let message_len = self.message.chars().count();
        if message_len == 0 || message_len > POPUP_MESSAGE_MAX {
            return Err(format!("message debe tener 1..={} caracteres", POPUP_MESSAGE_MAX));
        }
        if self.title.chars().count() > POPUP_TITLE_MAX {
            return Err(format!("title admite como máximo {} caracteres", POPUP_TITLE_MAX));
        }
        if self.buttons.is_empty() || self.buttons.len() > POPUP_BUTTONS_MAX {
            return Err(format!("se requieren 1..={} botones", POPUP_BUTTONS_MAX));
        }
        for button in &self.buttons {
            if button.id.chars().count() > POPUP_BUTTON_FIELD_MAX {
                return Err(format!("id de botón demasiado largo: '{}'", button.id));
            }
            let needs_text = matches!(
                button.kind,
                PopupButtonKind::Default | PopupButtonKind::Destructive
            );
            let text_len = button.text.chars().count();
            if needs_text && (text_len == 0 || text_len > POPUP_BUTTON_FIELD_MAX) {
                return Err(format!(
                    "el botón '{}' necesita texto de 1..={} caracteres",
                    button.id, POPUP_BUTTON_FIELD_MAX
                ));
            }
        }
        Ok(())
    }
}
