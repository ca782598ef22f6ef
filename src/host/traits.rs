use std::rc::Rc;

use crate::models::{HapticKind, HostUser, PopupParams, ThemeParams};

/// Callback que el host invoca al cerrar un diálogo. Puede llamarse más de una vez.
pub type HostCallback<T> = Box<dyn Fn(T)>;

/// Entrega `done` a `invoke`; si la invocación no llegó al host (`false`),
/// resuelve con `fallback` para que nadie se quede esperando.
pub fn settle_on_failure<T: 'static>(
    done: HostCallback<T>,
    fallback: T,
    invoke: impl FnOnce(HostCallback<T>) -> bool,
) {
    let shared: Rc<dyn Fn(T)> = Rc::from(done);
    let for_host = shared.clone();
    if !invoke(Box::new(move |value: T| for_host(value))) {
        shared(fallback);
    }
}

/// Handler de click / evento registrado en el host
pub type HostHandler = Rc<dyn Fn()>;

/// Identificador de un handler registrado, necesario para desregistrarlo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostButton {
    Main,
    Back,
}

impl HostButton {
    pub fn member(&self) -> &'static str {
        match self {
            HostButton::Main => "MainButton",
            HostButton::Back => "BackButton",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    Show,
    Hide,
    Enable,
    Disable,
    ShowProgress,
    HideProgress,
    SetText(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    ThemeChanged,
    ViewportChanged,
}

impl HostEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostEvent::ThemeChanged => "themeChanged",
            HostEvent::ViewportChanged => "viewportChanged",
        }
    }
}

/// Objeto runtime del host (`window.Telegram.WebApp`).
///
/// Todos los miembros son opcionales en el host real: las implementaciones
/// devuelven `None`/`false` o no hacen nada cuando falta el miembro.
pub trait HostRuntime {
    /// ¿Existe el miembro `name` en el objeto del host?
    fn has_member(&self, name: &str) -> bool;

    fn init_data(&self) -> Option<String>;
    fn init_data_user(&self) -> Option<HostUser>;
    fn start_param(&self) -> Option<String>;

    fn color_scheme(&self) -> Option<String>;
    fn theme_params(&self) -> ThemeParams;
    fn background_color(&self) -> Option<String>;
    fn platform(&self) -> Option<String>;
    fn version(&self) -> Option<String>;
    fn is_expanded(&self) -> bool;
    fn viewport_height(&self) -> Option<f64>;
    fn viewport_stable_height(&self) -> Option<f64>;

    fn ready(&self);
    fn expand(&self);
    fn close(&self);
    fn set_header_color(&self, color: &str);
    fn set_background_color(&self, color: &str);
    fn open_link(&self, url: &str, try_instant_view: bool);
    fn open_telegram_link(&self, url: &str);

    fn button(&self, button: HostButton, action: ButtonAction);
    fn on_button_click(&self, button: HostButton, handler: HostHandler) -> HandlerId;
    fn off_button_click(&self, button: HostButton, id: HandlerId);

    fn haptic(&self, kind: HapticKind);

    fn on_event(&self, event: HostEvent, handler: HostHandler) -> HandlerId;
    fn off_event(&self, event: HostEvent, id: HandlerId);

    // Los diálogos siempre terminan llamando a `done`, también si el host falla

    fn show_alert(&self, message: &str, done: HostCallback<()>);
    fn show_confirm(&self, message: &str, done: HostCallback<bool>);
    fn show_popup(&self, params: &PopupParams, done: HostCallback<Option<String>>);

    fn check_home_screen_status(&self, done: HostCallback<String>);
    fn add_to_home_screen(&self);
}

/// Variables de estilo globales (`<html>` / `<body>`)
pub trait StyleSink {
    fn set_property(&self, name: &str, value: &str);
    fn set_background(&self, color: &str);
}

/// Sink que descarta todo (sin documento disponible)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStyle;

impl StyleSink for NoopStyle {
    fn set_property(&self, _name: &str, _value: &str) {}
    fn set_background(&self, _color: &str) {}
}
