// ============================================================================
// HOST WEB - `window.Telegram.WebApp` vía js_sys::Reflect
// ============================================================================
// Cada acceso a un miembro es opcional: ausente = None / no-op.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use js_sys::{Function, Reflect, JSON};
use serde::de::DeserializeOwned;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlElement;

use super::traits::{
    settle_on_failure, ButtonAction, HandlerId, HostButton, HostCallback, HostEvent, HostHandler,
    HostRuntime, StyleSink,
};
use crate::models::{HapticKind, HostUser, PopupParams, ThemeParams};

fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn get_string(target: &JsValue, key: &str) -> Option<String> {
    get(target, key)?.as_string()
}

fn get_f64(target: &JsValue, key: &str) -> Option<f64> {
    get(target, key)?.as_f64()
}

fn method(target: &JsValue, name: &str) -> Option<Function> {
    get(target, name)?.dyn_into::<Function>().ok()
}

/// Llama `target.name(args...)`. `false` si el miembro falta o lanzó.
fn call(target: &JsValue, name: &str, args: &[&JsValue]) -> bool {
    let Some(function) = method(target, name) else {
        log::debug!("🔍 [HOST] {} no disponible", name);
        return false;
    };
    let result = match args {
        [] => function.call0(target),
        [a] => function.call1(target, a),
        [a, b] => function.call2(target, a, b),
        [a, b, c, ..] => function.call3(target, a, b, c),
    };
    match result {
        Ok(_) => true,
        Err(e) => {
            log::error!("❌ [HOST] {} lanzó: {:?}", name, e);
            false
        }
    }
}

/// Objeto JS → tipo Rust pasando por JSON.stringify
fn from_js<T: DeserializeOwned>(value: &JsValue) -> Option<T> {
    let json = JSON::stringify(value).ok()?.as_string()?;
    serde_json::from_str(&json).ok()
}

/// Handlers registrados en el host. La closure debe vivir hasta el `off*`.
type ClosureTable = RefCell<HashMap<HandlerId, Closure<dyn Fn()>>>;

/// `Telegram.WebApp` real
pub struct WebAppRuntime {
    web_app: JsValue,
    next_id: Cell<u64>,
    clicks: ClosureTable,
    events: ClosureTable,
}

impl WebAppRuntime {
    /// `None` si la página no corre dentro de Telegram
    pub fn detect() -> Option<Self> {
        let window: JsValue = web_sys::window()?.into();
        let web_app = get(&window, "Telegram").and_then(|t| get(&t, "WebApp"))?;
        log::info!("📱 [HOST] Telegram WebApp detectado");
        Some(Self {
            web_app,
            next_id: Cell::new(0),
            clicks: RefCell::new(HashMap::new()),
            events: RefCell::new(HashMap::new()),
        })
    }

    fn next_handler_id(&self) -> HandlerId {
        self.next_id.set(self.next_id.get() + 1);
        HandlerId(self.next_id.get())
    }

    fn button_object(&self, button: HostButton) -> Option<JsValue> {
        get(&self.web_app, button.member())
    }
}

impl HostRuntime for WebAppRuntime {
    fn has_member(&self, name: &str) -> bool {
        get(&self.web_app, name).is_some()
    }

    fn init_data(&self) -> Option<String> {
        get_string(&self.web_app, "initData").filter(|d| !d.is_empty())
    }

    fn init_data_user(&self) -> Option<HostUser> {
        let unsafe_data = get(&self.web_app, "initDataUnsafe")?;
        from_js(&get(&unsafe_data, "user")?)
    }

    fn start_param(&self) -> Option<String> {
        get_string(&get(&self.web_app, "initDataUnsafe")?, "start_param")
    }

    fn color_scheme(&self) -> Option<String> {
        get_string(&self.web_app, "colorScheme")
    }

    fn theme_params(&self) -> ThemeParams {
        get(&self.web_app, "themeParams")
            .and_then(|t| from_js(&t))
            .unwrap_or_default()
    }

    fn background_color(&self) -> Option<String> {
        get_string(&self.web_app, "backgroundColor")
    }

    fn platform(&self) -> Option<String> {
        get_string(&self.web_app, "platform")
    }

    fn version(&self) -> Option<String> {
        get_string(&self.web_app, "version")
    }

    fn is_expanded(&self) -> bool {
        get(&self.web_app, "isExpanded")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn viewport_height(&self) -> Option<f64> {
        get_f64(&self.web_app, "viewportHeight")
    }

    fn viewport_stable_height(&self) -> Option<f64> {
        get_f64(&self.web_app, "viewportStableHeight")
    }

    fn ready(&self) {
        call(&self.web_app, "ready", &[]);
    }

    fn expand(&self) {
        call(&self.web_app, "expand", &[]);
    }

    fn close(&self) {
        call(&self.web_app, "close", &[]);
    }

    fn set_header_color(&self, color: &str) {
        call(&self.web_app, "setHeaderColor", &[&JsValue::from_str(color)]);
    }

    fn set_background_color(&self, color: &str) {
        call(&self.web_app, "setBackgroundColor", &[&JsValue::from_str(color)]);
    }

    fn open_link(&self, url: &str, try_instant_view: bool) {
        let options = js_sys::Object::new();
        let _ = Reflect::set(
            &options,
            &JsValue::from_str("try_instant_view"),
            &JsValue::from_bool(try_instant_view),
        );
        let options: JsValue = options.into();
        call(&self.web_app, "openLink", &[&JsValue::from_str(url), &options]);
    }

    fn open_telegram_link(&self, url: &str) {
        call(&self.web_app, "openTelegramLink", &[&JsValue::from_str(url)]);
    }

    fn button(&self, button: HostButton, action: ButtonAction) {
        let Some(target) = self.button_object(button) else {
            return;
        };
        match action {
            ButtonAction::Show => call(&target, "show", &[]),
            ButtonAction::Hide => call(&target, "hide", &[]),
            ButtonAction::Enable => call(&target, "enable", &[]),
            ButtonAction::Disable => call(&target, "disable", &[]),
            ButtonAction::ShowProgress => call(&target, "showProgress", &[]),
            ButtonAction::HideProgress => call(&target, "hideProgress", &[]),
            ButtonAction::SetText(text) => call(&target, "setText", &[&JsValue::from_str(&text)]),
        };
    }

    fn on_button_click(&self, button: HostButton, handler: HostHandler) -> HandlerId {
        let id = self.next_handler_id();
        let closure = Closure::<dyn Fn()>::new(move || handler());
        if let Some(target) = self.button_object(button) {
            call(&target, "onClick", &[closure.as_ref()]);
        }
        self.clicks.borrow_mut().insert(id, closure);
        id
    }

    fn off_button_click(&self, button: HostButton, id: HandlerId) {
        let Some(closure) = self.clicks.borrow_mut().remove(&id) else {
            return;
        };
        if let Some(target) = self.button_object(button) {
            call(&target, "offClick", &[closure.as_ref()]);
        }
    }

    fn haptic(&self, kind: HapticKind) {
        let Some(haptics) = get(&self.web_app, "HapticFeedback") else {
            return;
        };
        let style = JsValue::from_str(kind.as_str());
        match kind {
            HapticKind::Light | HapticKind::Medium | HapticKind::Heavy => {
                call(&haptics, "impactOccurred", &[&style])
            }
            HapticKind::Success | HapticKind::Error | HapticKind::Warning => {
                call(&haptics, "notificationOccurred", &[&style])
            }
            HapticKind::Selection => call(&haptics, "selectionChanged", &[]),
        };
    }

    fn on_event(&self, event: HostEvent, handler: HostHandler) -> HandlerId {
        let id = self.next_handler_id();
        let closure = Closure::<dyn Fn()>::new(move || handler());
        call(
            &self.web_app,
            "onEvent",
            &[&JsValue::from_str(event.as_str()), closure.as_ref()],
        );
        self.events.borrow_mut().insert(id, closure);
        id
    }

    fn off_event(&self, event: HostEvent, id: HandlerId) {
        if let Some(closure) = self.events.borrow_mut().remove(&id) {
            call(
                &self.web_app,
                "offEvent",
                &[&JsValue::from_str(event.as_str()), closure.as_ref()],
            );
        }
    }

    // Los callbacks de diálogos quedan a cargo del GC de JS (`into_js_value`).
    // Si el host lanza, se resuelven aquí con el valor por defecto.

    fn show_alert(&self, message: &str, done: HostCallback<()>) {
        settle_on_failure(done, (), |done| {
            let callback = Closure::<dyn Fn()>::new(move || done(())).into_js_value();
            call(&self.web_app, "showAlert", &[&JsValue::from_str(message), &callback])
        });
    }

    fn show_confirm(&self, message: &str, done: HostCallback<bool>) {
        settle_on_failure(done, false, |done| {
            let callback =
                Closure::<dyn Fn(JsValue)>::new(move |ok: JsValue| done(ok.as_bool().unwrap_or(false)))
                    .into_js_value();
            call(&self.web_app, "showConfirm", &[&JsValue::from_str(message), &callback])
        });
    }

    fn show_popup(&self, params: &PopupParams, done: HostCallback<Option<String>>) {
        let params = match serde_json::to_string(params)
            .ok()
            .and_then(|json| JSON::parse(&json).ok())
        {
            Some(params) => params,
            None => {
                log::error!("❌ [HOST] No se pudo serializar el popup");
                done(None);
                return;
            }
        };
        settle_on_failure(done, None, |done| {
            let callback = Closure::<dyn Fn(JsValue)>::new(move |id: JsValue| done(id.as_string()))
                .into_js_value();
            call(&self.web_app, "showPopup", &[&params, &callback])
        });
    }

    fn check_home_screen_status(&self, done: HostCallback<String>) {
        settle_on_failure(done, "unknown".to_string(), |done| {
            let callback = Closure::<dyn Fn(JsValue)>::new(move |status: JsValue| {
                done(status.as_string().unwrap_or_else(|| "unknown".to_string()))
            })
            .into_js_value();
            call(&self.web_app, "checkHomeScreenStatus", &[&callback])
        });
    }

    fn add_to_home_screen(&self) {
        call(&self.web_app, "addToHomeScreen", &[]);
    }
}

/// Variables CSS en `<html>` y fondo en `<body>`
#[derive(Default)]
pub struct DocumentStyle;

impl DocumentStyle {
    fn root() -> Option<HtmlElement> {
        web_sys::window()?
            .document()?
            .document_element()?
            .dyn_into::<HtmlElement>()
            .ok()
    }
}

impl StyleSink for DocumentStyle {
    fn set_property(&self, name: &str, value: &str) {
        if let Some(root) = Self::root() {
            if let Err(e) = root.style().set_property(name, value) {
                log::warn!("⚠️ [HOST] No se pudo escribir {}: {:?}", name, e);
            }
        }
    }

    fn set_background(&self, color: &str) {
        let body = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.body());
        if let Some(body) = body {
            let _ = body.style().set_property("background-color", color);
        }
    }
}
