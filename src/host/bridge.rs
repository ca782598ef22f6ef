// ============================================================================
// HOST BRIDGE - Acceso a Telegram WebApp con degradación controlada
// ============================================================================
// Sin host: todos los métodos son no-op y devuelven el valor por defecto.
// Solo se devuelve error por mal uso (popup mal formado).
// ============================================================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::channel::oneshot;
use thiserror::Error;

use crate::host::capabilities::CapabilityFlags;
use crate::host::traits::{
    ButtonAction, HandlerId, HostButton, HostCallback, HostEvent, HostHandler, HostRuntime,
    StyleSink,
};
use crate::models::{
    ColorScheme, HapticKind, HomeScreenStatus, Platform, PopupParams, ThemeParams, UserProfile,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    #[error("Popup inválido: {0}")]
    InvalidPopup(String),
}

/// Suscripción a un evento del host, devuelta por `HostBridge::on`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    event: HostEvent,
    id: u64,
}

#[derive(Default)]
struct EventSlot {
    host_id: Option<HandlerId>,
    handlers: Vec<(u64, HostHandler)>,
}

#[derive(Default)]
struct EventRegistry {
    next_id: u64,
    slots: HashMap<HostEvent, EventSlot>,
}

impl EventRegistry {
    fn handlers_for(&self, event: HostEvent) -> Vec<HostHandler> {
        self.slots
            .get(&event)
            .map(|slot| slot.handlers.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    }
}

/// Adapta un callback del host a un futuro con una única resolución
fn once_callback<T: 'static>(what: &'static str) -> (HostCallback<T>, oneshot::Receiver<T>) {
    let (tx, rx) = oneshot::channel();
    let slot = RefCell::new(Some(tx));
    let callback: HostCallback<T> = Box::new(move |value: T| match slot.borrow_mut().take() {
        Some(tx) => {
            let _ = tx.send(value);
        }
        None => log::warn!("⚠️ [HOST] Callback de {} invocado más de una vez, ignorado", what),
    });
    (callback, rx)
}

pub struct HostBridge {
    runtime: Option<Rc<dyn HostRuntime>>,
    capabilities: CapabilityFlags,
    style: Rc<dyn StyleSink>,
    main_handler: RefCell<Option<HandlerId>>,
    back_handler: RefCell<Option<HandlerId>>,
    events: Rc<RefCell<EventRegistry>>,
}

impl HostBridge {
    /// Bridge sobre un host presente
    pub fn with_runtime(runtime: Rc<dyn HostRuntime>, style: Rc<dyn StyleSink>) -> Self {
        Self::new(Some(runtime), style)
    }

    /// Bridge sin host (navegador normal, tests)
    pub fn unavailable(style: Rc<dyn StyleSink>) -> Self {
        Self::new(None, style)
    }

    pub fn new(runtime: Option<Rc<dyn HostRuntime>>, style: Rc<dyn StyleSink>) -> Self {
        let capabilities = CapabilityFlags::detect(runtime.as_deref());
        log::info!(
            "📱 [HOST] Telegram WebApp {} (plataforma: {}, versión: {})",
            if capabilities.available { "disponible" } else { "no disponible" },
            capabilities.platform.as_str(),
            capabilities.version
        );

        Self {
            runtime,
            capabilities,
            style,
            main_handler: RefCell::new(None),
            back_handler: RefCell::new(None),
            events: Rc::new(RefCell::new(EventRegistry::default())),
        }
    }

    fn host(&self) -> Option<&dyn HostRuntime> {
        self.runtime.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.capabilities.available
    }

    pub fn capabilities(&self) -> &CapabilityFlags {
        &self.capabilities
    }

    // ===== INICIALIZACIÓN =====

    /// ready + expand + tema. Idempotente.
    pub fn init(&self) {
        let Some(host) = self.host() else {
            log::warn!("⚠️ [HOST] Telegram WebApp no disponible, se omite init");
            return;
        };
        host.ready();
        host.expand();
        self.apply_theme();
    }

    // ===== DATOS DE USUARIO =====

    /// initData firmado para el backend; vacío sin host. Nunca se loguea.
    pub fn identity_payload(&self) -> String {
        self.host().and_then(|h| h.init_data()).unwrap_or_default()
    }

    /// Perfil orientativo de `initDataUnsafe`: NO autoritativo
    pub fn user_profile(&self) -> Option<UserProfile> {
        self.host()?.init_data_user().map(UserProfile::from)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.host()?.init_data_user().map(|u| u.id)
    }

    pub fn start_param(&self) -> String {
        self.host().and_then(|h| h.start_param()).unwrap_or_default()
    }

    // ===== TEMA Y UI =====

    pub fn color_scheme(&self) -> ColorScheme {
        self.host()
            .and_then(|h| h.color_scheme())
            .map(|s| ColorScheme::parse(&s))
            .unwrap_or_default()
    }

    pub fn theme_params(&self) -> ThemeParams {
        self.host().map(|h| h.theme_params()).unwrap_or_default()
    }

    /// Escribe el tema en las variables CSS. Las claves ausentes se omiten.
    pub fn apply_theme(&self) {
        let Some(host) = self.host() else {
            return;
        };
        let theme = host.theme_params();
        for (name, value) in theme.css_variables() {
            self.style.set_property(name, value);
        }
        if let Some(background) = host.background_color() {
            self.style.set_background(&background);
        }
    }

    pub fn set_header_color(&self, color: &str) {
        if let Some(host) = self.host() {
            host.set_header_color(color);
        }
    }

    pub fn set_background_color(&self, color: &str) {
        if let Some(host) = self.host() {
            host.set_background_color(color);
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.capabilities.platform
    }

    pub fn version(&self) -> &str {
        &self.capabilities.version
    }

    pub fn is_expanded(&self) -> bool {
        self.host().map(|h| h.is_expanded()).unwrap_or(false)
    }

    pub fn viewport_height(&self) -> Option<f64> {
        self.host()?.viewport_height()
    }

    pub fn viewport_stable_height(&self) -> Option<f64> {
        self.host()?.viewport_stable_height()
    }

    // ===== BOTONES =====

    fn button_host(&self, button: HostButton) -> Option<&dyn HostRuntime> {
        self.host().filter(|_| self.capabilities.supports_button(button))
    }

    fn handler_slot(&self, button: HostButton) -> &RefCell<Option<HandlerId>> {
        match button {
            HostButton::Main => &self.main_handler,
            HostButton::Back => &self.back_handler,
        }
    }

    /// Sustituye el handler activo del botón en un solo paso: el anterior se
    /// desregistra antes de registrar el nuevo. Como máximo uno activo.
    fn replace_click_handler(&self, button: HostButton, handler: Option<HostHandler>) {
        let Some(host) = self.button_host(button) else {
            return;
        };
        let mut slot = self.handler_slot(button).borrow_mut();
        if let Some(previous) = slot.take() {
            host.off_button_click(button, previous);
        }
        *slot = handler.map(|h| host.on_button_click(button, h));
    }

    fn button_action(&self, button: HostButton, action: ButtonAction) {
        if let Some(host) = self.button_host(button) {
            host.button(button, action);
        }
    }

    pub fn show_primary_action<F>(&self, label: &str, on_activate: F)
    where
        F: Fn() + 'static,
    {
        if self.button_host(HostButton::Main).is_none() {
            return;
        }
        self.button_action(HostButton::Main, ButtonAction::SetText(label.to_string()));
        self.button_action(HostButton::Main, ButtonAction::Show);
        self.replace_click_handler(HostButton::Main, Some(Rc::new(on_activate)));
    }

    /// Oculta y desregistra el handler (evita closures obsoletas tras navegar)
    pub fn hide_primary_action(&self) {
        self.replace_click_handler(HostButton::Main, None);
        self.button_action(HostButton::Main, ButtonAction::Hide);
    }

    pub fn set_primary_action_text(&self, label: &str) {
        self.button_action(HostButton::Main, ButtonAction::SetText(label.to_string()));
    }

    pub fn enable_primary_action(&self) {
        self.button_action(HostButton::Main, ButtonAction::Enable);
    }

    pub fn disable_primary_action(&self) {
        self.button_action(HostButton::Main, ButtonAction::Disable);
    }

    pub fn show_primary_progress(&self) {
        self.button_action(HostButton::Main, ButtonAction::ShowProgress);
    }

    pub fn hide_primary_progress(&self) {
        self.button_action(HostButton::Main, ButtonAction::HideProgress);
    }

    pub fn show_back_action<F>(&self, on_activate: F)
    where
        F: Fn() + 'static,
    {
        if self.button_host(HostButton::Back).is_none() {
            return;
        }
        self.replace_click_handler(HostButton::Back, Some(Rc::new(on_activate)));
        self.button_action(HostButton::Back, ButtonAction::Show);
    }

    pub fn hide_back_action(&self) {
        self.replace_click_handler(HostButton::Back, None);
        self.button_action(HostButton::Back, ButtonAction::Hide);
    }

    /// Desregistra el handler del botón atrás sin ocultarlo
    pub fn clear_back_handler(&self) {
        self.replace_click_handler(HostButton::Back, None);
    }

    // ===== HAPTIC FEEDBACK =====

    pub fn pulse(&self, kind: HapticKind) {
        if let Some(host) = self.host().filter(|_| self.capabilities.haptics) {
            host.haptic(kind);
        }
    }

    // ===== EVENTOS =====

    /// Suscribe `handler` a `event`. Los handlers se ejecutan en orden de
    /// suscripción: el host solo ve un dispatcher por evento.
    pub fn on<F>(&self, event: HostEvent, handler: F) -> Subscription
    where
        F: Fn() + 'static,
    {
        let mut registry = self.events.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;

        let needs_dispatcher = !registry.slots.contains_key(&event);
        let slot = registry.slots.entry(event).or_default();
        slot.handlers.push((id, Rc::new(handler)));

        if needs_dispatcher {
            if let Some(host) = self.host().filter(|_| self.capabilities.events) {
                let weak = Rc::downgrade(&self.events);
                let dispatcher: HostHandler = Rc::new(move || {
                    let Some(registry) = weak.upgrade() else {
                        return;
                    };
                    // Copia de la lista: un handler puede desuscribirse durante el dispatch
                    let handlers = registry.borrow().handlers_for(event);
                    for handler in handlers {
                        handler();
                    }
                });
                slot.host_id = Some(host.on_event(event, dispatcher));
            }
        }

        Subscription { event, id }
    }

    pub fn off(&self, subscription: Subscription) {
        let mut registry = self.events.borrow_mut();
        let Some(slot) = registry.slots.get_mut(&subscription.event) else {
            return;
        };
        slot.handlers.retain(|(id, _)| *id != subscription.id);

        if slot.handlers.is_empty() {
            if let (Some(host), Some(host_id)) = (self.host(), slot.host_id.take()) {
                host.off_event(subscription.event, host_id);
            }
            registry.slots.remove(&subscription.event);
        }
    }

    // ===== DIÁLOGOS =====
    // Cada diálogo va precedido de una vibración ligera.

    pub async fn alert(&self, message: &str) {
        let Some(host) = self.host().filter(|_| self.capabilities.alert) else {
            return;
        };
        self.pulse(HapticKind::Light);
        let (done, rx) = once_callback::<()>("showAlert");
        host.show_alert(message, done);
        let _ = rx.await;
    }

    pub async fn confirm(&self, message: &str) -> bool {
        let Some(host) = self.host().filter(|_| self.capabilities.confirm) else {
            return false;
        };
        self.pulse(HapticKind::Light);
        let (done, rx) = once_callback::<bool>("showConfirm");
        host.show_confirm(message, done);
        rx.await.unwrap_or(false)
    }

    /// Devuelve el id del botón pulsado (`None` si se cerró sin botón)
    pub async fn popup(&self, params: &PopupParams) -> Result<Option<String>, BridgeError> {
        params.validate().map_err(BridgeError::InvalidPopup)?;

        let Some(host) = self.host().filter(|_| self.capabilities.popup) else {
            return Ok(None);
        };
        self.pulse(HapticKind::Light);
        let (done, rx) = once_callback::<Option<String>>("showPopup");
        host.show_popup(params, done);
        Ok(rx.await.ok().flatten().filter(|id| !id.is_empty()))
    }

    // ===== NAVEGACIÓN =====

    pub fn close(&self) {
        if let Some(host) = self.host() {
            host.close();
        }
    }

    pub fn open_link(&self, url: &str, try_instant_view: bool) {
        if let Some(host) = self.host() {
            host.open_link(url, try_instant_view);
        }
    }

    pub fn open_telegram_link(&self, url: &str) {
        if let Some(host) = self.host() {
            host.open_telegram_link(url);
        }
    }

    // ===== PANTALLA DE INICIO =====

    pub async fn home_screen_status(&self) -> HomeScreenStatus {
        let Some(host) = self.host().filter(|_| self.capabilities.home_screen_status) else {
            return HomeScreenStatus::Unsupported;
        };
        let (done, rx) = once_callback::<String>("checkHomeScreenStatus");
        host.check_home_screen_status(done);
        match rx.await {
            Ok(status) => HomeScreenStatus::parse(&status),
            Err(_) => HomeScreenStatus::Unknown,
        }
    }

    /// Devuelve `true` si se invocó la capacidad del host
    pub fn add_to_home_screen(&self) -> bool {
        match self.host().filter(|_| self.capabilities.add_to_home_screen) {
            Some(host) => {
                host.add_to_home_screen();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::traits::NoopStyle;
    use crate::models::{HostUser, PopupButton};
    use crate::testing::{FakeHost, RecordingStyle};
    use futures::executor::block_on;
    use std::cell::Cell;

    fn bridge_with(host: &Rc<FakeHost>) -> (HostBridge, Rc<RecordingStyle>) {
        let style = Rc::new(RecordingStyle::default());
        (HostBridge::with_runtime(host.clone(), style.clone()), style)
    }

    #[test]
    fn unavailable_bridge_returns_defaults_and_never_fails() {
        let bridge = HostBridge::unavailable(Rc::new(NoopStyle));

        assert!(!bridge.is_available());
        assert_eq!(bridge.identity_payload(), "");
        assert_eq!(bridge.user_profile(), None);
        assert_eq!(bridge.user_id(), None);
        assert_eq!(bridge.color_scheme(), ColorScheme::Dark);
        assert_eq!(bridge.theme_params(), ThemeParams::default());
        assert!(!bridge.is_expanded());
        assert_eq!(bridge.viewport_height(), None);

        bridge.init();
        bridge.apply_theme();
        bridge.show_primary_action("Pagar", || {});
        bridge.enable_primary_action();
        bridge.show_primary_progress();
        bridge.hide_primary_action();
        bridge.show_back_action(|| {});
        bridge.hide_back_action();
        bridge.pulse(HapticKind::Heavy);
        let sub = bridge.on(HostEvent::ThemeChanged, || {});
        bridge.off(sub);
        bridge.close();

        block_on(bridge.alert("hola"));
        assert!(!block_on(bridge.confirm("¿seguro?")));
        assert_eq!(block_on(bridge.popup(&PopupParams::notice("", "hola", "OK"))), Ok(None));
        assert_eq!(block_on(bridge.home_screen_status()), HomeScreenStatus::Unsupported);
        assert!(!bridge.add_to_home_screen());
    }

    #[test]
    fn malformed_popup_is_rejected_even_without_host() {
        let bridge = HostBridge::unavailable(Rc::new(NoopStyle));
        let params = PopupParams {
            title: String::new(),
            message: String::new(),
            buttons: vec![PopupButton::ok("OK")],
        };
        assert!(matches!(
            block_on(bridge.popup(&params)),
            Err(BridgeError::InvalidPopup(_))
        ));
    }

    #[test]
    fn identity_and_advisory_profile_come_from_host() {
        let host = Rc::new(
            FakeHost::new()
                .with_init_data("query_id=AA&hash=ff")
                .with_user(HostUser {
                    id: 99,
                    first_name: "Ivan".into(),
                    last_name: None,
                    username: Some("ivan".into()),
                    is_premium: false,
                    language_code: None,
                }),
        );
        let (bridge, _) = bridge_with(&host);

        assert_eq!(bridge.identity_payload(), "query_id=AA&hash=ff");
        let profile = bridge.user_profile().unwrap();
        assert_eq!(profile.id, 99);
        assert_eq!(profile.language_code, "ru");
        assert_eq!(bridge.user_id(), Some(99));
    }

    #[test]
    fn apply_theme_is_idempotent_and_skips_missing_keys() {
        let host = Rc::new(FakeHost::new().with_theme(ThemeParams {
            bg_color: Some("#101010".into()),
            text_color: Some("#ffffff".into()),
            ..ThemeParams::default()
        }));
        let (bridge, style) = bridge_with(&host);

        bridge.apply_theme();
        let first = style.snapshot();
        bridge.apply_theme();
        assert_eq!(style.snapshot(), first);

        assert_eq!(first.properties.get("--tg-bg-color").map(String::as_str), Some("#101010"));
        assert!(!first.properties.contains_key("--tg-button-color"));
        assert_eq!(first.background.as_deref(), Some("#101010"));
    }

    #[test]
    fn init_signals_ready_and_expands() {
        let host = Rc::new(FakeHost::new());
        let (bridge, _) = bridge_with(&host);
        bridge.init();
        let calls = host.calls();
        assert!(calls.contains(&"ready".to_string()));
        assert!(calls.contains(&"expand".to_string()));
    }

    #[test]
    fn back_handler_is_replaced_not_stacked() {
        let host = Rc::new(FakeHost::new());
        let (bridge, _) = bridge_with(&host);
        let hits = Rc::new(Cell::new((0, 0)));

        let first = hits.clone();
        bridge.show_back_action(move || first.set((first.get().0 + 1, first.get().1)));
        let second = hits.clone();
        bridge.show_back_action(move || second.set((second.get().0, second.get().1 + 1)));

        assert_eq!(host.click_handler_count(HostButton::Back), 1);
        host.click(HostButton::Back);
        assert_eq!(hits.get(), (0, 1));

        bridge.hide_back_action();
        assert_eq!(host.click_handler_count(HostButton::Back), 0);
        host.click(HostButton::Back);
        assert_eq!(hits.get(), (0, 1));
    }

    #[test]
    fn primary_action_sets_label_and_single_handler() {
        let host = Rc::new(FakeHost::new());
        let (bridge, _) = bridge_with(&host);

        bridge.show_primary_action("Enviar", || {});
        bridge.show_primary_action("Pagar", || {});
        assert_eq!(host.click_handler_count(HostButton::Main), 1);
        assert!(host.calls().contains(&"button:Main:SetText(\"Pagar\")".to_string()));

        bridge.hide_primary_action();
        assert_eq!(host.click_handler_count(HostButton::Main), 0);
        assert_eq!(host.calls().last().map(String::as_str), Some("button:Main:Hide"));
    }

    #[test]
    fn missing_button_capability_is_a_no_op() {
        let host = Rc::new(FakeHost::new().without_member("BackButton"));
        let (bridge, _) = bridge_with(&host);
        bridge.show_back_action(|| {});
        assert_eq!(host.click_handler_count(HostButton::Back), 0);
        assert!(host.calls().iter().all(|c| !c.starts_with("button:Back")));
    }

    #[test]
    fn event_handlers_fire_in_subscription_order() {
        let host = Rc::new(FakeHost::new());
        let (bridge, _) = bridge_with(&host);
        let order = Rc::new(RefCell::new(Vec::new()));

        let a = order.clone();
        let sub_a = bridge.on(HostEvent::ThemeChanged, move || a.borrow_mut().push("a"));
        let b = order.clone();
        let sub_b = bridge.on(HostEvent::ThemeChanged, move || b.borrow_mut().push("b"));
        assert_eq!(host.event_handler_count(HostEvent::ThemeChanged), 1);

        host.emit(HostEvent::ThemeChanged);
        assert_eq!(*order.borrow(), vec!["a", "b"]);

        bridge.off(sub_a);
        host.emit(HostEvent::ThemeChanged);
        assert_eq!(*order.borrow(), vec!["a", "b", "b"]);

        bridge.off(sub_b);
        assert_eq!(host.event_handler_count(HostEvent::ThemeChanged), 0);
    }

    #[test]
    fn handler_can_unsubscribe_itself_during_dispatch() {
        let host = Rc::new(FakeHost::new());
        let (bridge, _) = bridge_with(&host);
        let bridge = Rc::new(bridge);
        let order = Rc::new(RefCell::new(Vec::new()));

        let own: Rc<Cell<Option<Subscription>>> = Rc::new(Cell::new(None));
        let (weak, slot, a) = (Rc::downgrade(&bridge), own.clone(), order.clone());
        let once = bridge.on(HostEvent::ViewportChanged, move || {
            a.borrow_mut().push("once");
            if let (Some(bridge), Some(sub)) = (weak.upgrade(), slot.take()) {
                bridge.off(sub);
            }
        });
        own.set(Some(once));
        let b = order.clone();
        bridge.on(HostEvent::ViewportChanged, move || b.borrow_mut().push("b"));

        host.emit(HostEvent::ViewportChanged);
        host.emit(HostEvent::ViewportChanged);

        assert_eq!(*order.borrow(), vec!["once", "b", "b"]);
        assert_eq!(host.event_handler_count(HostEvent::ViewportChanged), 1);
    }

    #[test]
    fn last_handler_unsubscribing_itself_releases_host_dispatcher() {
        let host = Rc::new(FakeHost::new());
        let (bridge, _) = bridge_with(&host);
        let bridge = Rc::new(bridge);

        let own: Rc<Cell<Option<Subscription>>> = Rc::new(Cell::new(None));
        let (weak, slot) = (Rc::downgrade(&bridge), own.clone());
        let sub = bridge.on(HostEvent::ThemeChanged, move || {
            if let (Some(bridge), Some(sub)) = (weak.upgrade(), slot.take()) {
                bridge.off(sub);
            }
        });
        own.set(Some(sub));

        host.emit(HostEvent::ThemeChanged);
        assert_eq!(host.event_handler_count(HostEvent::ThemeChanged), 0);
    }

    #[test]
    fn throwing_host_dialogs_still_resolve() {
        let host = Rc::new(
            FakeHost::new()
                .with_confirm_answer(true)
                .with_popup_answer(Some("yes"))
                .with_failing_member("showAlert")
                .with_failing_member("showConfirm")
                .with_failing_member("showPopup")
                .with_failing_member("checkHomeScreenStatus"),
        );
        let (bridge, _) = bridge_with(&host);

        block_on(bridge.alert("Hola"));
        assert!(!block_on(bridge.confirm("¿Continuar?")));
        let pressed = block_on(bridge.popup(&PopupParams::notice("T", "¿Sí?", "OK"))).unwrap();
        assert_eq!(pressed, None);
        assert_eq!(block_on(bridge.home_screen_status()), HomeScreenStatus::Unknown);
    }

    #[test]
    fn dialogs_pulse_first_and_resolve_once() {
        let host = Rc::new(FakeHost::new().with_confirm_answer(true).with_double_callbacks());
        let (bridge, _) = bridge_with(&host);

        assert!(block_on(bridge.confirm("¿Continuar?")));
        let calls = host.calls();
        let haptic = calls.iter().position(|c| c == "haptic:light").unwrap();
        let confirm = calls.iter().position(|c| c == "confirm:¿Continuar?").unwrap();
        assert!(haptic < confirm);
    }

    #[test]
    fn popup_returns_pressed_button() {
        let host = Rc::new(FakeHost::new().with_popup_answer(Some("yes")));
        let (bridge, _) = bridge_with(&host);
        let pressed = block_on(bridge.popup(&PopupParams::notice("T", "¿Sí?", "OK"))).unwrap();
        assert_eq!(pressed.as_deref(), Some("yes"));
    }

    #[test]
    fn dropped_host_callback_resolves_with_default() {
        let host = Rc::new(FakeHost::new().with_dropped_callbacks());
        let (bridge, _) = bridge_with(&host);
        assert!(!block_on(bridge.confirm("¿Continuar?")));
        assert_eq!(block_on(bridge.home_screen_status()), HomeScreenStatus::Unknown);
    }
}
