// ============================================================================
// AFFORDANCES - Botones, haptics, diálogos y tema para la capa de vistas
// ============================================================================
// Envoltorios finos sobre HostBridge. Sin host todo es no-op.
// ============================================================================

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::host::{BridgeError, HostBridge, HostEvent, Subscription};
use crate::models::{ColorScheme, HapticKind, PopupParams, ThemeParams};
use crate::state::ReactiveState;

/// Tema y viewport del host como estado reactivo
pub struct HostViewModel {
    bridge: Rc<HostBridge>,
    pub color_scheme: ReactiveState<ColorScheme>,
    pub theme_params: ReactiveState<ThemeParams>,
    pub viewport_height: ReactiveState<Option<f64>>,
    pub is_expanded: ReactiveState<bool>,
    subscriptions: RefCell<Vec<Subscription>>,
}

impl HostViewModel {
    pub fn new(bridge: Rc<HostBridge>) -> Self {
        Self {
            color_scheme: ReactiveState::new(bridge.color_scheme()),
            theme_params: ReactiveState::new(bridge.theme_params()),
            viewport_height: ReactiveState::new(bridge.viewport_height()),
            is_expanded: ReactiveState::new(bridge.is_expanded()),
            subscriptions: RefCell::new(Vec::new()),
            bridge,
        }
    }

    pub fn is_mounted(&self) -> bool {
        !self.subscriptions.borrow().is_empty()
    }

    /// Escucha themeChanged/viewportChanged. Idempotente.
    pub fn mount(&self) {
        if self.is_mounted() || !self.bridge.is_available() {
            return;
        }

        let weak: Weak<HostBridge> = Rc::downgrade(&self.bridge);
        let scheme = self.color_scheme.clone();
        let theme = self.theme_params.clone();
        let on_theme = self.bridge.on(HostEvent::ThemeChanged, move || {
            let Some(bridge) = weak.upgrade() else {
                return;
            };
            log::debug!("🎨 [HOST] themeChanged");
            scheme.set(bridge.color_scheme());
            theme.set(bridge.theme_params());
            bridge.apply_theme();
        });

        let weak: Weak<HostBridge> = Rc::downgrade(&self.bridge);
        let height = self.viewport_height.clone();
        let expanded = self.is_expanded.clone();
        let on_viewport = self.bridge.on(HostEvent::ViewportChanged, move || {
            let Some(bridge) = weak.upgrade() else {
                return;
            };
            height.set(bridge.viewport_height());
            expanded.set(bridge.is_expanded());
        });

        self.subscriptions.borrow_mut().extend([on_theme, on_viewport]);
    }

    pub fn unmount(&self) {
        for subscription in self.subscriptions.borrow_mut().drain(..) {
            self.bridge.off(subscription);
        }
    }

    pub async fn alert(&self, message: &str) {
        self.bridge.alert(message).await;
    }

    pub async fn confirm(&self, message: &str) -> bool {
        self.bridge.confirm(message).await
    }

    pub async fn popup(&self, params: &PopupParams) -> Result<Option<String>, BridgeError> {
        self.bridge.popup(params).await
    }

    pub fn open_link(&self, url: &str) {
        self.bridge.pulse(HapticKind::Light);
        self.bridge.open_link(url, false);
    }

    pub fn close(&self) {
        self.bridge.close();
    }
}

impl Drop for HostViewModel {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Botón principal. Un solo handler activo: `show` reemplaza el anterior.
#[derive(Clone)]
pub struct MainButtonProxy {
    bridge: Rc<HostBridge>,
}

impl MainButtonProxy {
    pub fn new(bridge: Rc<HostBridge>) -> Self {
        Self { bridge }
    }

    pub fn show<F>(&self, text: &str, on_click: F)
    where
        F: Fn() + 'static,
    {
        self.bridge.show_primary_action(text, on_click);
    }

    pub fn hide(&self) {
        self.bridge.hide_primary_action();
    }

    pub fn set_text(&self, text: &str) {
        self.bridge.set_primary_action_text(text);
    }

    pub fn enable(&self) {
        self.bridge.enable_primary_action();
    }

    pub fn disable(&self) {
        self.bridge.disable_primary_action();
    }

    pub fn show_progress(&self) {
        self.bridge.show_primary_progress();
    }

    pub fn hide_progress(&self) {
        self.bridge.hide_primary_progress();
    }
}

#[derive(Clone)]
pub struct BackButtonProxy {
    bridge: Rc<HostBridge>,
}

impl BackButtonProxy {
    pub fn new(bridge: Rc<HostBridge>) -> Self {
        Self { bridge }
    }

    pub fn show<F>(&self, on_click: F)
    where
        F: Fn() + 'static,
    {
        self.bridge.show_back_action(on_click);
    }

    pub fn hide(&self) {
        self.bridge.hide_back_action();
    }
}

#[derive(Clone)]
pub struct HapticsProxy {
    bridge: Rc<HostBridge>,
}

impl HapticsProxy {
    pub fn new(bridge: Rc<HostBridge>) -> Self {
        Self { bridge }
    }

    pub fn impact(&self, kind: HapticKind) {
        self.bridge.pulse(kind);
    }

    pub fn light(&self) {
        self.bridge.pulse(HapticKind::Light);
    }

    pub fn selection(&self) {
        self.bridge.pulse(HapticKind::Selection);
    }

    pub fn success(&self) {
        self.bridge.pulse(HapticKind::Success);
    }

    pub fn error(&self) {
        self.bridge.pulse(HapticKind::Error);
    }

    pub fn warning(&self) {
        self.bridge.pulse(HapticKind::Warning);
    }
}
