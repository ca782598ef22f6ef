// ============================================================================
// TESTING - Fakes del host, transporte HTTP y estilos
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::host::traits::{
    settle_on_failure, ButtonAction, HandlerId, HostButton, HostCallback, HostEvent, HostHandler,
    HostRuntime, StyleSink,
};
use crate::models::{HapticKind, HostUser, PopupParams, ThemeParams};
use crate::services::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

const ALL_MEMBERS: &[&str] = &[
    "MainButton",
    "BackButton",
    "HapticFeedback",
    "showAlert",
    "showConfirm",
    "showPopup",
    "onEvent",
    "checkHomeScreenStatus",
    "addToHomeScreen",
];

/// Host en memoria que registra cada llamada en `calls()`
pub struct FakeHost {
    members: HashSet<String>,
    init_data: Option<String>,
    user: Option<HostUser>,
    platform: String,
    theme: RefCell<ThemeParams>,
    color_scheme: RefCell<String>,
    viewport_height: Cell<f64>,
    home_status: String,
    confirm_answer: bool,
    popup_answer: Option<String>,
    double_callbacks: bool,
    dropped_callbacks: bool,
    failing: HashSet<String>,
    next_id: Cell<u64>,
    clicks: RefCell<HashMap<HostButton, Vec<(HandlerId, HostHandler)>>>,
    events: RefCell<HashMap<HostEvent, Vec<(HandlerId, HostHandler)>>>,
    calls: RefCell<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            members: ALL_MEMBERS.iter().map(|m| m.to_string()).collect(),
            init_data: None,
            user: None,
            platform: "tdesktop".to_string(),
            theme: RefCell::new(ThemeParams::default()),
            color_scheme: RefCell::new("dark".to_string()),
            viewport_height: Cell::new(640.0),
            home_status: "missed".to_string(),
            confirm_answer: false,
            popup_answer: None,
            double_callbacks: false,
            dropped_callbacks: false,
            failing: HashSet::new(),
            next_id: Cell::new(0),
            clicks: RefCell::new(HashMap::new()),
            events: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_init_data(mut self, init_data: &str) -> Self {
        self.init_data = Some(init_data.to_string());
        self
    }

    pub fn with_user(mut self, user: HostUser) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_platform(mut self, platform: &str) -> Self {
        self.platform = platform.to_string();
        self
    }

    pub fn with_theme(self, theme: ThemeParams) -> Self {
        *self.theme.borrow_mut() = theme;
        self
    }

    pub fn with_home_status(mut self, status: &str) -> Self {
        self.home_status = status.to_string();
        self
    }

    pub fn with_confirm_answer(mut self, answer: bool) -> Self {
        self.confirm_answer = answer;
        self
    }

    pub fn with_popup_answer(mut self, answer: Option<&str>) -> Self {
        self.popup_answer = answer.map(str::to_string);
        self
    }

    /// El host llama dos veces a cada callback
    pub fn with_double_callbacks(mut self) -> Self {
        self.double_callbacks = true;
        self
    }

    /// El host descarta los callbacks sin llamarlos
    pub fn with_dropped_callbacks(mut self) -> Self {
        self.dropped_callbacks = true;
        self
    }

    /// El miembro existe pero lanza al llamarlo
    pub fn with_failing_member(mut self, member: &str) -> Self {
        self.failing.insert(member.to_string());
        self
    }

    pub fn without_member(mut self, member: &str) -> Self {
        self.members.remove(member);
        self
    }

    pub fn set_theme(&self, theme: ThemeParams, scheme: &str) {
        *self.theme.borrow_mut() = theme;
        *self.color_scheme.borrow_mut() = scheme.to_string();
    }

    pub fn set_viewport_height(&self, height: f64) {
        self.viewport_height.set(height);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn click_handler_count(&self, button: HostButton) -> usize {
        self.clicks.borrow().get(&button).map(Vec::len).unwrap_or(0)
    }

    pub fn event_handler_count(&self, event: HostEvent) -> usize {
        self.events.borrow().get(&event).map(Vec::len).unwrap_or(0)
    }

    /// Simula el click del usuario en el botón
    pub fn click(&self, button: HostButton) {
        let handlers: Vec<HostHandler> = self
            .clicks
            .borrow()
            .get(&button)
            .map(|hs| hs.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();
        for handler in handlers {
            handler();
        }
    }

    /// Simula un evento empujado por el host
    pub fn emit(&self, event: HostEvent) {
        let handlers: Vec<HostHandler> = self
            .events
            .borrow()
            .get(&event)
            .map(|hs| hs.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();
        for handler in handlers {
            handler();
        }
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn next_handler_id(&self) -> HandlerId {
        self.next_id.set(self.next_id.get() + 1);
        HandlerId(self.next_id.get())
    }

    // Igual que el runtime real: si el miembro lanza, `done` recibe `fallback`
    fn respond_or_fail<T: Clone + 'static>(
        &self,
        member: &str,
        done: HostCallback<T>,
        value: T,
        fallback: T,
    ) {
        settle_on_failure(done, fallback, |done| {
            if self.failing.contains(member) {
                return false;
            }
            self.respond(done, value);
            true
        });
    }

    fn respond<T: Clone>(&self, done: HostCallback<T>, value: T) {
        if self.dropped_callbacks {
            return;
        }
        done(value.clone());
        if self.double_callbacks {
            done(value);
        }
    }
}

impl HostRuntime for FakeHost {
    fn has_member(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    fn init_data(&self) -> Option<String> {
        self.init_data.clone()
    }

    fn init_data_user(&self) -> Option<HostUser> {
        self.user.clone()
    }

    fn start_param(&self) -> Option<String> {
        None
    }

    fn color_scheme(&self) -> Option<String> {
        Some(self.color_scheme.borrow().clone())
    }

    fn theme_params(&self) -> ThemeParams {
        self.theme.borrow().clone()
    }

    fn background_color(&self) -> Option<String> {
        self.theme.borrow().bg_color.clone()
    }

    fn platform(&self) -> Option<String> {
        Some(self.platform.clone())
    }

    fn version(&self) -> Option<String> {
        Some("8.0".to_string())
    }

    fn is_expanded(&self) -> bool {
        self.calls.borrow().iter().any(|c| c == "expand")
    }

    fn viewport_height(&self) -> Option<f64> {
        Some(self.viewport_height.get())
    }

    fn viewport_stable_height(&self) -> Option<f64> {
        Some(self.viewport_height.get())
    }

    fn ready(&self) {
        self.record("ready".to_string());
    }

    fn expand(&self) {
        self.record("expand".to_string());
    }

    fn close(&self) {
        self.record("close".to_string());
    }

    fn set_header_color(&self, color: &str) {
        self.record(format!("header:{}", color));
    }

    fn set_background_color(&self, color: &str) {
        self.record(format!("background:{}", color));
    }

    fn open_link(&self, url: &str, _try_instant_view: bool) {
        self.record(format!("open_link:{}", url));
    }

    fn open_telegram_link(&self, url: &str) {
        self.record(format!("open_telegram_link:{}", url));
    }

    fn button(&self, button: HostButton, action: ButtonAction) {
        self.record(format!("button:{:?}:{:?}", button, action));
    }

    fn on_button_click(&self, button: HostButton, handler: HostHandler) -> HandlerId {
        let id = self.next_handler_id();
        self.clicks.borrow_mut().entry(button).or_default().push((id, handler));
        id
    }

    fn off_button_click(&self, button: HostButton, id: HandlerId) {
        if let Some(handlers) = self.clicks.borrow_mut().get_mut(&button) {
            handlers.retain(|(h, _)| *h != id);
        }
    }

    fn haptic(&self, kind: HapticKind) {
        self.record(format!("haptic:{}", kind.as_str()));
    }

    fn on_event(&self, event: HostEvent, handler: HostHandler) -> HandlerId {
        let id = self.next_handler_id();
        self.events.borrow_mut().entry(event).or_default().push((id, handler));
        id
    }

    fn off_event(&self, event: HostEvent, id: HandlerId) {
        if let Some(handlers) = self.events.borrow_mut().get_mut(&event) {
            handlers.retain(|(h, _)| *h != id);
        }
    }

    fn show_alert(&self, message: &str, done: HostCallback<()>) {
        self.record(format!("alert:{}", message));
        self.respond_or_fail("showAlert", done, (), ());
    }

    fn show_confirm(&self, message: &str, done: HostCallback<bool>) {
        self.record(format!("confirm:{}", message));
        self.respond_or_fail("showConfirm", done, self.confirm_answer, false);
    }

    fn show_popup(&self, params: &PopupParams, done: HostCallback<Option<String>>) {
        self.record(format!("popup:{}", params.message));
        self.respond_or_fail("showPopup", done, self.popup_answer.clone(), None);
    }

    fn check_home_screen_status(&self, done: HostCallback<String>) {
        self.record("check_home_screen_status".to_string());
        self.respond_or_fail("checkHomeScreenStatus", done, self.home_status.clone(), "unknown".to_string());
    }

    fn add_to_home_screen(&self) {
        self.record("add_to_home_screen".to_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleState {
    pub properties: BTreeMap<String, String>,
    pub background: Option<String>,
}

/// StyleSink que guarda el estado final en memoria
#[derive(Default)]
pub struct RecordingStyle {
    state: RefCell<StyleState>,
}

impl RecordingStyle {
    pub fn snapshot(&self) -> StyleState {
        self.state.borrow().clone()
    }
}

impl StyleSink for RecordingStyle {
    fn set_property(&self, name: &str, value: &str) {
        self.state
            .borrow_mut()
            .properties
            .insert(name.to_string(), value.to_string());
    }

    fn set_background(&self, color: &str) {
        self.state.borrow_mut().background = Some(color.to_string());
    }
}

/// Futuro que cede el control una vez antes de completar
pub struct YieldOnce(bool);

impl YieldOnce {
    pub fn new() -> Self {
        YieldOnce(false)
    }
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Transporte HTTP con respuestas encoladas por ruta
#[derive(Clone, Default)]
pub struct FakeTransport {
    routes: Rc<RefCell<HashMap<String, VecDeque<Result<HttpResponse, TransportError>>>>>,
    requests: Rc<RefCell<Vec<HttpRequest>>>,
    yield_first: Rc<Cell<bool>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cada petición cede el control una vez antes de responder
    pub fn yielding(self) -> Self {
        self.yield_first.set(true);
        self
    }

    fn push(&self, path: &str, response: Result<HttpResponse, TransportError>) {
        self.routes
            .borrow_mut()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn respond_json(&self, path: &str, status: u16, body: serde_json::Value) {
        self.push(
            path,
            Ok(HttpResponse {
                status,
                status_text: String::new(),
                content_type: Some("application/json".to_string()),
                body: body.to_string(),
                url: String::new(),
                method: HttpMethod::Get,
            }),
        );
    }

    pub fn respond_html(&self, path: &str, status: u16, body: &str) {
        self.push(
            path,
            Ok(HttpResponse {
                status,
                status_text: "Bad Gateway".to_string(),
                content_type: Some("text/html; charset=utf-8".to_string()),
                body: body.to_string(),
                url: String::new(),
                method: HttpMethod::Get,
            }),
        );
    }

    pub fn fail_network(&self, path: &str, message: &str) {
        self.push(path, Err(TransportError(message.to_string())));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn requests_to(&self, path: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.url.ends_with(path))
            .count()
    }
}

impl HttpTransport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        if self.yield_first.get() {
            YieldOnce::new().await;
        }

        let path = self
            .routes
            .borrow()
            .keys()
            .find(|path| request.url.ends_with(path.as_str()))
            .cloned();
        let queued = path.and_then(|p| self.routes.borrow_mut().get_mut(&p)?.pop_front());

        match queued {
            Some(Ok(mut response)) => {
                response.url = request.url.clone();
                response.method = request.method;
                Ok(response)
            }
            Some(Err(error)) => Err(error),
            None => Err(TransportError(format!("sin respuesta para {}", request.url))),
        }
    }
}
