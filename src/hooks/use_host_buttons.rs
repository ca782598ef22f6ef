// ============================================================================
// USE HOST BUTTONS - Botón principal y botón atrás ligados al componente
// ============================================================================
// Al desmontar se ocultan y se desregistra el handler: ninguna closure de
// una vista anterior sobrevive a la navegación.
// ============================================================================

use std::rc::Rc;

use yew::prelude::*;

use crate::host::HostBridge;

#[hook]
pub fn use_back_button(bridge: Rc<HostBridge>, on_back: Callback<()>) {
    use_effect_with(on_back, move |on_back| {
        let on_back = on_back.clone();
        bridge.show_back_action(move || on_back.emit(()));
        move || bridge.hide_back_action()
    });
}

#[hook]
pub fn use_main_button(bridge: Rc<HostBridge>, text: String, on_click: Callback<()>) {
    use_effect_with((text, on_click), move |(text, on_click)| {
        let on_click = on_click.clone();
        bridge.show_primary_action(text, move || on_click.emit(()));
        move || bridge.hide_primary_action()
    });
}
