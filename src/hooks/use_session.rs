// ============================================================================
// USE SESSION HOOK - Session reactiva para componentes Yew
// ============================================================================

use yew::prelude::*;

use crate::models::Session;
use crate::state::ReactiveState;

/// Re-renderiza el componente en cada cambio de la sesión
#[hook]
pub fn use_session(store: ReactiveState<Session>) -> UseStateHandle<Session> {
    let state = use_state(|| store.snapshot());

    {
        let state = state.clone();
        use_effect_with((), move |_| {
            let id = store.subscribe(move |session| state.set(session.clone()));
            move || store.unsubscribe(id)
        });
    }

    state
}
