// ============================================================================
// STORAGE - Persistencia del bearer token
// ============================================================================
// Una sola clave, un solo valor. Solo RemoteAuthClient escribe o borra.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("localStorage no disponible")]
    Unavailable,

    #[error("Error escribiendo '{key}' en localStorage")]
    Write { key: String },

    #[error("Error eliminando '{key}' de localStorage")]
    Remove { key: String },
}

/// Almacenamiento duradero del token de sesión
pub trait TokenStore {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

impl<S: TokenStore + ?Sized> TokenStore for Box<S> {
    fn load(&self) -> Option<String> {
        (**self).load()
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        (**self).save(token)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

/// Token en memoria. Fallback cuando localStorage no existe (y en tests).
/// Los clones comparten el mismo valor.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    token: Rc<RefCell<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Rc::new(RefCell::new(Some(token.to_string()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        *self.token.borrow_mut() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.token.borrow_mut().take();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalTokenStore;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{StorageError, TokenStore};
    use web_sys::{window, Storage};

    fn get_local_storage() -> Option<Storage> {
        window()?.local_storage().ok()?
    }

    /// Token en localStorage, guardado como string plano (sin JSON)
    #[derive(Debug, Clone)]
    pub struct LocalTokenStore {
        key: String,
    }

    impl LocalTokenStore {
        pub fn new(key: &str) -> Self {
            Self { key: key.to_string() }
        }

        pub fn is_available() -> bool {
            get_local_storage().is_some()
        }
    }

    impl TokenStore for LocalTokenStore {
        fn load(&self) -> Option<String> {
            let storage = get_local_storage()?;
            storage
                .get_item(&self.key)
                .ok()
                .flatten()
                .filter(|token| !token.is_empty())
        }

        fn save(&self, token: &str) -> Result<(), StorageError> {
            let storage = get_local_storage().ok_or(StorageError::Unavailable)?;
            storage
                .set_item(&self.key, token)
                .map_err(|_| StorageError::Write { key: self.key.clone() })
        }

        fn clear(&self) -> Result<(), StorageError> {
            let storage = get_local_storage().ok_or(StorageError::Unavailable)?;
            storage
                .remove_item(&self.key)
                .map_err(|_| StorageError::Remove { key: self.key.clone() })
        }
    }
}
