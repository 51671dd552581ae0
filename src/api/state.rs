//! Application state for the tariff engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::{ConfigLoader, TariffIndex};

/// Shared application state.
///
/// Holds the tariff index, built once at startup and shared read-only by
/// every request.
#[derive(Clone)]
pub struct AppState {
    index: Arc<TariffIndex>,
}

impl AppState {
    /// Creates application state around an index.
    pub fn new(index: TariffIndex) -> Self {
        Self {
            index: Arc::new(index),
        }
    }

    /// Creates application state from a loaded dataset.
    pub fn from_loader(loader: ConfigLoader) -> Self {
        Self::new(loader.into_index())
    }

    /// Returns the tariff index.
    pub fn index(&self) -> &TariffIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone_and_shareable() {
        fn assert_clone_send_sync<T: Clone + Send + Sync>() {}
        assert_clone_send_sync::<AppState>();
    }

    #[test]
    fn test_clones_share_one_index() {
        let state = AppState::new(TariffIndex::default());
        let clone = state.clone();
        assert!(std::ptr::eq(state.index(), clone.index()));
    }
}
