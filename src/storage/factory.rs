//! Storage factory
//!
//! Hands out one cached adapter for the whole application. Reconfiguring
//! captures the current adapter, installs the replacement, and only then
//! disposes the captured one, so no caller can observe a disposed adapter as
//! the current backend.
//!
//! A backend that cannot be opened is fatal: the failure is remembered and
//! every later `adapter()` call returns the same `StorageUnavailable` until a
//! reconfiguration succeeds.
//!
//! After a rolled-back migration the legacy store is served as a fallback in
//! front of the configured backend. The configured backend stays open behind
//! it and is what `primary()` returns, so a retried migration still writes
//! there. Clearing the fallback makes it current again.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::{BackendKind, TouchlinePaths};
use crate::error::{TouchlineError, TouchlineResult};

use super::adapter::StorageAdapter;
use super::file::FileAdapter;
use super::memory::MemoryAdapter;

#[derive(Default)]
struct FactoryState {
    current: Option<Arc<dyn StorageAdapter>>,
    fallback: Option<Arc<dyn StorageAdapter>>,
    unavailable: Option<(&'static str, String)>,
}

pub struct StorageFactory {
    paths: TouchlinePaths,
    backend: Mutex<BackendKind>,
    state: Mutex<FactoryState>,
}

impl StorageFactory {
    pub fn new(paths: TouchlinePaths, backend: BackendKind) -> Self {
        Self {
            paths,
            backend: Mutex::new(backend),
            state: Mutex::new(FactoryState::default()),
        }
    }

    /// Factory preloaded with an already-built adapter (plugins and tests)
    pub fn with_adapter(paths: TouchlinePaths, adapter: Arc<dyn StorageAdapter>) -> Self {
        Self {
            paths,
            backend: Mutex::new(BackendKind::default()),
            state: Mutex::new(FactoryState {
                current: Some(adapter),
                fallback: None,
                unavailable: None,
            }),
        }
    }

    pub fn paths(&self) -> &TouchlinePaths {
        &self.paths
    }

    /// The adapter services should use: the fallback if one is installed,
    /// otherwise the configured backend
    pub async fn adapter(&self) -> TouchlineResult<Arc<dyn StorageAdapter>> {
        {
            let state = self.state.lock().await;
            if let Some(fallback) = &state.fallback {
                return Ok(Arc::clone(fallback));
            }
        }
        self.primary().await
    }

    /// The configured backend, opening it on first use
    pub async fn primary(&self) -> TouchlineResult<Arc<dyn StorageAdapter>> {
        let mut state = self.state.lock().await;

        if let Some((backend, reason)) = &state.unavailable {
            return Err(TouchlineError::StorageUnavailable {
                backend: *backend,
                reason: reason.clone(),
            });
        }

        if let Some(adapter) = &state.current {
            return Ok(Arc::clone(adapter));
        }

        let kind = *self.backend.lock().await;
        match self.open(kind) {
            Ok(adapter) => {
                tracing::info!(backend = adapter.backend_name(), "storage backend ready");
                state.current = Some(Arc::clone(&adapter));
                Ok(adapter)
            }
            Err(err) => Err(Self::mark_unavailable(&mut state, err)),
        }
    }

    /// Switch to a different backend kind
    pub async fn reconfigure(&self, kind: BackendKind) -> TouchlineResult<()> {
        let opened = self.open(kind);
        match opened {
            Ok(adapter) => {
                *self.backend.lock().await = kind;
                self.install(adapter).await
            }
            Err(err) => {
                let mut state = self.state.lock().await;
                Err(Self::mark_unavailable(&mut state, err))
            }
        }
    }

    /// Replace the current adapter with `adapter` and dispose the old one
    pub async fn install(&self, adapter: Arc<dyn StorageAdapter>) -> TouchlineResult<()> {
        let previous = {
            let mut state = self.state.lock().await;
            let previous = state.current.take();
            state.current = Some(adapter);
            state.unavailable = None;
            previous
        };

        if let Some(previous) = previous {
            tracing::debug!(backend = previous.backend_name(), "disposing replaced adapter");
            previous.dispose().await?;
        }
        Ok(())
    }

    /// Serve `adapter` in front of the configured backend without disposing it
    pub async fn use_fallback(&self, adapter: Arc<dyn StorageAdapter>) {
        let mut state = self.state.lock().await;
        tracing::warn!(backend = adapter.backend_name(), "serving data from fallback store");
        state.fallback = Some(adapter);
    }

    /// Drop the fallback, if any. The fallback itself is left open.
    pub async fn clear_fallback(&self) {
        let mut state = self.state.lock().await;
        if let Some(fallback) = state.fallback.take() {
            tracing::info!(backend = fallback.backend_name(), "fallback store released");
        }
    }

    pub async fn has_fallback(&self) -> bool {
        self.state.lock().await.fallback.is_some()
    }

    pub async fn backend_name(&self) -> TouchlineResult<&'static str> {
        Ok(self.adapter().await?.backend_name())
    }

    fn open(&self, kind: BackendKind) -> TouchlineResult<Arc<dyn StorageAdapter>> {
        match kind {
            BackendKind::File => Ok(Arc::new(FileAdapter::open(self.paths.data_dir())?)),
            BackendKind::Memory => Ok(Arc::new(MemoryAdapter::new())),
        }
    }

    fn mark_unavailable(state: &mut FactoryState, err: TouchlineError) -> TouchlineError {
        match err {
            TouchlineError::StorageUnavailable { backend, reason } => {
                tracing::error!(backend, reason = %reason, "storage backend unavailable");
                state.unavailable = Some((backend, reason.clone()));
                TouchlineError::StorageUnavailable { backend, reason }
            }
            other => other,
        }
    }
}
