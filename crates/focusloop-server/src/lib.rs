//! HTTP backend for Focusloop.
//!
//! Serves the session log and derived statistics under `/api`. Handlers live
//! in [`rest`]; this module wires them to shared state and middleware.

use std::sync::{Arc, Mutex};

use axum::http::Method;
use axum::Router;
use focusloop_core::error::{CoreError, DatabaseError, Result};
use focusloop_core::{Clock, SessionStore, TimerSettings};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod rest;

pub type SharedStore = Arc<Mutex<dyn SessionStore + Send>>;

/// State shared by every handler.
#[derive(Clone)]
pub struct ServerState {
    store: SharedStore,
    clock: Arc<dyn Clock>,
    daily_goal: u32,
}

impl ServerState {
    pub fn new<S: SessionStore + Send + 'static>(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            clock,
            daily_goal: TimerSettings::default().daily_goal,
        }
    }

    /// Goal used by the insights route when the request doesn't name one.
    pub fn with_daily_goal(mut self, daily_goal: u32) -> Self {
        self.daily_goal = daily_goal;
        self
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn daily_goal(&self) -> u32 {
        self.daily_goal
    }

    /// Run `f` with exclusive access to the store.
    ///
    /// # Errors
    /// Whatever `f` returns, or `DatabaseError::Unavailable` if a previous
    /// holder panicked.
    pub fn with_store<T>(&self, f: impl FnOnce(&mut (dyn SessionStore + Send)) -> Result<T>) -> Result<T> {
        let mut guard = self.store.lock().map_err(|_| {
            CoreError::Database(DatabaseError::Unavailable("session store lock poisoned".into()))
        })?;
        f(&mut *guard)
    }
}

/// The full application: `/api` routes, CORS and request tracing.
pub fn app(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .nest("/api", rest::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
