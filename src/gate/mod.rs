//! Lazy visibility gate: defers a section's fetch until it is about to be seen

mod observer;

pub(crate) use observer::{ObserverState, ViewportObserver, VisibilityObserver};

use std::fmt::Display;
use std::future::Future;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::Result;

/// Gate lifecycle: `Hidden -> Triggered -> Loading -> Loaded | Error`
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GateState<T> {
    Hidden,
    Triggered,
    Loading,
    Loaded(T),
    Error(String),
}

/// Identifies one load; results carrying an older ticket are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LoadTicket(u64);

pub(crate) struct LazyGate<O, T> {
    observer: O,
    margin: u32,
    state: GateState<T>,
    mounted: bool,
    generation: u64,
    fetches: usize,
}

impl<O: VisibilityObserver, T> LazyGate<O, T> {
    pub(crate) fn new(observer: O, margin: u32) -> Self {
        Self {
            observer,
            margin,
            state: GateState::Hidden,
            mounted: false,
            generation: 0,
            fetches: 0,
        }
    }

    /// Start observing; returns true when the host is already in range
    pub(crate) fn mount(&mut self, scroll_top: u32) -> bool {
        self.state = GateState::Hidden;
        self.mounted = true;
        self.fetches = 0;
        self.observer.observe(self.margin);
        self.on_scroll(scroll_top)
    }

    /// Proximity event; only the first one of a mount triggers
    pub(crate) fn on_scroll(&mut self, scroll_top: u32) -> bool {
        if !self.mounted || !matches!(self.state, GateState::Hidden) {
            return false;
        }
        if !self.observer.on_scroll(scroll_top) {
            return false;
        }
        self.observer.disconnect();
        self.state = GateState::Triggered;
        debug!(scroll_top, "gate triggered");
        true
    }

    /// `Triggered -> Loading`; `None` when the gate has nothing to start
    pub(crate) fn begin_load(&mut self) -> Option<LoadTicket> {
        if !self.mounted || !matches!(self.state, GateState::Triggered) {
            return None;
        }
        Some(self.start_load())
    }

    /// Fetch parameters changed: reload a gate that already loaded (or is
    /// loading) without observing again. Hidden gates pick up the new
    /// parameters when they trigger.
    pub(crate) fn params_changed(&mut self) -> Option<LoadTicket> {
        if !self.mounted {
            return None;
        }
        match self.state {
            GateState::Loading | GateState::Loaded(_) | GateState::Error(_) => {
                Some(self.start_load())
            }
            GateState::Hidden | GateState::Triggered => None,
        }
    }

    fn start_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.fetches += 1;
        self.state = GateState::Loading;
        LoadTicket(self.generation)
    }

    /// Apply a load result; returns false when it was superseded or unmounted
    pub(crate) fn finish(&mut self, ticket: LoadTicket, result: std::result::Result<T, String>) -> bool {
        if !self.mounted || ticket.0 != self.generation {
            debug!(ticket = ticket.0, current = self.generation, "discarding stale gate load");
            return false;
        }
        self.state = match result {
            Ok(value) => GateState::Loaded(value),
            Err(message) => GateState::Error(message),
        };
        true
    }

    pub(crate) fn unmount(&mut self) {
        self.mounted = false;
        self.generation += 1;
        self.observer.disconnect();
        debug!(observer = ?self.observer.state(), fetches = self.fetches, "gate unmounted");
    }

    pub(crate) fn state(&self) -> &GateState<T> {
        &self.state
    }

    /// Loads started since the last mount
    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches
    }

    #[cfg(test)]
    pub(crate) fn observer(&self) -> &O {
        &self.observer
    }
}

/// Fetch every key concurrently. A failed key yields an empty series; the
/// whole load fails only when every key failed.
pub(crate) async fn load_collection<K, V, F, Fut>(keys: &[K], fetch: F) -> Result<Vec<(K, Vec<V>)>>
where
    K: Clone + Display,
    F: Fn(&K) -> Fut,
    Fut: Future<Output = Result<Vec<V>>>,
{
    let results = join_all(keys.iter().map(&fetch)).await;

    let mut loaded = Vec::with_capacity(keys.len());
    let mut last_error = None;
    let mut failures = 0;
    for (key, result) in keys.iter().zip(results) {
        match result {
            Ok(values) => loaded.push((key.clone(), values)),
            Err(e) => {
                debug!(key = %key, error = %e, "item fetch failed, showing empty series");
                failures += 1;
                last_error = Some(e);
                loaded.push((key.clone(), Vec::new()));
            }
        }
    }

    match last_error {
        Some(e) if failures == keys.len() => {
            warn!(items = keys.len(), error = %e, "every item fetch failed");
            Err(e)
        }
        _ => Ok(loaded),
    }
}
