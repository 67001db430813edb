//! Hook Registry
//!
//! Shared registry of lifecycle action handlers and named value filters.
//! Action dispatch is strictly sequential in ascending priority order, and a
//! failing handler never aborts the dispatch; failures are logged and
//! counted in the outcome.

use std::sync::Arc;

use log::{debug, warn};
use parking_lot::RwLock;
use serde_json::Value;

use super::events::{ActionPayload, HookPoint, DEFAULT_PRIORITY};
use crate::plugin::error::PluginResult;

/// Handler invoked when a lifecycle action fires.
#[async_trait::async_trait]
pub trait ActionHandler: Send + Sync {
    /// Stable identifier, used for logging and removal.
    fn id(&self) -> &str;

    /// Hook points this handler subscribes to.
    fn points(&self) -> Vec<HookPoint>;

    /// Dispatch position; lower runs earlier.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    async fn handle(&self, point: HookPoint, payload: &ActionPayload) -> PluginResult<()>;
}

/// Synchronous value transform applied by filter name.
pub type FilterFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

struct RegisteredAction {
    handler: Arc<dyn ActionHandler>,
    priority: i32,
    seq: usize,
}

struct RegisteredFilter {
    name: String,
    owner: String,
    priority: i32,
    seq: usize,
    filter: FilterFn,
}

/// Counts from one action dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub dispatched: usize,
    pub failures: usize,
}

/// Registry of action handlers and named filters, shareable behind `Arc`.
///
/// Interior-mutable so plugins can register filters from their callbacks
/// while the platform holds the registry.
#[derive(Default)]
pub struct HookRegistry {
    actions: RwLock<Vec<RegisteredAction>>,
    filters: RwLock<Vec<RegisteredFilter>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action handler. The handler's priority is captured at
    /// registration time.
    pub fn add_action(&self, handler: Arc<dyn ActionHandler>) {
        let mut actions = self.actions.write();
        let seq = actions.len();
        let priority = handler.priority();
        debug!(
            "registering action handler '{}' (priority {})",
            handler.id(),
            priority
        );
        actions.push(RegisteredAction { handler, priority, seq });
    }

    /// Fire an action at every subscribed handler, in ascending priority
    /// order (registration order breaks ties). Handler failures are logged
    /// and counted, never propagated.
    pub async fn do_action(&self, point: HookPoint, payload: &ActionPayload) -> DispatchOutcome {
        let handlers: Vec<Arc<dyn ActionHandler>> = {
            let actions = self.actions.read();
            let mut matching: Vec<&RegisteredAction> = actions
                .iter()
                .filter(|r| r.handler.points().contains(&point))
                .collect();
            matching.sort_by_key(|r| (r.priority, r.seq));
            matching.iter().map(|r| Arc::clone(&r.handler)).collect()
        };

        let mut outcome = DispatchOutcome::default();
        for handler in handlers {
            outcome.dispatched += 1;
            if let Err(err) = handler.handle(point, payload).await {
                outcome.failures += 1;
                warn!("action handler '{}' failed at {}: {}", handler.id(), point, err);
            }
        }

        debug!(
            "dispatched {} at {} ({} failures)",
            outcome.dispatched, point, outcome.failures
        );
        outcome
    }

    /// Register a named filter owned by `owner`.
    pub fn add_filter<F>(&self, name: &str, owner: &str, priority: i32, filter: F)
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        let mut filters = self.filters.write();
        let seq = filters.len();
        filters.push(RegisteredFilter {
            name: name.to_string(),
            owner: owner.to_string(),
            priority,
            seq,
            filter: Arc::new(filter),
        });
    }

    /// Thread a value through every filter registered under `name`, in
    /// ascending priority order. With no filters registered the value passes
    /// through unchanged.
    pub fn apply_filters(&self, name: &str, value: Value) -> Value {
        let chain: Vec<FilterFn> = {
            let filters = self.filters.read();
            let mut matching: Vec<&RegisteredFilter> =
                filters.iter().filter(|r| r.name == name).collect();
            matching.sort_by_key(|r| (r.priority, r.seq));
            matching.iter().map(|r| Arc::clone(&r.filter)).collect()
        };

        chain.into_iter().fold(value, |acc, filter| filter(acc))
    }

    /// Remove every action handler and filter owned by `owner`.
    /// Returns how many registrations were removed.
    pub fn remove_owner(&self, owner: &str) -> usize {
        let mut removed = 0;
        {
            let mut actions = self.actions.write();
            let before = actions.len();
            actions.retain(|r| r.handler.id() != owner);
            removed += before - actions.len();
        }
        {
            let mut filters = self.filters.write();
            let before = filters.len();
            filters.retain(|r| r.owner != owner);
            removed += before - filters.len();
        }
        removed
    }

    /// Whether any handler subscribes to the given point.
    pub fn has_action_handlers(&self, point: HookPoint) -> bool {
        self.actions
            .read()
            .iter()
            .any(|r| r.handler.points().contains(&point))
    }

    /// Whether any filter is registered under the given name.
    pub fn has_filter(&self, name: &str) -> bool {
        self.filters.read().iter().any(|r| r.name == name)
    }
}
