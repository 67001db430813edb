//! Host Hook System
//!
//! Named lifecycle actions and value filters. Plugins are wired into the
//! fixed lifecycle points at install time; filters let plugins transform
//! named values (admin notice markup flows through the built-in
//! `admin_notices` filter).

pub mod events;
pub mod registry;

pub use events::{ActionPayload, HookPoint, ADMIN_NOTICES_FILTER, DEFAULT_PRIORITY};
pub use registry::{ActionHandler, DispatchOutcome, FilterFn, HookRegistry};
