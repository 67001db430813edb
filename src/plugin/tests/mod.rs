//! Plugin System Tests
//!
//! Lifecycle tests for the plugin base behavior with mock implementations.
