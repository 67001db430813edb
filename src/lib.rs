// Allow dead code during development phase
#![allow(dead_code)]

pub mod config;
pub mod hooks;
pub mod host;
pub mod platform;
pub mod plugin;
pub mod version;
