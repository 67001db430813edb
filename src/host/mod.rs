//! Host Platform Services
//!
//! Trait seams the embedding host implements, with in-memory reference
//! implementations used as defaults and in tests.

pub mod options_store;
pub mod scheduler;
pub mod text_domain;

pub use options_store::{JsonFileOptionsStore, MemoryOptionsStore, OptionsStore};
pub use scheduler::{MemoryScheduler, ScheduledTask, TaskInterval, TaskScheduler};
pub use text_domain::{JsonFileTextDomains, TextDomainLoader};

use std::sync::Arc;

/// Bundle of host service handles shared by every plugin on a platform.
#[derive(Clone)]
pub struct HostServices {
    pub options: Arc<dyn OptionsStore>,
    pub scheduler: Arc<dyn TaskScheduler>,
    pub text_domains: Arc<dyn TextDomainLoader>,
}

impl HostServices {
    /// In-memory services, the default for embedding and tests.
    pub fn in_memory() -> Self {
        Self {
            options: Arc::new(MemoryOptionsStore::new()),
            scheduler: Arc::new(MemoryScheduler::new()),
            text_domains: Arc::new(JsonFileTextDomains::new()),
        }
    }

    /// Replace the options store.
    pub fn with_options_store(mut self, store: Arc<dyn OptionsStore>) -> Self {
        self.options = store;
        self
    }

    /// Replace the task scheduler.
    pub fn with_scheduler(mut self, scheduler: Arc<dyn TaskScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Replace the text domain loader.
    pub fn with_text_domains(mut self, loader: Arc<dyn TextDomainLoader>) -> Self {
        self.text_domains = loader;
        self
    }
}

impl Default for HostServices {
    fn default() -> Self {
        Self::in_memory()
    }
}
