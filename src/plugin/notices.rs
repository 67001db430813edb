//! Admin Notice Accumulator
//!
//! Per-request buffer for admin-facing messages. Callbacks queue messages
//! under a category during the request; the host renders the whole buffer
//! exactly once, after which further adds are rejected rather than silently
//! dropped.

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::Mutex;

use super::error::{PluginError, PluginResult};

/// Categories an admin notice can be published under.
///
/// The string form doubles as the CSS class on the rendered markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoticeKind {
    /// Informational confirmation, e.g. a completed upgrade
    Updated,
    /// Failure the admin needs to see
    Error,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::Updated => "updated",
            NoticeKind::Error => "error",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Default)]
struct NoticeBuffer {
    messages: BTreeMap<NoticeKind, Vec<String>>,
    rendered: bool,
}

/// Accumulator for one plugin's admin notices within a single request.
#[derive(Debug, Default)]
pub struct AdminNotices {
    buffer: Mutex<NoticeBuffer>,
}

impl AdminNotices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message under a category.
    ///
    /// Empty messages are rejected, as is any add after the request has
    /// already rendered its notices. Both rejections are error values the
    /// caller can inspect, never silent drops.
    pub fn add<S: Into<String>>(&self, kind: NoticeKind, message: S) -> PluginResult<()> {
        let message = message.into();
        if message.is_empty() {
            return Err(PluginError::EmptyNotice);
        }

        let mut buffer = self.buffer.lock();
        if buffer.rendered {
            return Err(PluginError::NoticesSpent);
        }
        buffer.messages.entry(kind).or_default().push(message);
        Ok(())
    }

    /// Render every queued notice as admin markup and mark the buffer spent.
    ///
    /// Messages are wrapped as `<div class="{kind}"><p>{message}</p></div>`,
    /// grouped by category in category order and kept in insertion order
    /// within a category. A second render in the same request yields an
    /// empty string.
    pub fn render_once(&self) -> String {
        let mut buffer = self.buffer.lock();
        if buffer.rendered {
            log::debug!("admin notices already rendered for this request");
            return String::new();
        }
        buffer.rendered = true;

        let messages = std::mem::take(&mut buffer.messages);
        let mut markup = String::new();
        for (kind, queued) in &messages {
            for message in queued {
                markup.push_str(&format!(
                    "<div class=\"{}\"><p>{}</p></div>\n",
                    kind.as_str(),
                    message
                ));
            }
        }
        markup
    }

    /// Whether this request has already rendered its notices.
    pub fn is_rendered(&self) -> bool {
        self.buffer.lock().rendered
    }

    /// Number of messages currently queued across all categories.
    pub fn pending(&self) -> usize {
        self.buffer.lock().messages.values().map(Vec::len).sum()
    }
}
