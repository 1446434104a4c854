//! Diagnostic observers.
//!
//! An observer sees every outgoing request and every incoming response. It
//! never influences control flow: entries are handed over after the fact and
//! nothing is returned.

use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::http::HttpMethod;

/// One diagnostic entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Request {
        method: HttpMethod,
        url: String,
        body: Option<String>,
    },
    Response {
        method: HttpMethod,
        url: String,
        status: u16,
        body: String,
    },
}

/// Sink for diagnostic entries. Must be shareable across threads since one
/// client may serve concurrent callers.
pub trait Observer: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// Forwards entries to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn log(&self, entry: &LogEntry) {
        match entry {
            LogEntry::Request { method, url, body } => {
                debug!(%method, %url, body = body.as_deref().unwrap_or(""), "cio request");
            }
            LogEntry::Response {
                method,
                url,
                status,
                body,
            } => {
                debug!(%method, %url, status, body = %body, "cio response");
            }
        }
    }
}

/// Keeps every entry in memory; handy in tests.
#[derive(Debug, Default)]
pub struct MemoryObserver {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Observer for MemoryObserver {
    fn log(&self, entry: &LogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_observer_keeps_entries_in_order() {
        let observer = MemoryObserver::new();
        observer.log(&LogEntry::Request {
            method: HttpMethod::Get,
            url: "http://test.local/a".to_string(),
            body: None,
        });
        observer.log(&LogEntry::Response {
            method: HttpMethod::Get,
            url: "http://test.local/a".to_string(),
            status: 200,
            body: "[]".to_string(),
        });
        let entries = observer.entries();
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0], LogEntry::Request { .. }));
        assert!(matches!(entries[1], LogEntry::Response { status: 200, .. }));
    }

    #[test]
    fn entries_survive_a_poisoned_lock() {
        let observer = std::sync::Arc::new(MemoryObserver::new());
        let request = LogEntry::Request {
            method: HttpMethod::Get,
            url: "http://test.local/a".to_string(),
            body: None,
        };
        observer.log(&request);

        let holder = observer.clone();
        let panicked = std::thread::spawn(move || {
            let _guard = holder.entries.lock().unwrap();
            panic!("logger panicked while holding the lock");
        })
        .join();
        assert!(panicked.is_err());
        assert!(observer.entries.is_poisoned());

        observer.log(&request);
        assert_eq!(observer.entries(), vec![request.clone(), request]);
    }

    #[test]
    fn tracing_observer_accepts_both_entry_kinds() {
        let observer: &dyn Observer = &TracingObserver;
        observer.log(&LogEntry::Request {
            method: HttpMethod::Post,
            url: "http://test.local/f".to_string(),
            body: Some("a=1".to_string()),
        });
        observer.log(&LogEntry::Response {
            method: HttpMethod::Post,
            url: "http://test.local/f".to_string(),
            status: 500,
            body: String::new(),
        });
    }
}
