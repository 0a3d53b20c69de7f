//! Test doubles for the attribute store and notifier seams.

use crate::attribute::AttributeStore;
use crate::notifier::{Notification, Notifier};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// How the fake driver reacts to writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteBehavior {
    Accept,
    /// Write succeeds but the value does not change
    Ignore,
    Fail,
}

/// In-memory attribute files
#[derive(Debug)]
pub struct MemoryStore {
    files: Mutex<HashMap<PathBuf, String>>,
    writes: Mutex<Vec<(PathBuf, String)>>,
    behavior: Mutex<WriteBehavior>,
    fail_reads: Mutex<bool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            behavior: Mutex::new(WriteBehavior::Accept),
            fail_reads: Mutex::new(false),
        }
    }

    pub fn with_file(path: &str, contents: &str) -> Self {
        let store = Self::new();
        store.set(path, contents);
        store
    }

    pub fn set(&self, path: &str, contents: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), contents.to_string());
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }

    pub fn set_write_behavior(&self, behavior: WriteBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().unwrap() = fail;
    }

    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes.lock().unwrap().clone()
    }
}

impl AttributeStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        if *self.fail_reads.lock().unwrap() {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read denied"));
        }
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such attribute"))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let behavior = *self.behavior.lock().unwrap();
        let mut files = self.files.lock().unwrap();
        if behavior == WriteBehavior::Fail || !files.contains_key(path) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such attribute"));
        }
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), contents.to_string()));
        if behavior == WriteBehavior::Accept {
            files.insert(path.to_path_buf(), contents.to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyEvent {
    Post(Notification),
    Withdraw(u32),
}

/// Records every notifier call in order
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotifyEvent>>,
    fail: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let notifier = Self::default();
        *notifier.fail.lock().unwrap() = true;
        notifier
    }

    pub fn events(&self) -> Vec<NotifyEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn post(&self, notification: &Notification) -> anyhow::Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(NotifyEvent::Post(notification.clone()));
        if *self.fail.lock().unwrap() {
            anyhow::bail!("notification service unavailable");
        }
        Ok(())
    }

    fn withdraw(&self, id: u32) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(NotifyEvent::Withdraw(id));
        if *self.fail.lock().unwrap() {
            anyhow::bail!("notification service unavailable");
        }
        Ok(())
    }
}
