//! Page-level services: the single alert banner, browser file saving, and the unload beacon.

use std::{cell::RefCell, rc::Rc};

/// Page-wide message banner. Showing a message replaces any previous one.
pub trait AlertBanner {
    /// Shows `message` as the only banner on the page.
    fn show_error(&self, message: &str);

    /// Removes the banner.
    fn clear(&self);
}

/// Browser-native "save as" for downloaded bytes.
pub trait FileSaver {
    /// Saves `bytes` under `file_name` with the given MIME type.
    fn save(&self, bytes: &[u8], file_name: &str, mime_type: &str) -> Result<(), String>;
}

/// Fire-and-forget resource release on page unload.
pub trait ReleaseBeacon {
    /// Registers `url` to be notified (POST, no response awaited) when the page is left.
    fn release_on_unload(&self, url: &str);
}

#[derive(Debug, Clone, Copy, Default)]
/// Banner adapter that discards messages.
pub struct NoopAlertBanner;

impl AlertBanner for NoopAlertBanner {
    fn show_error(&self, _message: &str) {}

    fn clear(&self) {}
}

#[derive(Debug, Clone, Copy, Default)]
/// File saver adapter for targets without downloads.
pub struct NoopFileSaver;

impl FileSaver for NoopFileSaver {
    fn save(&self, _bytes: &[u8], _file_name: &str, _mime_type: &str) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Beacon adapter that never sends.
pub struct NoopReleaseBeacon;

impl ReleaseBeacon for NoopReleaseBeacon {
    fn release_on_unload(&self, _url: &str) {}
}

#[derive(Debug, Clone, Default)]
/// In-memory banner recording the visible message and how many times one was shown.
pub struct MemoryAlertBanner {
    inner: Rc<RefCell<(Option<String>, u32)>>,
}

impl MemoryAlertBanner {
    /// Currently visible message.
    pub fn message(&self) -> Option<String> {
        self.inner.borrow().0.clone()
    }

    /// Total number of `show_error` calls.
    pub fn shown_count(&self) -> u32 {
        self.inner.borrow().1
    }
}

impl AlertBanner for MemoryAlertBanner {
    fn show_error(&self, message: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.0 = Some(message.to_string());
        inner.1 += 1;
    }

    fn clear(&self) {
        self.inner.borrow_mut().0 = None;
    }
}

/// One file handed to [`MemoryFileSaver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    /// File name.
    pub file_name: String,
    /// MIME type of the blob.
    pub mime_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
/// In-memory file saver.
pub struct MemoryFileSaver {
    saved: Rc<RefCell<Vec<SavedFile>>>,
    fail_with: Rc<RefCell<Option<String>>>,
}

impl MemoryFileSaver {
    /// Files saved so far.
    pub fn saved(&self) -> Vec<SavedFile> {
        self.saved.borrow().clone()
    }

    /// Makes subsequent saves fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.fail_with.borrow_mut() = Some(message.into());
    }
}

impl FileSaver for MemoryFileSaver {
    fn save(&self, bytes: &[u8], file_name: &str, mime_type: &str) -> Result<(), String> {
        if let Some(message) = self.fail_with.borrow().clone() {
            return Err(message);
        }
        self.saved.borrow_mut().push(SavedFile {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory beacon recording registered release URLs.
pub struct MemoryReleaseBeacon {
    registered: Rc<RefCell<Vec<String>>>,
}

impl MemoryReleaseBeacon {
    /// URLs registered for release on unload.
    pub fn registered(&self) -> Vec<String> {
        self.registered.borrow().clone()
    }
}

impl ReleaseBeacon for MemoryReleaseBeacon {
    fn release_on_unload(&self, url: &str) {
        self.registered.borrow_mut().push(url.to_string());
    }
}
