//! Local preview resources for selected images.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

/// Host that turns local media into displayable preview references.
pub trait PreviewHost: Send + Sync {
    /// Registers media and returns its preview reference.
    ///
    /// # Errors
    /// Returns a backend-specific description when the preview cannot be made.
    fn create(&self, media: &[u8], mime_type: &str) -> Result<String, String>;

    /// Releases a previously created reference. Unknown references are ignored.
    fn release(&self, reference: &str);
}

/// Owning guard for one live preview reference.
///
/// The reference is released exactly once, either by [`PreviewHandle::release`]
/// or when the handle is dropped.
pub struct PreviewHandle {
    reference: String,
    host: Arc<dyn PreviewHost>,
}

impl PreviewHandle {
    /// Creates a preview on `host`.
    ///
    /// # Errors
    /// Propagates the host's failure description.
    pub fn acquire(
        host: Arc<dyn PreviewHost>,
        media: &[u8],
        mime_type: &str,
    ) -> Result<Self, String> {
        let reference = host.create(media, mime_type)?;
        debug!(stage = "preview", action = "create", reference = %reference);
        Ok(Self { reference, host })
    }

    /// Returns the displayable reference.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Releases the preview now.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        debug!(stage = "preview", action = "release", reference = %self.reference);
        self.host.release(&self.reference);
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("reference", &self.reference)
            .finish()
    }
}

/// In-process preview host keeping previews in memory.
///
/// Used by the CLI and by tests to observe that no preview outlives its
/// owner.
#[derive(Debug, Default)]
pub struct InMemoryPreviewHost {
    next_id: AtomicU64,
    live: Mutex<BTreeMap<String, usize>>,
}

impl InMemoryPreviewHost {
    /// Creates an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of previews currently held.
    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }

    /// Total previews ever created.
    pub fn created_count(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }

    /// Returns `true` when `reference` is still held.
    pub fn is_live(&self, reference: &str) -> bool {
        self.live
            .lock()
            .map(|live| live.contains_key(reference))
            .unwrap_or(false)
    }
}

impl PreviewHost for InMemoryPreviewHost {
    fn create(&self, media: &[u8], _mime_type: &str) -> Result<String, String> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let reference = format!("blob:posecheck/{id}");
        let mut live = self
            .live
            .lock()
            .map_err(|_| "preview registry lock poisoned".to_string())?;
        live.insert(reference.clone(), media.len());
        Ok(reference)
    }

    fn release(&self, reference: &str) {
        match self.live.lock() {
            Ok(mut live) => {
                live.remove(reference);
            }
            Err(_) => warn!(stage = "preview", action = "release", "preview registry lock poisoned"),
        }
    }
}
