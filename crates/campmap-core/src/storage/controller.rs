//! Quota-aware persistence controller.
//!
//! Serializes the full editor state into a capacity-bounded storage tier,
//! degrading through a truncation ladder when capacity is exceeded: keep
//! the most recently updated maps, drop the rest, and notify the host so
//! it can inform the user. A terminal failure clears the key rather than
//! leaving a partially written blob behind.

use super::{EditorState, StorageError, StorageResult, StorageTier};
use crate::events::{EventEmitter, Subscription};
use std::fmt;
use std::sync::Arc;

/// Key under which the editor state blob is stored.
pub const DEFAULT_STORAGE_KEY: &str = "campmap.editor-state";

/// Soft serialized-size ceiling before proactive truncation kicks in.
pub const DEFAULT_SOFT_LIMIT_BYTES: usize = 4 * 1024 * 1024;

/// Maps retained by the first truncation rung.
pub const DEFAULT_MAX_MAPS_TO_KEEP: usize = 10;

/// Maps retained by the second truncation rung.
const REDUCED_MAPS_TO_KEEP: usize = 5;

/// Maps retained by the final attempt after a hard quota rejection.
const EMERGENCY_MAPS_TO_KEEP: usize = 3;

/// Action taken by the controller, reported to the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaAction {
    Cleanup,
    Compress,
    EmergencyCleanup,
    QuotaExceeded,
    ClearFailed,
}

impl QuotaAction {
    /// Wire name matching the host notification protocol.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaAction::Cleanup => "cleanup",
            QuotaAction::Compress => "compress",
            QuotaAction::EmergencyCleanup => "emergency-cleanup",
            QuotaAction::QuotaExceeded => "quota-exceeded",
            QuotaAction::ClearFailed => "clear-failed",
        }
    }
}

/// Severity of a storage notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Capacity-driven data loss; the save still succeeded.
    QuotaWarning,
    /// Terminal save failure; the stored copy was cleared.
    QuotaError,
}

/// Notification delivered to subscribed hosts when a save drops data or
/// fails terminally.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageNotification {
    pub kind: NotificationKind,
    pub action: QuotaAction,
    pub message: String,
}

/// Result of a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Everything was written as-is.
    Saved,
    /// The write succeeded after dropping the oldest maps.
    Degraded { dropped: usize },
}

/// Controller configuration.
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    pub key: String,
    pub soft_limit_bytes: usize,
    pub max_maps_to_keep: usize,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            soft_limit_bytes: DEFAULT_SOFT_LIMIT_BYTES,
            max_maps_to_keep: DEFAULT_MAX_MAPS_TO_KEEP,
        }
    }
}

/// Owns the durable copy of the editor state and is the sole writer to its
/// key namespace.
///
/// An optional secondary tier (larger capacity) backs the same logical
/// key; any secondary failure logs a warning and falls back to the
/// primary tier without surfacing to the caller.
pub struct PersistenceController {
    primary: Arc<dyn StorageTier>,
    secondary: Option<Arc<dyn StorageTier>>,
    config: PersistenceConfig,
    events: EventEmitter<StorageNotification>,
    pending: Option<EditorState>,
}

impl fmt::Debug for PersistenceController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceController")
            .field("config", &self.config)
            .field("has_secondary", &self.secondary.is_some())
            .field("has_pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}

impl PersistenceController {
    /// Create a controller over a primary storage tier.
    pub fn new(primary: Arc<dyn StorageTier>) -> Self {
        Self {
            primary,
            secondary: None,
            config: PersistenceConfig::default(),
            events: EventEmitter::new(),
            pending: None,
        }
    }

    /// Attach a larger-capacity secondary tier backing the same key.
    pub fn with_secondary(mut self, secondary: Arc<dyn StorageTier>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Override the default configuration.
    pub fn with_config(mut self, config: PersistenceConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &PersistenceConfig {
        &self.config
    }

    /// Register a host observer for quota notifications.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&StorageNotification) + 'static,
    ) -> Subscription {
        self.events.subscribe(listener)
    }

    /// Remove a previously registered observer.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.events.unsubscribe(subscription)
    }

    /// Record a state to be written by the next [`flush`](Self::flush).
    /// A newer queued state supersedes an older one (last-write-wins).
    pub fn queue_save(&mut self, state: EditorState) {
        self.pending = Some(state);
    }

    /// Whether a queued state is waiting to be flushed.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Write the most recently queued state, if any.
    pub async fn flush(&mut self) -> Option<StorageResult<SaveOutcome>> {
        let state = self.pending.take()?;
        Some(self.save(&state).await)
    }

    /// Persist the editor state, degrading through the truncation ladder
    /// when capacity is exceeded.
    ///
    /// Maps are dropped oldest-`updated_at`-first. Each rung that drops
    /// data emits a notification. If even the final emergency write is
    /// rejected, the key is cleared so no partial blob survives, and the
    /// error is returned.
    pub async fn save(&mut self, state: &EditorState) -> StorageResult<SaveOutcome> {
        let total = state.maps.len();

        let mut working = state.clone();
        working
            .maps
            .sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        let mut payload = serialize(&working)?;

        // Proactive soft-limit rungs
        if payload.len() > self.config.soft_limit_bytes {
            let dropped = truncate_to(&mut working, self.config.max_maps_to_keep);
            if dropped > 0 {
                log::debug!(
                    "editor state over soft limit ({} bytes); dropped {} oldest maps",
                    payload.len(),
                    dropped
                );
                self.notify(
                    NotificationKind::QuotaWarning,
                    QuotaAction::Compress,
                    format!(
                        "Storage limit reached. Keeping your {} most recently updated maps.",
                        working.maps.len()
                    ),
                );
                payload = serialize(&working)?;
            }
        }
        if payload.len() > self.config.soft_limit_bytes {
            let dropped = truncate_to(&mut working, REDUCED_MAPS_TO_KEEP);
            if dropped > 0 {
                self.notify(
                    NotificationKind::QuotaWarning,
                    QuotaAction::Cleanup,
                    format!(
                        "Storage is still over its limit. Keeping only your {} most recent maps.",
                        working.maps.len()
                    ),
                );
                payload = serialize(&working)?;
            }
        }

        match self.write_value(&payload).await {
            Ok(()) => {}
            Err(e) if e.is_quota() => {
                self.notify(
                    NotificationKind::QuotaWarning,
                    QuotaAction::QuotaExceeded,
                    format!("Storage rejected the save: {}", e),
                );
                truncate_to(&mut working, EMERGENCY_MAPS_TO_KEEP);
                self.notify(
                    NotificationKind::QuotaWarning,
                    QuotaAction::EmergencyCleanup,
                    format!(
                        "Making room by keeping only your {} most recent maps.",
                        working.maps.len()
                    ),
                );
                payload = serialize(&working)?;

                if let Err(final_err) = self.write_value(&payload).await {
                    // Never leave a partially written blob under the key.
                    self.remove_key().await;
                    self.notify(
                        NotificationKind::QuotaError,
                        QuotaAction::ClearFailed,
                        format!(
                            "Could not save your maps; stored data was cleared: {}",
                            final_err
                        ),
                    );
                    return Err(final_err);
                }
            }
            Err(e) => return Err(e),
        }

        let dropped = total - working.maps.len();
        if dropped == 0 {
            Ok(SaveOutcome::Saved)
        } else {
            Ok(SaveOutcome::Degraded { dropped })
        }
    }

    /// Load the persisted editor state. An absent or corrupt blob is a
    /// cold start, never an error.
    pub async fn load(&mut self) -> EditorState {
        let raw = match self.read_value().await {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("failed to read stored editor state: {}", e);
                return EditorState::default();
            }
        };

        match raw {
            None => EditorState::default(),
            Some(text) => match serde_json::from_str(&text) {
                Ok(state) => state,
                Err(e) => {
                    log::warn!("discarding corrupt editor state: {}", e);
                    EditorState::default()
                }
            },
        }
    }

    /// Delete the stored state from all tiers.
    pub async fn remove(&mut self) {
        self.remove_key().await;
    }

    async fn write_value(&self, value: &str) -> StorageResult<()> {
        if let Some(secondary) = &self.secondary {
            match secondary.set(&self.config.key, value).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    log::warn!("secondary storage tier write failed, falling back: {}", e);
                }
            }
        }
        self.primary.set(&self.config.key, value).await
    }

    async fn read_value(&self) -> StorageResult<Option<String>> {
        if let Some(secondary) = &self.secondary {
            match secondary.get(&self.config.key).await {
                Ok(Some(value)) => return Ok(Some(value)),
                Ok(None) => {}
                Err(e) => {
                    log::warn!("secondary storage tier read failed, falling back: {}", e);
                }
            }
        }
        self.primary.get(&self.config.key).await
    }

    async fn remove_key(&self) {
        if let Some(secondary) = &self.secondary {
            if let Err(e) = secondary.remove(&self.config.key).await {
                log::warn!("failed to clear secondary storage tier: {}", e);
            }
        }
        if let Err(e) = self.primary.remove(&self.config.key).await {
            log::warn!("failed to clear primary storage tier: {}", e);
        }
    }

    fn notify(&mut self, kind: NotificationKind, action: QuotaAction, message: String) {
        self.events.emit(&StorageNotification {
            kind,
            action,
            message,
        });
    }
}

fn serialize(state: &EditorState) -> StorageResult<String> {
    serde_json::to_string(state).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Keep the `keep` most recent maps (the list is already sorted by
/// `updated_at` descending). Returns the number of maps dropped. The
/// selection is cleared if the selected map was dropped.
fn truncate_to(state: &mut EditorState, keep: usize) -> usize {
    if state.maps.len() <= keep {
        return 0;
    }
    let dropped = state.maps.len() - keep;
    state.maps.truncate(keep);
    if let Some(selected) = &state.selected_map_id {
        if !state.maps.iter().any(|m| &m.id == selected) {
            state.selected_map_id = None;
        }
    }
    dropped
}
