//! CampMap Core Library
//!
//! Platform-agnostic geometry, alignment, gesture, and persistence logic
//! for the CampMap campsite layout editor. The host application owns
//! rendering, networking, and UI chrome; it drives this crate with input
//! events and renders what comes back.

pub mod events;
pub mod gesture;
pub mod grid;
pub mod guides;
pub mod storage;
pub mod viewport;

pub use events::{EventEmitter, Subscription};
pub use gesture::{GestureIntent, GestureInterpreter, GesturePhase, PINCH_JITTER_THRESHOLD};
pub use grid::{compute_visible_lines, GridLine, GridSpec};
pub use guides::{
    closest_guide, compute_snap, Guide, GuideEvent, GuideId, GuideStore, Orientation, SnapResult,
    GUIDE_PICKUP_THRESHOLD, SNAP_THRESHOLD,
};
pub use storage::{
    EditorState, MapRecord, MemoryTier, NotificationKind, PersistenceConfig,
    PersistenceController, QuotaAction, SaveOutcome, StorageError, StorageNotification,
    StorageResult, StorageTier,
};
pub use viewport::{Viewport, ViewportEvent, MAX_ZOOM, MIN_ZOOM};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileTier;
