//! The embedded viewer controller.
//!
//! Owns the lifecycle of exactly one rendering engine per shell, keeps page
//! state synchronized with it, forwards commands, and exposes the one-shot
//! visibility gate and the two shells (embedded pane and modal overlay) that
//! compose everything.

pub mod command;
pub mod session;
pub mod shell;
pub mod sync;
pub mod visibility;

pub use command::FullscreenOutcome;
pub use session::{LoadStatus, ViewerController, ViewerSession};
pub use sync::ViewState;
pub use visibility::VisibilityGate;
