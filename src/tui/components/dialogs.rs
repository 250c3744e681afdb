//! Modal dialogs
//!
//! [`DialogController`](controller::DialogController) owns the accessibility
//! behaviour every modal shares: focus moves in on open and back out on
//! close, Tab cycles inside the dialog, Escape requests a close and page
//! scrolling is locked.
//! [`Modal`] is the general-purpose surface built on it, and
//! [`ConfirmDialog`] asks a yes/no question with focus starting on Cancel.
//!
//! Open state always belongs to the owner. Dialogs report close requests
//! through callbacks and only unmount when the owner calls `close`.

pub mod confirm;
pub mod controller;
pub mod modal;
pub mod types;

pub use confirm::{ConfirmDialog, ConfirmVariant};
pub use controller::InitialFocus;
pub use modal::Modal;
pub use types::{callback, Dialog, DialogCallback, DialogConfig, DialogSize};
