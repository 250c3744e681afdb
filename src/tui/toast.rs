//! Toast notifications
//!
//! A process-wide queue of short messages. Pages enqueue through
//! [`global`]; the app subscribes and redraws the [`ToastStack`].

pub mod store;
pub mod view;

pub use store::{global, SubscriberId, ToastStore, ToastTimings, ToastVariant};
pub use view::ToastStack;
