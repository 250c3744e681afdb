//! Reusable UI pieces drawn over the screen's node tree

pub mod dialogs;
pub mod node_view;
