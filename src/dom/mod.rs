//! Read-only inspection of portal HTML
//!
//! This module turns page and frame sources into typed values. It includes:
//! - HtmlSnapshot: parsed source with the lookups the portal screens need
//! - derive_label: the visible-label rule shared by tree nodes and actions
//! - NavigationTree: the clickable nodes of a record's tree frame
//! - ActionMap: label → link/script mapping of a record's action panel
//! - ListingRow / BlockEntry: rows of the home listing and of signature blocks

pub mod actions;
pub mod label;
pub mod listing;
pub mod snapshot;
pub mod tree;

pub use actions::{Action, ActionEntry, ActionMap};
pub use label::derive_label;
pub use listing::{BlockEntry, ListingRow};
pub use snapshot::HtmlSnapshot;
pub use tree::{NavigationNode, NavigationTree};
