//! # sei-driver
//!
//! A Rust library for automating the SEI document-management portal via Chrome DevTools Protocol (CDP).
//!
//! ## Features
//!
//! - **Record Indexing**: Walk the paginated home listing and keep an ordered registry of open records
//! - **Tree Navigation**: Resolve a record's frame-rendered document tree by visible label
//! - **Action Menus**: Map a record's action panel to links and scripts
//! - **Workflows**: Multi-window portal operations (send to unit, include documents, expedite letters, etc.)
//!
//! ## Usage
//!
//! ### Opening a Record
//!
//! ```rust,no_run
//! use sei_driver::{ChromeDriver, ConfigLoader, LaunchOptions, SeiSession};
//! use std::path::Path;
//!
//! # fn main() -> sei_driver::Result<()> {
//! let config = ConfigLoader::load(Path::new("sei.toml"))?;
//! let driver = ChromeDriver::launch(LaunchOptions::new().headless(false))?;
//! let mut sei = SeiSession::new(driver, config);
//!
//! sei.go("")?;
//! sei.login("fulano", "secret")?;
//!
//! // Index every open record, then open one and list its actions
//! let count = sei.index_records()?;
//! println!("{} records open in this unit", count);
//!
//! let mut record = sei.open_record("53500.000001/2024-01")?;
//! let actions = sei.build_actions(&mut record)?;
//! for label in actions.labels() {
//!     println!("{}", label);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Using the Workflow System
//!
//! ```rust,no_run
//! use sei_driver::{ChromeDriver, ConnectionOptions, SeiConfig, SeiSession};
//! use sei_driver::workflows::{WorkflowContext, WorkflowRegistry};
//! use serde_json::json;
//!
//! # fn main() -> sei_driver::Result<()> {
//! let driver = ChromeDriver::connect(ConnectionOptions::new("ws://127.0.0.1:9222/devtools/browser/abc"))?;
//! let mut sei = SeiSession::new(driver, SeiConfig::default());
//! let registry = WorkflowRegistry::with_defaults();
//! let mut context = WorkflowContext::new(&mut sei);
//!
//! registry.execute(
//!     "send_to_unit",
//!     json!({"record": "53500.000001/2024-01", "unit_acronym": "ORCN", "unit_title": "Coordenação de Outorga"}),
//!     &mut context,
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Page driver trait, the Chrome implementation, and scoped frame/window guards
//! - [`dom`]: HTML snapshots, tree nodes, action maps and listing rows
//! - [`session`]: The portal session, record registry and indexing pass
//! - [`workflows`]: Portal workflows and their registry
//! - [`locators`]: Element locators per portal screen
//! - [`config`]: Portal configuration loaded from TOML
//! - [`error`]: Error types and result aliases

pub mod browser;
pub mod config;
pub mod dom;
pub mod error;
pub mod locators;
pub mod session;
pub mod workflows;

pub use browser::{ChromeDriver, ConnectionOptions, FrameScope, LaunchOptions, PageDriver, WindowScope};
pub use config::{ConfigLoader, SeiConfig};
pub use dom::{Action, ActionEntry, ActionMap, BlockEntry, ListingRow, NavigationNode, NavigationTree};
pub use error::{Result, SeiError};
pub use locators::{By, Locator};
pub use session::{IndexingState, Record, RecordRegistry, SeiSession};
pub use workflows::{Workflow, WorkflowContext, WorkflowRegistry, WorkflowResult};
