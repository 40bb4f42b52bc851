//! Browser access
//!
//! This module provides the driver layer the rest of the crate is written against:
//! - PageDriver: the cursor-based primitive operations (navigate, frames, windows, elements)
//! - ChromeDriver: PageDriver over a headless_chrome browser
//! - FrameScope / WindowScope: scoped cursor moves restored on drop
//! - LaunchOptions / ConnectionOptions: how the browser is obtained

pub mod chrome;
pub mod config;
pub mod driver;
pub mod scope;

#[cfg(test)]
pub(crate) mod fake;

pub use chrome::ChromeDriver;
pub use config::{ConnectionOptions, LaunchOptions};
pub use driver::{PageDriver, WindowHandle, poll_until};
pub use scope::{FrameScope, WindowScope};
