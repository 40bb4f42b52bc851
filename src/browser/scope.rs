//! Scoped acquisition of the browser cursor
//!
//! [`FrameScope`] and [`WindowScope`] hold the only mutable borrow of the driver
//! while the cursor is moved into a frame or a secondary window, and put it back in
//! `Drop`, so every exit path (success, early return, `?`) restores the cursor.
//! Restoration failures are logged and swallowed: the original error, if any, is
//! the one reported to the caller.

use crate::browser::driver::{PageDriver, WindowHandle};
use crate::error::Result;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

/// Cursor moved into a frame of the current window; back to the top-level document on drop
pub struct FrameScope<'a, D: PageDriver + ?Sized> {
    driver: &'a mut D,
    frame: String,
}

impl<'a, D: PageDriver + ?Sized> FrameScope<'a, D> {
    /// Switch into `frame`, waiting at most `timeout` for it to be reachable
    pub fn enter(driver: &'a mut D, frame: &str, timeout: Duration) -> Result<Self> {
        if let Err(e) = driver.switch_to_frame(frame, timeout) {
            if let Err(restore) = driver.switch_to_default_content() {
                log::warn!("Failed to restore default content after '{}': {}", frame, restore);
            }
            return Err(e);
        }
        log::debug!("Entered frame '{}'", frame);
        Ok(Self { driver, frame: frame.to_string() })
    }

    pub fn frame(&self) -> &str {
        &self.frame
    }
}

impl<D: PageDriver + ?Sized> Deref for FrameScope<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        &*self.driver
    }
}

impl<D: PageDriver + ?Sized> DerefMut for FrameScope<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut *self.driver
    }
}

impl<D: PageDriver + ?Sized> Drop for FrameScope<'_, D> {
    fn drop(&mut self) {
        match self.driver.switch_to_default_content() {
            Ok(()) => log::debug!("Left frame '{}'", self.frame),
            Err(e) => log::warn!("Failed to leave frame '{}': {}", self.frame, e),
        }
    }
}

/// Cursor moved into a secondary window; the window is closed and the origin refocused on drop
pub struct WindowScope<'a, D: PageDriver + ?Sized> {
    driver: &'a mut D,
    origin: WindowHandle,
    opened: WindowHandle,
}

impl<'a, D: PageDriver + ?Sized> WindowScope<'a, D> {
    /// Open `url` in a new window
    pub fn open(driver: &'a mut D, url: &str) -> Result<Self> {
        let origin = driver.current_window()?;
        match driver.open_window(url) {
            Ok(opened) => {
                log::debug!("Opened window {} for {}", opened, url);
                Ok(Self { driver, origin, opened })
            }
            Err(e) => {
                refocus(driver, &origin);
                Err(e)
            }
        }
    }

    /// Run `trigger` (typically a click) and move into the window it opens
    pub fn follow(
        driver: &'a mut D,
        timeout: Duration,
        trigger: impl FnOnce(&mut D) -> Result<()>,
    ) -> Result<Self> {
        let origin = driver.current_window()?;
        let known = driver.window_handles()?;

        let opened = match adopt_new_window(driver, &known, timeout, trigger) {
            Ok(opened) => opened,
            Err(e) => {
                close_unknown_windows(driver, &known);
                refocus(driver, &origin);
                return Err(e);
            }
        };

        log::debug!("Followed into window {}", opened);
        Ok(Self { driver, origin, opened })
    }

    /// Window that had the cursor before this scope
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Window owned by this scope
    pub fn handle(&self) -> &str {
        &self.opened
    }
}

fn adopt_new_window<D: PageDriver + ?Sized>(
    driver: &mut D,
    known: &[WindowHandle],
    timeout: Duration,
    trigger: impl FnOnce(&mut D) -> Result<()>,
) -> Result<WindowHandle> {
    trigger(driver)?;
    let opened = driver.wait_for_new_window(known, timeout)?;
    driver.switch_to_window(&opened)?;
    Ok(opened)
}

/// Close every window opened since `known` was listed
fn close_unknown_windows<D: PageDriver + ?Sized>(driver: &mut D, known: &[WindowHandle]) {
    let handles = match driver.window_handles() {
        Ok(handles) => handles,
        Err(e) => {
            log::warn!("Failed to list windows: {}", e);
            return;
        }
    };
    for handle in handles.iter().filter(|handle| !known.contains(handle)) {
        if let Err(e) = driver.switch_to_window(handle).and_then(|()| driver.close_window()) {
            log::warn!("Failed to close window {}: {}", handle, e);
        }
    }
}

fn refocus<D: PageDriver + ?Sized>(driver: &mut D, origin: &str) {
    if let Err(e) = driver.switch_to_window(origin) {
        log::warn!("Failed to refocus window {}: {}", origin, e);
    }
}

impl<D: PageDriver + ?Sized> Deref for WindowScope<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        &*self.driver
    }
}

impl<D: PageDriver + ?Sized> DerefMut for WindowScope<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut *self.driver
    }
}

impl<D: PageDriver + ?Sized> Drop for WindowScope<'_, D> {
    fn drop(&mut self) {
        // Portal popups often close themselves after a submit
        let still_open = self.driver.window_handles().map(|handles| handles.contains(&self.opened)).unwrap_or(true);

        if still_open {
            let focused = self.driver.current_window().map(|current| current == self.opened).unwrap_or(false);
            let closed = if focused {
                self.driver.close_window()
            } else {
                self.driver.switch_to_window(&self.opened).and_then(|()| self.driver.close_window())
            };
            if let Err(e) = closed {
                log::warn!("Failed to close window {}: {}", self.opened, e);
            }
        }

        refocus(&mut *self.driver, &self.origin);
        log::debug!("Returned to window {}", self.origin);
    }
}
