//! Platform surface provider abstraction
//!
//! The lifecycle sequencer acquires its OS resources (a diagnostic
//! console and the application window) through the [`SurfaceProvider`]
//! capability, so the sequencing logic can be exercised with a fake
//! provider that returns synthetic handles or injected failures. The
//! Win32 implementation lives in [`win32`].

use std::fmt;

use thiserror::Error;

#[cfg(windows)]
pub mod win32;

/// Maximum stored title length in bytes.
pub const MAX_TITLE_LEN: usize = 80;

/// Window/console title with a fixed byte capacity.
///
/// Over-long input is truncated at a character boundary; the stored
/// length never exceeds [`MAX_TITLE_LEN`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppTitle(String);

impl AppTitle {
    /// Store a title, truncating to the capacity if needed.
    pub fn new(title: &str) -> Self {
        let mut end = title.len().min(MAX_TITLE_LEN);
        while !title.is_char_boundary(end) {
            end -= 1;
        }
        Self(title[..end].to_string())
    }

    /// The stored title text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stored length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the stored title is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AppTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppTitle {
    fn from(title: &str) -> Self {
        Self::new(title)
    }
}

/// Minimum trackable window size, as reported by the platform and
/// floored by [`min_track_floor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinSize {
    /// Minimum outer width.
    pub x: i32,
    /// Minimum outer height.
    pub y: i32,
}

/// Floor the platform-reported minimum trackable size.
///
/// The client area must be at least one pixel high; a zero-height
/// window crashes surface creation downstream, so the height floor is
/// bumped by exactly one unit.
pub fn min_track_floor(raw_x: i32, raw_y: i32) -> MinSize {
    MinSize {
        x: raw_x,
        y: raw_y + 1,
    }
}

/// Fixed console placement: origin at the top-left of the screen, with
/// the application window immediately to the right of the console's
/// width so the two never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleLayout {
    /// Console client width.
    pub width: i32,
    /// Console client height.
    pub height: i32,
    /// Outer chrome allowance for the console title bar.
    pub title_bar: i32,
}

impl ConsoleLayout {
    /// Total console window height including the title bar allowance.
    pub const fn outer_height(&self) -> i32 {
        self.height + self.title_bar
    }

    /// Where the application window goes.
    pub const fn window_origin(&self) -> (i32, i32) {
        (self.width, 0)
    }
}

impl Default for ConsoleLayout {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            title_bar: 40,
        }
    }
}

/// Platform surface errors.
///
/// The two window-phase failures report distinctly so the caller can
/// surface the right message to the user.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The window class could not be registered.
    #[error("cannot register the window class: {0}")]
    ClassRegistrationFailed(String),

    /// The window itself could not be created.
    #[error("cannot create the application window: {0}")]
    WindowCreationFailed(String),

    /// The console could not be allocated or attached.
    #[error("cannot attach a console to the process: {0}")]
    ConsoleAttachFailed(String),
}

/// Capability the sequencer uses to acquire OS surfaces.
///
/// Both operations are invoked at most once per application; the
/// provider does not need to guard against repeated calls.
pub trait SurfaceProvider {
    /// Console attachment; dropping it releases the attachment.
    type Console;
    /// Native window owned by the application state after creation.
    type Window;

    /// Allocate a console, attach it to the process with the standard
    /// streams redirected to it, and place it at the fixed layout.
    fn create_console(&mut self, title: &AppTitle) -> Result<Self::Console, PlatformError>;

    /// Create the application window with the given client area.
    ///
    /// Returns the window together with the platform's floored minimum
    /// trackable size.
    fn create_window(
        &mut self,
        title: &AppTitle,
        width: u32,
        height: u32,
    ) -> Result<(Self::Window, MinSize), PlatformError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_fits_unchanged() {
        let title = AppTitle::new("Hello World");
        assert_eq!(title.as_str(), "Hello World");
    }

    #[test]
    fn title_truncates_to_capacity() {
        let long = "x".repeat(200);
        let title = AppTitle::new(&long);
        assert_eq!(title.len(), MAX_TITLE_LEN);
    }

    #[test]
    fn title_truncates_at_char_boundary() {
        // 3-byte characters, 81 bytes total; the cut must not split one.
        let long = "\u{20AC}".repeat(27);
        let title = AppTitle::new(&long);
        assert!(title.len() <= MAX_TITLE_LEN);
        assert_eq!(title.len() % 3, 0);
    }

    #[test]
    fn min_track_floor_bumps_height_by_one() {
        let min = min_track_floor(136, 39);
        assert_eq!(min.x, 136);
        assert_eq!(min.y, 40);
    }

    #[test]
    fn window_never_overlaps_console() {
        for width in [100, 320, 480, 640] {
            let layout = ConsoleLayout {
                width,
                ..ConsoleLayout::default()
            };
            assert!(layout.window_origin().0 >= width);
            assert_eq!(layout.window_origin().1, 0);
        }
    }

    #[test]
    fn default_layout_is_console_width_aligned() {
        let layout = ConsoleLayout::default();
        assert_eq!(layout.width, 640);
        assert_eq!(layout.outer_height(), 400);
        assert_eq!(layout.window_origin(), (640, 0));
    }
}
