//! Win32 surface provider
//!
//! Console attachment and window creation through the raw Win32 API.
//! The window class is bound to a message handler supplied by the
//! application, and the window is placed immediately to the right of
//! the console's fixed-width region.

use std::iter::once;

use raw_window_handle::{
    HasRawDisplayHandle, HasRawWindowHandle, RawDisplayHandle, RawWindowHandle, Win32WindowHandle,
    WindowsDisplayHandle,
};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{GENERIC_READ, GENERIC_WRITE, HANDLE, HMODULE, HWND, RECT};
use windows::Win32::Graphics::Gdi::{GetStockObject, HBRUSH, WHITE_BRUSH};
use windows::Win32::Storage::FileSystem::{
    CreateFileW, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows::Win32::System::Console::{
    AllocConsole, FreeConsole, GetConsoleWindow, SetConsoleTitleW, SetStdHandle, STD_ERROR_HANDLE,
    STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRect, CreateWindowExW, DestroyWindow, GetSystemMetrics, LoadCursorW, LoadIconW,
    MoveWindow, RegisterClassExW, CS_HREDRAW, CS_VREDRAW, IDC_ARROW, IDI_APPLICATION, IDI_WINLOGO,
    SM_CXMINTRACK, SM_CYMINTRACK, WINDOW_EX_STYLE, WNDCLASSEXW, WNDPROC, WS_OVERLAPPEDWINDOW,
    WS_SYSMENU, WS_VISIBLE,
};

use super::{min_track_floor, AppTitle, ConsoleLayout, MinSize, PlatformError, SurfaceProvider};

/// Attached diagnostic console.
///
/// The process standard streams are routed at the console for its
/// lifetime; dropping the handle releases the attachment.
pub struct Win32Console {
    hwnd: HWND,
}

impl Win32Console {
    /// The console window, if the session has one.
    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }
}

impl Drop for Win32Console {
    fn drop(&mut self) {
        unsafe {
            let _ = FreeConsole();
        }
    }
}

/// Native window created by [`Win32SurfaceProvider`].
pub struct Win32Window {
    hwnd: HWND,
    hinstance: HMODULE,
}

impl Win32Window {
    /// The underlying window handle.
    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }
}

impl Drop for Win32Window {
    fn drop(&mut self) {
        // Already-destroyed windows (normal shutdown through WM_DESTROY)
        // make this a no-op error.
        unsafe {
            let _ = DestroyWindow(self.hwnd);
        }
    }
}

unsafe impl HasRawWindowHandle for Win32Window {
    fn raw_window_handle(&self) -> RawWindowHandle {
        let mut handle = Win32WindowHandle::empty();
        handle.hwnd = self.hwnd.0 as *mut _;
        handle.hinstance = self.hinstance.0 as *mut _;
        RawWindowHandle::Win32(handle)
    }
}

unsafe impl HasRawDisplayHandle for Win32Window {
    fn raw_display_handle(&self) -> RawDisplayHandle {
        RawDisplayHandle::Windows(WindowsDisplayHandle::empty())
    }
}

/// Win32 implementation of the surface provider.
pub struct Win32SurfaceProvider {
    wndproc: WNDPROC,
    layout: ConsoleLayout,
}

impl Win32SurfaceProvider {
    /// Build a provider whose window class dispatches to the given
    /// message handler.
    pub fn new(wndproc: WNDPROC, layout: ConsoleLayout) -> Self {
        Self { wndproc, layout }
    }
}

impl SurfaceProvider for Win32SurfaceProvider {
    type Console = Win32Console;
    type Window = Win32Window;

    fn create_console(&mut self, title: &AppTitle) -> Result<Win32Console, PlatformError> {
        unsafe {
            AllocConsole().map_err(|e| PlatformError::ConsoleAttachFailed(e.to_string()))?;

            // Route the process standard streams at the new console so
            // print/eprint and the logger land somewhere visible.
            let conin = open_console_device(w!("CONIN$"))?;
            let conout = open_console_device(w!("CONOUT$"))?;
            SetStdHandle(STD_INPUT_HANDLE, conin)
                .map_err(|e| PlatformError::ConsoleAttachFailed(e.to_string()))?;
            SetStdHandle(STD_OUTPUT_HANDLE, conout)
                .map_err(|e| PlatformError::ConsoleAttachFailed(e.to_string()))?;
            SetStdHandle(STD_ERROR_HANDLE, conout)
                .map_err(|e| PlatformError::ConsoleAttachFailed(e.to_string()))?;

            let wide_title = to_wide(title.as_str());
            SetConsoleTitleW(PCWSTR(wide_title.as_ptr()))
                .map_err(|e| PlatformError::ConsoleAttachFailed(e.to_string()))?;

            // Placement is cosmetic; a console that refuses to move is
            // still a working console.
            let hwnd = GetConsoleWindow();
            if hwnd != HWND::default() {
                let _ = MoveWindow(
                    hwnd,
                    0,
                    0,
                    self.layout.width,
                    self.layout.outer_height(),
                    true,
                );
            }

            Ok(Win32Console { hwnd })
        }
    }

    fn create_window(
        &mut self,
        title: &AppTitle,
        width: u32,
        height: u32,
    ) -> Result<(Win32Window, MinSize), PlatformError> {
        let class_name = to_wide(title.as_str());

        unsafe {
            let instance = GetModuleHandleW(None)
                .map_err(|e| PlatformError::ClassRegistrationFailed(e.to_string()))?;

            let wc = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: self.wndproc,
                hInstance: instance.into(),
                hIcon: LoadIconW(None, IDI_APPLICATION).unwrap_or_default(),
                hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
                hbrBackground: HBRUSH(GetStockObject(WHITE_BRUSH).0),
                lpszClassName: PCWSTR(class_name.as_ptr()),
                hIconSm: LoadIconW(None, IDI_WINLOGO).unwrap_or_default(),
                ..Default::default()
            };

            if RegisterClassExW(&wc) == 0 {
                return Err(PlatformError::ClassRegistrationFailed(
                    windows::core::Error::from_win32().to_string(),
                ));
            }

            // The requested size is the client area; grow the outer
            // rectangle to make room for the chrome.
            let mut rect = RECT {
                left: 0,
                top: 0,
                right: width as i32,
                bottom: height as i32,
            };
            AdjustWindowRect(&mut rect, WS_OVERLAPPEDWINDOW, false)
                .map_err(|e| PlatformError::WindowCreationFailed(e.to_string()))?;

            let (x, y) = self.layout.window_origin();
            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                PCWSTR(class_name.as_ptr()),
                PCWSTR(class_name.as_ptr()),
                WS_OVERLAPPEDWINDOW | WS_VISIBLE | WS_SYSMENU,
                x,
                y,
                rect.right - rect.left,
                rect.bottom - rect.top,
                None, // no parent window
                None, // no menu
                instance,
                None,
            )
            .map_err(|e| PlatformError::WindowCreationFailed(e.to_string()))?;

            if hwnd == HWND::default() {
                return Err(PlatformError::WindowCreationFailed(
                    "CreateWindowExW returned a null handle".to_string(),
                ));
            }

            let min_size = min_track_floor(
                GetSystemMetrics(SM_CXMINTRACK),
                GetSystemMetrics(SM_CYMINTRACK),
            );

            Ok((Win32Window { hwnd, hinstance: instance }, min_size))
        }
    }
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(once(0)).collect()
}

unsafe fn open_console_device(name: PCWSTR) -> Result<HANDLE, PlatformError> {
    CreateFileW(
        name,
        (GENERIC_READ | GENERIC_WRITE).0,
        FILE_SHARE_READ | FILE_SHARE_WRITE,
        None,
        OPEN_EXISTING,
        FILE_ATTRIBUTE_NORMAL,
        None,
    )
    .map_err(|e| PlatformError::ConsoleAttachFailed(e.to_string()))
}
