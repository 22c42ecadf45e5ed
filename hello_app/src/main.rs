//! Hello World bootstrap demo
//!
//! Attaches the diagnostic console, creates the application window next
//! to it, runs the Vulkan bootstrap, then pumps window messages until
//! the window closes. Resizes re-enter the sequencer so only the
//! swapchain is rebuilt.

#[cfg(windows)]
mod app {
    use std::process::exit;

    use vk_shell::core::config::AppConfig;
    use vk_shell::foundation::logging;
    use vk_shell::lifecycle::{Lifecycle, FATAL_EXIT_CODE};
    use vk_shell::platform::win32::Win32SurfaceProvider;
    use vk_shell::platform::ConsoleLayout;
    use vk_shell::render::VulkanRenderer;

    use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
    use windows::Win32::Graphics::Gdi::ValidateRect;
    use windows::Win32::UI::WindowsAndMessaging::{
        DefWindowProcW, DispatchMessageW, GetMessageW, GetWindowLongPtrW, PostQuitMessage,
        SetWindowLongPtrW, TranslateMessage, GWLP_USERDATA, MINMAXINFO, MSG, WM_DESTROY,
        WM_GETMINMAXINFO, WM_PAINT, WM_SIZE,
    };

    /// Everything the window procedure needs to reach.
    struct HelloApp {
        lifecycle: Lifecycle<Win32SurfaceProvider>,
        renderer: VulkanRenderer,
    }

    impl HelloApp {
        fn on_resize(&mut self, width: u32, height: u32) {
            self.lifecycle.handle_resize(width, height);
            if let Err(err) = self.lifecycle.prepare(&mut self.renderer) {
                // Losing the swapchain mid-session is as fatal as losing
                // it at startup.
                log::error!("{err}");
                eprintln!("{}", err.user_message());
                exit(FATAL_EXIT_CODE);
            }
        }
    }

    fn app_from_hwnd(hwnd: HWND) -> Option<&'static mut HelloApp> {
        let ptr = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut HelloApp;
        if ptr.is_null() {
            None
        } else {
            Some(unsafe { &mut *ptr })
        }
    }

    extern "system" fn wndproc(
        hwnd: HWND,
        message: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match message {
            WM_PAINT => {
                let _ = unsafe { ValidateRect(hwnd, None) };
                LRESULT(0)
            }

            WM_SIZE => {
                if let Some(app) = app_from_hwnd(hwnd) {
                    let width = (lparam.0 as usize & 0xffff) as u32;
                    let height = ((lparam.0 as usize >> 16) & 0xffff) as u32;
                    app.on_resize(width, height);
                }
                LRESULT(0)
            }

            WM_GETMINMAXINFO => {
                if let Some(app) = app_from_hwnd(hwnd) {
                    if let Some(min) = app.lifecycle.state().min_size() {
                        let info = unsafe { &mut *(lparam.0 as *mut MINMAXINFO) };
                        info.ptMinTrackSize.x = min.x;
                        info.ptMinTrackSize.y = min.y;
                    }
                }
                LRESULT(0)
            }

            WM_DESTROY => {
                unsafe { PostQuitMessage(0) };
                LRESULT(0)
            }

            _ => unsafe { DefWindowProcW(hwnd, message, wparam, lparam) },
        }
    }

    pub fn run() -> i32 {
        let config = AppConfig::default();
        logging::init(&config.log_level);

        if let Err(err) = config.validate() {
            log::error!("invalid configuration: {err}");
            return FATAL_EXIT_CODE;
        }

        log::info!("starting hello_world bootstrap");

        let provider = Win32SurfaceProvider::new(Some(wndproc), ConsoleLayout::default());
        let mut app = Box::new(HelloApp {
            lifecycle: Lifecycle::new(config, provider),
            renderer: VulkanRenderer::new(),
        });

        if let Err(err) = app.lifecycle.prepare(&mut app.renderer) {
            log::error!("{err}");
            eprintln!("{}", err.user_message());
            return FATAL_EXIT_CODE;
        }

        // The window procedure needs the app for resize handling;
        // install the pointer only once the bootstrap has fully
        // succeeded so early messages fall through to the default
        // handler.
        let hwnd = app.lifecycle.state().window().map(|w| w.hwnd());
        let app_ptr = Box::into_raw(app);
        if let Some(hwnd) = hwnd {
            unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, app_ptr as isize) };
        }

        let mut msg = MSG::default();
        while unsafe { GetMessageW(&mut msg, None, 0, 0) }.into() {
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        // Reclaim the app so the window, console, and Vulkan resources
        // drop in order.
        drop(unsafe { Box::from_raw(app_ptr) });

        log::info!("hello_world exiting");
        msg.wParam.0 as i32
    }
}

#[cfg(windows)]
fn main() {
    std::process::exit(app::run());
}

#[cfg(not(windows))]
fn main() {
    eprintln!("hello_world requires a Win32 display; nothing to run on this platform");
    std::process::exit(1);
}
