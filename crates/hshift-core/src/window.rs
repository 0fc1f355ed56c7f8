//! Game window lookup and foreground management.
//!
//! The verifier needs the game un-minimized while sampling: a minimized 3D
//! engine may pause its simulation ticks, and paused memory would be
//! misclassified as static.

#[cfg(not(target_os = "windows"))]
use crate::error::Result;
#[cfg(not(target_os = "windows"))]
use crate::scan::GameWindow;

#[cfg(target_os = "windows")]
pub use platform::{WindowHandle, find_window_by_pid};

#[cfg(target_os = "windows")]
mod platform {
    use windows::Win32::Foundation::{HWND, LPARAM};
    use windows::Win32::UI::WindowsAndMessaging::{
        EnumWindows, GetWindowThreadProcessId, IsIconic, IsWindowVisible, SW_RESTORE,
        SetForegroundWindow, ShowWindow,
    };

    use crate::error::{Error, Result};
    use crate::scan::GameWindow;

    /// Top-level window owned by the target process.
    pub struct WindowHandle {
        hwnd: HWND,
    }

    impl GameWindow for WindowHandle {
        fn is_minimized(&self) -> bool {
            // SAFETY: IsIconic is safe to call with any HWND.
            unsafe { IsIconic(self.hwnd).as_bool() }
        }

        fn restore(&self) {
            // SAFETY: restoring and foregrounding a valid HWND; both calls
            // may fail silently without permission, which is harmless here.
            unsafe {
                let _ = ShowWindow(self.hwnd, SW_RESTORE);
                let _ = SetForegroundWindow(self.hwnd);
            }
        }
    }

    thread_local! {
        static FOUND_HWND: std::cell::Cell<Option<HWND>> = const { std::cell::Cell::new(None) };
    }

    unsafe extern "system" fn enum_callback(
        hwnd: HWND,
        lparam: LPARAM,
    ) -> windows::Win32::Foundation::BOOL {
        use windows::Win32::Foundation::BOOL;

        let target_pid = unsafe { *(lparam.0 as *const u32) };
        let mut window_pid = 0u32;
        unsafe { GetWindowThreadProcessId(hwnd, Some(&mut window_pid)) };

        if window_pid == target_pid && unsafe { IsWindowVisible(hwnd) }.as_bool() {
            FOUND_HWND.with(|cell| cell.set(Some(hwnd)));
            return BOOL(0); // Stop enumeration
        }
        BOOL(1) // Continue enumeration
    }

    /// Find the first visible top-level window owned by `pid`.
    pub fn find_window_by_pid(pid: u32) -> Result<WindowHandle> {
        FOUND_HWND.with(|cell| cell.set(None));

        // SAFETY: EnumWindows calls the callback for each top-level window;
        // the pid is passed through the LPARAM and outlives the call.
        unsafe {
            let _ = EnumWindows(Some(enum_callback), LPARAM(&pid as *const u32 as isize));
        }

        FOUND_HWND
            .with(|cell| cell.take())
            .map(|hwnd| WindowHandle { hwnd })
            .ok_or(Error::WindowNotFound(pid))
    }
}

// --- Non-Windows stubs ---

#[cfg(not(target_os = "windows"))]
pub struct WindowHandle;

#[cfg(not(target_os = "windows"))]
impl GameWindow for WindowHandle {
    fn is_minimized(&self) -> bool {
        false
    }

    fn restore(&self) {}
}

#[cfg(not(target_os = "windows"))]
pub fn find_window_by_pid(pid: u32) -> Result<WindowHandle> {
    Err(crate::error::Error::WindowNotFound(pid))
}
