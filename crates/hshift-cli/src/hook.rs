//! Low-level keyboard hook.
//!
//! The hook lives on its own thread because `WH_KEYBOARD_LL` callbacks are
//! delivered through the message loop of the installing thread. Keypresses
//! are translated to [`HookEvent`]s and forwarded over a channel; the
//! controller thread never touches any window machinery.

use std::cell::RefCell;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use hshift_core::Gear;
use tracing::{debug, warn};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::{VK_DELETE, VK_END, VK_INSERT};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, HC_ACTION, KBDLLHOOKSTRUCT, MSG,
    PostQuitMessage, PostThreadMessageW, SetWindowsHookExW, TranslateMessage,
    UnhookWindowsHookEx, WH_KEYBOARD_LL, WM_KEYDOWN, WM_QUIT, WM_SYSKEYDOWN,
};

use crate::config::KeyMap;

/// Events the hook thread emits toward the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    Shift(Gear),
    Rescan,
    ToggleDisplay,
    Quit,
}

struct HookShared {
    sender: Sender<HookEvent>,
    keymap: KeyMap,
}

thread_local! {
    // Only populated on the hook thread, which is also the only thread the
    // callback ever runs on.
    static HOOK_SHARED: RefCell<Option<HookShared>> = const { RefCell::new(None) };
}

fn dispatch_key(vk: u32) {
    HOOK_SHARED.with(|cell| {
        let shared = cell.borrow();
        let Some(shared) = shared.as_ref() else {
            return;
        };

        if vk == u32::from(VK_END.0) {
            debug!("end pressed, quitting");
            let _ = shared.sender.send(HookEvent::Quit);
            // SAFETY: no pointer arguments; posts WM_QUIT to this thread.
            unsafe { PostQuitMessage(0) };
            return;
        }

        if vk == u32::from(VK_DELETE.0) {
            debug!("delete pressed, requesting rescan");
            let _ = shared.sender.send(HookEvent::Rescan);
            return;
        }

        if vk == u32::from(VK_INSERT.0) {
            let _ = shared.sender.send(HookEvent::ToggleDisplay);
            return;
        }

        if let Some(gear) = shared.keymap.gear_for(vk) {
            let _ = shared.sender.send(HookEvent::Shift(gear));
        }
    });
}

unsafe extern "system" fn keyboard_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code == HC_ACTION as i32 {
        let message = wparam.0 as u32;
        if message == WM_KEYDOWN || message == WM_SYSKEYDOWN {
            // SAFETY: for HC_ACTION the lparam of a WH_KEYBOARD_LL callback
            // points at a valid KBDLLHOOKSTRUCT.
            let info = unsafe { &*(lparam.0 as *const KBDLLHOOKSTRUCT) };
            dispatch_key(info.vkCode);
        }
    }

    // SAFETY: forwards the unmodified arguments down the hook chain.
    unsafe { CallNextHookEx(None, code, wparam, lparam) }
}

/// Handle to the installed hook. Dropping it posts `WM_QUIT` to the hook
/// thread, which unhooks and exits.
pub struct KeyboardHook {
    thread: Option<JoinHandle<()>>,
    thread_id: u32,
}

impl KeyboardHook {
    pub fn install(keymap: KeyMap, sender: Sender<HookEvent>) -> Result<Self> {
        let (ready_tx, ready_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("keyboard-hook".to_string())
            .spawn(move || {
                // SAFETY: no preconditions.
                let thread_id = unsafe { GetCurrentThreadId() };

                HOOK_SHARED.with(|cell| {
                    *cell.borrow_mut() = Some(HookShared { sender, keymap });
                });

                // SAFETY: keyboard_proc stays valid for the lifetime of the
                // hook; WH_KEYBOARD_LL needs no module handle.
                let hook = match unsafe {
                    SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_proc), None, 0)
                } {
                    Ok(hook) => {
                        let _ = ready_tx.send(Ok(thread_id));
                        hook
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                let mut msg = MSG::default();
                // SAFETY: msg is a valid out-pointer for the message pump.
                while unsafe { GetMessageW(&mut msg, None, 0, 0) }.as_bool() {
                    // SAFETY: msg was filled in by GetMessageW.
                    unsafe {
                        let _ = TranslateMessage(&msg);
                        DispatchMessageW(&msg);
                    }
                }

                // SAFETY: hook is the handle installed above.
                if let Err(e) = unsafe { UnhookWindowsHookEx(hook) } {
                    warn!("failed to remove keyboard hook: {e}");
                }
            })
            .context("spawning keyboard hook thread")?;

        let thread_id = ready_rx
            .recv()
            .context("keyboard hook thread exited before reporting readiness")?
            .map_err(|e| anyhow!("installing keyboard hook: {e}"))?;

        Ok(Self {
            thread: Some(thread),
            thread_id,
        })
    }
}

impl Drop for KeyboardHook {
    fn drop(&mut self) {
        // SAFETY: no pointer arguments; a stale thread id only makes the
        // post fail, which is ignored.
        unsafe {
            let _ = PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
