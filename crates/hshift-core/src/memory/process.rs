//! Target process discovery and scoped handle ownership.

use crate::error::Result;

/// Open handle to the target process. Closed on drop; a new scan session
/// after the game restarts must reacquire it.
#[cfg(target_os = "windows")]
pub struct ProcessHandle {
    handle: windows::Win32::Foundation::HANDLE,
    pid: u32,
}

#[cfg(target_os = "windows")]
impl ProcessHandle {
    /// Open with read/write/query access, the minimum the scanner and the
    /// gear channel need.
    pub fn open(pid: u32) -> Result<Self> {
        use windows::Win32::System::Threading::{
            OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_OPERATION, PROCESS_VM_READ,
            PROCESS_VM_WRITE,
        };

        // SAFETY: OpenProcess returns an owned handle on success; ownership
        // transfers to this struct and is released in Drop.
        let handle = unsafe {
            OpenProcess(
                PROCESS_VM_READ | PROCESS_VM_WRITE | PROCESS_VM_OPERATION
                    | PROCESS_QUERY_INFORMATION,
                false,
                pid,
            )
        }
        .map_err(|e| crate::error::Error::ProcessOpenFailed {
            pid,
            message: e.to_string(),
        })?;

        Ok(Self { handle, pid })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn raw(&self) -> windows::Win32::Foundation::HANDLE {
        self.handle
    }
}

#[cfg(target_os = "windows")]
impl Drop for ProcessHandle {
    fn drop(&mut self) {
        use windows::Win32::Foundation::CloseHandle;

        // SAFETY: the handle was opened by us and is closed exactly once.
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

/// Find a process ID by executable name (case-insensitive).
#[cfg(target_os = "windows")]
pub fn find_process_id(name: &str) -> Result<u32> {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
        TH32CS_SNAPPROCESS,
    };

    use crate::error::Error;

    // SAFETY: the snapshot handle is owned here and closed on every path.
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
        .map_err(|_| Error::ProcessNotFound(name.to_string()))?;

    let mut entry = PROCESSENTRY32W {
        dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    let mut found = None;
    // SAFETY: entry.dwSize is initialized as the API requires.
    if unsafe { Process32FirstW(snapshot, &mut entry) }.is_ok() {
        loop {
            let len = entry
                .szExeFile
                .iter()
                .position(|&c| c == 0)
                .unwrap_or(entry.szExeFile.len());
            let exe = String::from_utf16_lossy(&entry.szExeFile[..len]);

            if exe.eq_ignore_ascii_case(name) {
                found = Some(entry.th32ProcessID);
                break;
            }

            // SAFETY: same snapshot and entry as above.
            if unsafe { Process32NextW(snapshot, &mut entry) }.is_err() {
                break;
            }
        }
    }

    // SAFETY: closing the snapshot we created.
    unsafe {
        let _ = CloseHandle(snapshot);
    }

    found.ok_or_else(|| Error::ProcessNotFound(name.to_string()))
}

// --- Non-Windows stubs ---

#[cfg(not(target_os = "windows"))]
pub struct ProcessHandle {
    pid: u32,
}

#[cfg(not(target_os = "windows"))]
impl ProcessHandle {
    pub fn open(pid: u32) -> Result<Self> {
        let _ = pid;
        Err(crate::error::Error::ProcessOpenFailed {
            pid,
            message: "process access is only supported on Windows".to_string(),
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }
}

#[cfg(not(target_os = "windows"))]
pub fn find_process_id(name: &str) -> Result<u32> {
    Err(crate::error::Error::ProcessNotFound(name.to_string()))
}
