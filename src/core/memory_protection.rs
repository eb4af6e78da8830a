//! Page locking for buffers that hold scalars, chain codes and HMAC output.
//!
//! `mlock`/`munlock` on Unix, `VirtualLock`/`VirtualUnlock` on Windows. Without the
//! `memlock` feature (or on other targets) both calls succeed without doing anything.

use std::io;

#[cfg(all(windows, feature = "memlock"))]
use winapi::shared::minwindef::LPVOID;
#[cfg(all(windows, feature = "memlock"))]
use winapi::um::memoryapi::{VirtualLock, VirtualUnlock};

/// Pin the pages backing `buf` in RAM so they are never written to swap.
#[cfg(all(unix, feature = "memlock"))]
pub fn lock_memory(buf: &[u8]) -> io::Result<()> {
    if buf.is_empty() {
        return Ok(());
    }
    // safety: `buf` is a live borrow, so the range is mapped for the duration of the call.
    let res = unsafe { libc::mlock(buf.as_ptr() as *const libc::c_void, buf.len() as libc::size_t) };
    if res != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Release a lock taken with [`lock_memory`].
#[cfg(all(unix, feature = "memlock"))]
pub fn unlock_memory(buf: &[u8]) -> io::Result<()> {
    if buf.is_empty() {
        return Ok(());
    }
    let res =
        unsafe { libc::munlock(buf.as_ptr() as *const libc::c_void, buf.len() as libc::size_t) };
    if res != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(all(windows, feature = "memlock"))]
pub fn lock_memory(buf: &[u8]) -> io::Result<()> {
    if buf.is_empty() {
        return Ok(());
    }
    let res = unsafe { VirtualLock(buf.as_ptr() as LPVOID, buf.len()) };
    if res == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(all(windows, feature = "memlock"))]
pub fn unlock_memory(buf: &[u8]) -> io::Result<()> {
    if buf.is_empty() {
        return Ok(());
    }
    let res = unsafe { VirtualUnlock(buf.as_ptr() as LPVOID, buf.len()) };
    if res == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(all(any(unix, windows), feature = "memlock")))]
pub fn lock_memory(_buf: &[u8]) -> io::Result<()> {
    Ok(())
}

#[cfg(not(all(any(unix, windows), feature = "memlock")))]
pub fn unlock_memory(_buf: &[u8]) -> io::Result<()> {
    Ok(())
}
