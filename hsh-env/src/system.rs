// This file is part of hsh, a POSIX-style command shell.
// Copyright (C) 2024 the hsh authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! System call interface
//!
//! Thin wrappers over the raw interfaces so the rest of the interpreter
//! deals in [`Errno`] results and [`FdHandle`]s instead of raw return
//! codes. Descriptor plumbing and process control go through the safe
//! `nix` wrappers; only `open` (which passes a raw flag set through
//! verbatim), `_exit`, and the passwd-database lookups drop to `libc`.

pub mod fd;
pub mod signal;

pub use fd::FdHandle;

use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid as nix_waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};
use std::ffi::CString;
use std::os::unix::io::RawFd;

/// Result type for system calls
pub type Result<T> = std::result::Result<T, Errno>;

/// Creates a pipe; returns the (read, write) ends as owning handles.
pub fn pipe() -> Result<(FdHandle, FdHandle)> {
    let (read_end, write_end) = unistd::pipe()?;
    Ok((FdHandle::owned(read_end), FdHandle::owned(write_end)))
}

/// Duplicates a descriptor onto `to`, closing what was there.
pub fn dup2(from: RawFd, to: RawFd) -> Result<()> {
    loop {
        match unistd::dup2(from, to) {
            Ok(_) => return Ok(()),
            Err(Errno::EINTR) => (),
            Err(errno) => return Err(errno),
        }
    }
}

/// Duplicates a descriptor to the lowest free number.
pub fn dup(fd: RawFd) -> Result<FdHandle> {
    let new = unistd::dup(fd)?;
    Ok(FdHandle::owned(new))
}

/// Closes a raw descriptor, ignoring errors.
pub fn close(fd: RawFd) {
    loop {
        match unistd::close(fd) {
            Err(Errno::EINTR) => (),
            _ => return,
        }
    }
}

/// Opens a file with the given flags and creation mode.
pub fn open(path: &str, flags: libc::c_int, mode: libc::mode_t) -> Result<FdHandle> {
    let path = CString::new(path).map_err(|_| Errno::EINVAL)?;
    let fd = Errno::result(unsafe { libc::open(path.as_ptr(), flags, mode as libc::c_uint) })?;
    Ok(FdHandle::owned(fd))
}

/// Forks the process.
///
/// # Safety
///
/// In the child, only async-signal-safe operations may precede `exec` or
/// `_exit` when the process has multiple threads. This interpreter is
/// single-threaded.
pub fn fork() -> Result<ForkResult> {
    unsafe { unistd::fork() }
}

/// Terminates the process immediately without running destructors.
///
/// For use in forked children where unwinding into the parent's state
/// would be wrong.
pub fn exit_process(status: i32) -> ! {
    unsafe { libc::_exit(status) }
}

/// Replaces the process image, searching `$PATH`.
///
/// Returns only on failure. The arguments are pre-converted so a forked
/// child does not have to allocate between `fork` and `exec`.
pub fn execvp(args: &[CString]) -> Errno {
    if args.is_empty() {
        return Errno::EINVAL;
    }
    match unistd::execvp(&args[0], args) {
        Ok(infallible) => match infallible {},
        Err(errno) => errno,
    }
}

/// Waits for a child, blocking.
pub fn wait_for(pid: Pid) -> Result<WaitStatus> {
    nix_waitpid(pid, None)
}

/// Waits for a child, blocking, reporting stops as well.
pub fn wait_for_untraced(pid: Pid) -> Result<WaitStatus> {
    nix_waitpid(pid, Some(WaitPidFlag::WUNTRACED))
}

/// Polls any child without blocking.
pub fn wait_any_nohang() -> Result<WaitStatus> {
    nix_waitpid(
        Pid::from_raw(-1),
        Some(WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED),
    )
}

/// Sends a signal to a process.
pub fn kill(pid: Pid, signal: Signal) -> Result<()> {
    nix::sys::signal::kill(pid, signal)
}

/// Sends a signal to a process group.
pub fn kill_group(pgid: Pid, signal: Signal) -> Result<()> {
    nix::sys::signal::kill(Pid::from_raw(-pgid.as_raw()), signal)
}

/// Returns this process's ID.
pub fn getpid() -> Pid {
    unistd::getpid()
}

/// Puts a process into a process group.
pub fn setpgid(pid: Pid, pgid: Pid) -> Result<()> {
    unistd::setpgid(pid, pgid)
}

/// Returns the current working directory.
pub fn getcwd() -> Result<String> {
    let path = unistd::getcwd()?;
    Ok(path.to_string_lossy().into_owned())
}

/// Changes the current working directory.
pub fn chdir(path: &str) -> Result<()> {
    unistd::chdir(path)
}

/// Home directory of the current user, from `$HOME` or the passwd
/// database.
pub fn current_user_home() -> Option<String> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Some(home);
        }
    }
    home_for_uid(unsafe { libc::getuid() })
}

fn home_for_uid(uid: libc::uid_t) -> Option<String> {
    // getpwuid is not reentrant but the interpreter is single-threaded.
    let entry = unsafe { libc::getpwuid(uid) };
    passwd_dir(entry)
}

/// Home directory of the named user, from the passwd database.
pub fn home_for_user(user: &str) -> Option<String> {
    let name = CString::new(user).ok()?;
    let entry = unsafe { libc::getpwnam(name.as_ptr()) };
    passwd_dir(entry)
}

fn passwd_dir(entry: *mut libc::passwd) -> Option<String> {
    if entry.is_null() {
        return None;
    }
    let dir = unsafe { (*entry).pw_dir };
    if dir.is_null() {
        return None;
    }
    let dir = unsafe { std::ffi::CStr::from_ptr(dir) };
    Some(dir.to_string_lossy().into_owned())
}

/// Path of this executable, from `/proc/self/exe`.
pub fn executable_path() -> Option<String> {
    std::fs::read_link("/proc/self/exe")
        .ok()
        .map(|p| p.to_string_lossy().into_owned())
}

/// Reads everything from a descriptor until end of file.
pub fn read_to_end(fd: &FdHandle) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut buffer = [0u8; 4096];
    loop {
        let count = match unistd::read(fd.raw(), &mut buffer) {
            Ok(count) => count,
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(errno),
        };
        if count == 0 {
            return Ok(result);
        }
        result.extend_from_slice(&buffer[..count]);
    }
}

/// Writes a whole buffer to a descriptor.
pub fn write_all(fd: RawFd, mut data: &[u8]) -> Result<()> {
    while !data.is_empty() {
        match unistd::write(fd, data) {
            Ok(count) => data = &data[count..],
            Err(Errno::EINTR) => (),
            Err(errno) => return Err(errno),
        }
    }
    Ok(())
}
