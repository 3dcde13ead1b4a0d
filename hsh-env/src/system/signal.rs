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

//! Signal disposition and delivery flags
//!
//! Handlers are restricted to async-signal-safe work: they set atomic
//! flags and forward terminal-generated signals to the foreground
//! process group. The interpreter polls the flags from its main loop.

use nix::errno::Errno;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

static SIGCHLD_RECEIVED: AtomicBool = AtomicBool::new(false);
static SIGINT_RECEIVED: AtomicBool = AtomicBool::new(false);
static SIGTSTP_RECEIVED: AtomicBool = AtomicBool::new(false);
static FOREGROUND_PGID: AtomicI32 = AtomicI32::new(0);

fn forward_to_foreground(signal: libc::c_int) {
    let pgid = FOREGROUND_PGID.load(Ordering::Relaxed);
    if pgid > 0 {
        unsafe {
            libc::kill(-pgid, signal);
        }
    }
}

extern "C" fn on_sigchld(_: libc::c_int) {
    SIGCHLD_RECEIVED.store(true, Ordering::Relaxed);
}

extern "C" fn on_sigint(signal: libc::c_int) {
    SIGINT_RECEIVED.store(true, Ordering::Relaxed);
    forward_to_foreground(signal);
}

extern "C" fn on_sigtstp(signal: libc::c_int) {
    SIGTSTP_RECEIVED.store(true, Ordering::Relaxed);
    forward_to_foreground(signal);
}

/// Installs the interpreter's signal handlers.
pub fn install_handlers() -> Result<(), Errno> {
    let set = SigSet::empty();
    unsafe {
        sigaction(
            Signal::SIGCHLD,
            &SigAction::new(SigHandler::Handler(on_sigchld), SaFlags::SA_RESTART, set),
        )?;
        sigaction(
            Signal::SIGINT,
            &SigAction::new(SigHandler::Handler(on_sigint), SaFlags::empty(), set),
        )?;
        sigaction(
            Signal::SIGTSTP,
            &SigAction::new(SigHandler::Handler(on_sigtstp), SaFlags::SA_RESTART, set),
        )?;
    }
    Ok(())
}

/// Restores default dispositions, for freshly forked children.
pub fn restore_defaults() {
    let set = SigSet::empty();
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), set);
    unsafe {
        let _ = sigaction(Signal::SIGCHLD, &default);
        let _ = sigaction(Signal::SIGINT, &default);
        let _ = sigaction(Signal::SIGTSTP, &default);
    }
}

/// Records the process group that terminal signals are forwarded to.
pub fn set_foreground_pgid(pgid: nix::unistd::Pid) {
    FOREGROUND_PGID.store(pgid.as_raw(), Ordering::Relaxed);
}

/// Stops forwarding terminal signals.
pub fn clear_foreground_pgid() {
    FOREGROUND_PGID.store(0, Ordering::Relaxed);
}

/// Returns and clears the SIGCHLD-received flag.
pub fn take_sigchld() -> bool {
    SIGCHLD_RECEIVED.swap(false, Ordering::Relaxed)
}

/// Returns and clears the SIGINT-received flag.
pub fn take_sigint() -> bool {
    SIGINT_RECEIVED.swap(false, Ordering::Relaxed)
}

/// Returns and clears the SIGTSTP-received flag.
pub fn take_sigtstp() -> bool {
    SIGTSTP_RECEIVED.swap(false, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_start_clear_and_reset_on_take() {
        // The flags are process-global; exercise the swap semantics.
        SIGCHLD_RECEIVED.store(true, Ordering::Relaxed);
        assert!(take_sigchld());
        assert!(!take_sigchld());

        SIGINT_RECEIVED.store(true, Ordering::Relaxed);
        assert!(take_sigint());
        assert!(!take_sigint());

        SIGTSTP_RECEIVED.store(true, Ordering::Relaxed);
        assert!(take_sigtstp());
        assert!(!take_sigtstp());
    }

    #[test]
    fn foreground_pgid_round_trip() {
        set_foreground_pgid(nix::unistd::Pid::from_raw(1234));
        assert_eq!(FOREGROUND_PGID.load(Ordering::Relaxed), 1234);
        clear_foreground_pgid();
        assert_eq!(FOREGROUND_PGID.load(Ordering::Relaxed), 0);
    }
}
