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

//! Owning and borrowed file descriptor handles
//!
//! An [`FdHandle`] closes its descriptor on drop only when it owns it.
//! Borrowed handles refer to a descriptor owned elsewhere (typically the
//! peer end of a pipe) so aliased descriptors are never double-closed.

use std::os::unix::io::RawFd;

/// File descriptor handle with an owning flag
#[derive(Debug)]
pub struct FdHandle {
    fd: RawFd,
    owning: bool,
}

impl FdHandle {
    /// Wraps a descriptor that this handle is responsible for closing.
    pub fn owned(fd: RawFd) -> FdHandle {
        FdHandle { fd, owning: true }
    }

    /// Wraps a descriptor owned elsewhere; dropping the handle leaves it
    /// open.
    pub fn borrowed(fd: RawFd) -> FdHandle {
        FdHandle { fd, owning: false }
    }

    /// Returns the raw descriptor.
    pub fn raw(&self) -> RawFd {
        self.fd
    }

    /// Tests whether this handle closes the descriptor on drop.
    pub fn is_owning(&self) -> bool {
        self.owning
    }

    /// Gives up ownership and returns the raw descriptor without closing
    /// it.
    pub fn release(mut self) -> RawFd {
        self.owning = false;
        self.fd
    }

    /// Closes the descriptor now (if owning).
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for FdHandle {
    fn drop(&mut self) {
        if self.owning && self.fd >= 0 {
            let _ = nix::unistd::close(self.fd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fd_is_open(fd: RawFd) -> bool {
        nix::fcntl::fcntl(fd, nix::fcntl::FcntlArg::F_GETFD).is_ok()
    }

    fn make_pipe() -> (RawFd, RawFd) {
        nix::unistd::pipe().unwrap()
    }

    #[test]
    fn owned_handle_closes_on_drop() {
        let (read, write) = make_pipe();
        {
            let _handle = FdHandle::owned(read);
            assert!(fd_is_open(read));
        }
        assert!(!fd_is_open(read));
        FdHandle::owned(write).close();
        assert!(!fd_is_open(write));
    }

    #[test]
    fn borrowed_handle_leaves_fd_open() {
        let (read, write) = make_pipe();
        {
            let _handle = FdHandle::borrowed(read);
        }
        assert!(fd_is_open(read));
        FdHandle::owned(read).close();
        FdHandle::owned(write).close();
    }

    #[test]
    fn release_transfers_ownership() {
        let (read, write) = make_pipe();
        let handle = FdHandle::owned(read);
        let raw = handle.release();
        assert_eq!(raw, read);
        assert!(fd_is_open(read));
        FdHandle::owned(read).close();
        FdHandle::owned(write).close();
    }
}
