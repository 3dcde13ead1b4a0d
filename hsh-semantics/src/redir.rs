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

//! Redirection resolution and application
//!
//! A syntactic redirection resolves into the target fd and an
//! [`RedirAction`]: a file opened in the parent (owned by an RAII
//! handle until it is `dup2`'d into place), an fd duplication, or a
//! close. Applying in a forked child is destructive; applying around an
//! in-process builtin saves the original descriptors and restores them
//! on every exit path.
//!
//! Here-document redirections are accepted syntactically; their body is
//! not ingested, so the target fd reads from `/dev/null`.

use crate::expansion;
use hsh_env::system::{self, FdHandle};
use hsh_env::Env;
use hsh_syntax::syntax::{RedirKind, Redirection};
use nix::errno::Errno;
use std::os::unix::io::RawFd;
use thiserror::Error;

/// Error while resolving or applying a redirection
#[derive(Debug, Error)]
pub enum Error {
    #[error("{path}: {desc}", desc = .errno.desc())]
    Open { path: String, errno: Errno },

    #[error("{0}: not a valid file descriptor")]
    BadFdTarget(String),

    #[error("dup2: {}", .0.desc())]
    Dup(Errno),

    #[error(transparent)]
    Expansion(#[from] expansion::Error),
}

/// What to do to the target fd
#[derive(Debug)]
pub enum RedirAction {
    /// Duplicate this opened file onto the target fd.
    Open(FdHandle),
    /// Duplicate an existing fd onto the target fd.
    Dup(RawFd),
    /// Close the target fd.
    Close,
}

/// A redirection resolved against the filesystem
#[derive(Debug)]
pub struct ResolvedRedir {
    pub fd: RawFd,
    pub action: RedirAction,
}

/// Expands targets and opens files for a list of redirections.
pub fn resolve_all(env: &mut Env, redirections: &[Redirection]) -> Result<Vec<ResolvedRedir>, Error> {
    redirections
        .iter()
        .map(|redirection| resolve(env, redirection))
        .collect()
}

fn resolve(env: &mut Env, redirection: &Redirection) -> Result<ResolvedRedir, Error> {
    let fd = redirection.fd_or_default();
    let target = expansion::expand_single(env, &redirection.target)?;

    let action = match redirection.kind {
        RedirKind::Input => open(&target, libc::O_RDONLY)?,
        RedirKind::Output => open(&target, libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC)?,
        RedirKind::Append => open(&target, libc::O_WRONLY | libc::O_CREAT | libc::O_APPEND)?,
        RedirKind::InputOutput => open(&target, libc::O_RDWR | libc::O_CREAT)?,
        RedirKind::InputFd | RedirKind::OutputFd => {
            if target == "-" {
                RedirAction::Close
            } else {
                match target.parse() {
                    Ok(source) => RedirAction::Dup(source),
                    Err(_) => return Err(Error::BadFdTarget(target)),
                }
            }
        }
        // Body ingestion is deferred; the command reads an empty input.
        RedirKind::HereDoc | RedirKind::HereDocDash => open("/dev/null", libc::O_RDONLY)?,
    };

    Ok(ResolvedRedir { fd, action })
}

fn open(path: &str, flags: libc::c_int) -> Result<RedirAction, Error> {
    match system::open(path, flags, 0o666) {
        Ok(handle) => Ok(RedirAction::Open(handle)),
        Err(errno) => Err(Error::Open {
            path: path.to_string(),
            errno,
        }),
    }
}

/// Applies redirections destructively, for a forked child.
///
/// Each opened file is `dup2`'d onto its fd; the owning handle is
/// borrowed and stays with the caller.
pub fn apply(redirections: &[ResolvedRedir]) -> Result<(), Error> {
    for redirection in redirections {
        match &redirection.action {
            RedirAction::Open(handle) => {
                system::dup2(handle.raw(), redirection.fd).map_err(Error::Dup)?;
            }
            RedirAction::Dup(source) => {
                system::dup2(*source, redirection.fd).map_err(Error::Dup)?;
            }
            RedirAction::Close => system::close(redirection.fd),
        }
    }
    Ok(())
}

/// Saved state of one replaced descriptor
#[derive(Debug)]
pub struct SavedFd {
    fd: RawFd,
    /// Copy of the original descriptor, `None` if it was closed
    saved: Option<FdHandle>,
}

/// Applies redirections around an in-process builtin, saving the
/// original descriptors.
///
/// On failure the already-replaced descriptors are restored before the
/// error is returned.
pub fn apply_saving(redirections: &[ResolvedRedir]) -> Result<Vec<SavedFd>, Error> {
    let mut saved = Vec::new();
    for redirection in redirections {
        let original = system::dup(redirection.fd).ok();
        saved.push(SavedFd {
            fd: redirection.fd,
            saved: original,
        });
        let result = match &redirection.action {
            RedirAction::Open(handle) => system::dup2(handle.raw(), redirection.fd),
            RedirAction::Dup(source) => system::dup2(*source, redirection.fd),
            RedirAction::Close => {
                system::close(redirection.fd);
                Ok(())
            }
        };
        if let Err(errno) = result {
            restore(saved);
            return Err(Error::Dup(errno));
        }
    }
    Ok(saved)
}

/// Puts saved descriptors back, most recently replaced first.
pub fn restore(mut saved: Vec<SavedFd>) {
    while let Some(entry) = saved.pop() {
        match entry.saved {
            Some(handle) => {
                let _ = system::dup2(handle.raw(), entry.fd);
            }
            None => system::close(entry.fd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsh_syntax::syntax::Word;
    use std::io::Read;

    fn redirection(kind: RedirKind, fd: Option<i32>, target: &str) -> Redirection {
        Redirection {
            kind,
            fd,
            target: Word::literal(target),
        }
    }

    #[test]
    fn output_redirection_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut env = Env::new();
        let resolved = resolve_all(
            &mut env,
            &[redirection(RedirKind::Output, None, path.to_str().unwrap())],
        )
        .unwrap();
        assert_eq!(resolved[0].fd, 1);
        assert!(path.exists());
        drop(resolved);
    }

    #[test]
    fn append_vs_truncate_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log");
        std::fs::write(&path, "before\n").unwrap();
        let mut env = Env::new();

        // Append keeps contents.
        let resolved = resolve_all(
            &mut env,
            &[redirection(RedirKind::Append, None, path.to_str().unwrap())],
        )
        .unwrap();
        drop(resolved);
        let mut contents = String::new();
        std::fs::File::open(&path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "before\n");

        // Truncate empties it.
        let resolved = resolve_all(
            &mut env,
            &[redirection(RedirKind::Output, None, path.to_str().unwrap())],
        )
        .unwrap();
        drop(resolved);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn missing_input_file_is_an_error() {
        let mut env = Env::new();
        let error = resolve_all(
            &mut env,
            &[redirection(RedirKind::Input, None, "/no/such/file")],
        )
        .unwrap_err();
        assert!(matches!(error, Error::Open { .. }));
    }

    #[test]
    fn fd_duplication_targets() {
        let mut env = Env::new();
        let resolved = resolve_all(
            &mut env,
            &[redirection(RedirKind::OutputFd, Some(2), "1")],
        )
        .unwrap();
        assert_eq!(resolved[0].fd, 2);
        assert!(matches!(resolved[0].action, RedirAction::Dup(1)));

        let resolved = resolve_all(
            &mut env,
            &[redirection(RedirKind::InputFd, None, "-")],
        )
        .unwrap();
        assert!(matches!(resolved[0].action, RedirAction::Close));

        let error = resolve_all(
            &mut env,
            &[redirection(RedirKind::OutputFd, None, "xyz")],
        )
        .unwrap_err();
        assert!(matches!(error, Error::BadFdTarget(_)));
    }

    #[test]
    fn heredoc_reads_from_dev_null() {
        let mut env = Env::new();
        let resolved = resolve_all(
            &mut env,
            &[redirection(RedirKind::HereDoc, None, "EOF")],
        )
        .unwrap();
        assert_eq!(resolved[0].fd, 0);
        match &resolved[0].action {
            RedirAction::Open(handle) => {
                let contents = system::read_to_end(handle).unwrap();
                assert!(contents.is_empty());
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn expanded_targets() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = Env::new();
        env.variables
            .set("hsh_redir_dir", dir.path().to_str().unwrap());
        let resolved = resolve_all(
            &mut env,
            &[redirection(RedirKind::Output, None, "$hsh_redir_dir/x")],
        )
        .unwrap();
        drop(resolved);
        assert!(dir.path().join("x").exists());
        env.variables.unset("hsh_redir_dir");
    }

    #[test]
    fn apply_saving_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("captured");
        let mut env = Env::new();

        // Redirect fd 9 (surely unused) to a file, write, restore.
        let resolved = resolve_all(
            &mut env,
            &[redirection(RedirKind::Output, Some(9), path.to_str().unwrap())],
        )
        .unwrap();
        let saved = apply_saving(&resolved).unwrap();
        system::write_all(9, b"through fd 9").unwrap();
        restore(saved);
        drop(resolved);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "through fd 9");
    }
}
