// launcher.rs
// Copyright 2024 Matti Hänninen
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License. You may obtain a copy of
// the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the
// License for the specific language governing permissions and limitations under
// the License.

//! Starting the foreign processes: local hook scripts and the ssh client.

use std::{
  ffi::OsString,
  io,
  process::{Command, ExitStatus, Stdio},
};

#[cfg(unix)]
use std::sync::{Mutex, PoisonError};

#[cfg(unix)]
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::error::Error;

pub const SSH_PROGRAM: &str = "ssh";

#[cfg(not(windows))]
const SHELL_PROGRAM: &str = "sh";
#[cfg(windows)]
const SHELL_PROGRAM: &str = "cmd";

/// Runs processes on behalf of a session.
///
/// Both operations inherit the terminal and return the exit status of the
/// process once it has terminated.  An interrupt from the terminal goes to
/// the child only; the caller keeps running and gets the child's status.
pub trait Launcher {
  fn run_local_script(&mut self, script: &str) -> Result<i32, Error>;

  /// Runs the ssh client with the given arguments.
  fn run_ssh(&mut self, args: &[OsString]) -> Result<i32, Error>;
}

#[derive(Debug, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
  fn run_local_script(&mut self, script: &str) -> Result<i32, Error> {
    run_inheriting(shell_command(script), SHELL_PROGRAM)
  }

  fn run_ssh(&mut self, args: &[OsString]) -> Result<i32, Error> {
    let mut command = Command::new(SSH_PROGRAM);
    command.args(args);
    run_inheriting(command, SSH_PROGRAM)
  }
}

fn run_inheriting(mut command: Command, program: &str) -> Result<i32, Error> {
  let _interrupts = InterruptGuard::install();
  let status = command
    .stdin(Stdio::inherit())
    .stdout(Stdio::inherit())
    .stderr(Stdio::inherit())
    .status()
    .map_err(|e| spawn_error(program, &e))?;
  Ok(exit_code(status))
}

/// Keeps SIGINT and SIGQUIT from terminating this process while it is
/// waiting for a child in the foreground.
///
/// The signals are caught with a handler that does nothing rather than
/// ignored, so that the child starts with the default dispositions.  Guards
/// nest; the last one to drop restores the previous actions.
#[derive(Debug)]
pub struct InterruptGuard {
  _private: (),
}

#[cfg(unix)]
static INTERRUPTS: Mutex<(usize, Vec<(Signal, SigAction)>)> =
  Mutex::new((0, Vec::new()));

#[cfg(unix)]
extern "C" fn swallow(_: nix::libc::c_int) {}

impl InterruptGuard {
  pub fn install() -> Self {
    #[cfg(unix)]
    {
      let mut state = INTERRUPTS.lock().unwrap_or_else(PoisonError::into_inner);
      if state.0 == 0 {
        let action = SigAction::new(
          SigHandler::Handler(swallow),
          SaFlags::SA_RESTART,
          SigSet::empty(),
        );
        for sig in [Signal::SIGINT, Signal::SIGQUIT] {
          // SAFETY: the handler does nothing and so is async-signal-safe.
          match unsafe { signal::sigaction(sig, &action) } {
            Ok(previous) => state.1.push((sig, previous)),
            Err(e) => tracing::debug!("cannot catch {}: {}", sig, e),
          }
        }
      }
      state.0 += 1;
    }
    Self { _private: () }
  }
}

impl Drop for InterruptGuard {
  fn drop(&mut self) {
    #[cfg(unix)]
    {
      let mut state = INTERRUPTS.lock().unwrap_or_else(PoisonError::into_inner);
      state.0 -= 1;
      if state.0 == 0 {
        for (sig, previous) in state.1.drain(..) {
          // SAFETY: reinstates the action that was in place before.
          let _ = unsafe { signal::sigaction(sig, &previous) };
        }
      }
    }
  }
}

/// A command running `script` with the platform shell.
pub fn shell_command(script: &str) -> Command {
  let mut command = Command::new(SHELL_PROGRAM);
  if cfg!(windows) {
    command.arg("/c");
  } else {
    command.arg("-c");
  }
  command.arg(script);
  command
}

/// The exit code the way a shell would report it: a process killed by a
/// signal exits with 128 plus the signal number.
pub fn exit_code(status: ExitStatus) -> i32 {
  if let Some(code) = status.code() {
    return code;
  }
  #[cfg(unix)]
  {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = status.signal() {
      return 128 + signal;
    }
  }
  1
}

/// The exit code a shell uses when it cannot start a program.
pub fn spawn_failure_code(e: &io::Error) -> i32 {
  match e.kind() {
    io::ErrorKind::NotFound => 127,
    io::ErrorKind::PermissionDenied => 126,
    _ => 1,
  }
}

fn spawn_error(program: &str, e: &io::Error) -> Error {
  Error::CannotSpawn {
    program: program.into(),
    reason: e.to_string(),
    code: spawn_failure_code(e),
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn spawn_failure_codes() {
    let code = |kind| spawn_failure_code(&io::Error::from(kind));
    assert_eq!(code(io::ErrorKind::NotFound), 127);
    assert_eq!(code(io::ErrorKind::PermissionDenied), 126);
    assert_eq!(code(io::ErrorKind::Other), 1);
  }

  #[test]
  fn spawn_error_carries_exit_code() {
    let err = spawn_error("ssh", &io::Error::from(io::ErrorKind::NotFound));
    assert_eq!(err.exit_code(), 127);
    assert!(err.to_string().starts_with("cannot run ssh: "));
  }

  #[cfg(unix)]
  #[test]
  fn exit_codes_of_real_processes() {
    let status = |script| shell_command(script).status().unwrap();
    assert_eq!(exit_code(status("exit 0")), 0);
    assert_eq!(exit_code(status("exit 3")), 3);
    assert_eq!(exit_code(status("kill -9 $$")), 128 + 9);
  }

  #[cfg(unix)]
  #[test]
  fn interrupts_go_to_the_child_only() {
    // The script signals its parent, i.e. this test process.
    let mut launcher = SystemLauncher;
    let code = launcher
      .run_local_script("kill -INT $PPID; kill -QUIT $PPID; sleep 0.2; exit 7")
      .unwrap();
    assert_eq!(code, 7);
  }

  #[cfg(unix)]
  #[test]
  fn nested_guards_keep_catching() {
    let outer = InterruptGuard::install();
    drop(InterruptGuard::install());
    assert!(INTERRUPTS.lock().unwrap().0 > 0);
    let code = shell_command("kill -INT $PPID; sleep 0.2; exit 4")
      .status()
      .map(exit_code)
      .unwrap();
    assert_eq!(code, 4);
    drop(outer);
  }

  #[cfg(unix)]
  #[test]
  fn local_script_exit_status() {
    let mut launcher = SystemLauncher;
    assert_eq!(launcher.run_local_script("true").unwrap(), 0);
    assert_eq!(launcher.run_local_script("exit 5").unwrap(), 5);
  }
}
