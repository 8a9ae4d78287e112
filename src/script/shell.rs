// script/shell.rs
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

//! The `xs.shell` module.
//!
//! ```lua
//! local r = require("xs.shell").run("git rev-parse HEAD")
//! if r:success() then print(r:stdout()) end
//! ```

use std::{
  io::{self, Read},
  process::Stdio,
  sync::Mutex,
  thread,
};

use mlua::{Lua, Table, UserData, UserDataMethods};

use crate::launcher;

#[derive(Debug, Default)]
pub struct CommandResult {
  stdout: Vec<u8>,
  stderr: Vec<u8>,
  // Both streams in the order the chunks arrived
  combined_output: Vec<u8>,
  exit_status: i32,
}

impl UserData for CommandResult {
  fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
    methods.add_method("exit_status", |_, this, ()| Ok(this.exit_status));
    methods.add_method("success", |_, this, ()| Ok(this.exit_status == 0));
    methods.add_method("failure", |_, this, ()| Ok(this.exit_status != 0));
    methods
      .add_method("stdout", |lua, this, ()| lua.create_string(&this.stdout));
    methods
      .add_method("stderr", |lua, this, ()| lua.create_string(&this.stderr));
    methods.add_method("combined_output", |lua, this, ()| {
      lua.create_string(&this.combined_output)
    });
  }
}

pub fn module(lua: &Lua) -> mlua::Result<Table> {
  let t = lua.create_table()?;
  t.set(
    "run",
    lua.create_function(|_, command: String| Ok(run_command(&command)))?,
  )?;
  Ok(t)
}

/// Runs `command` with the platform shell and collects its output.
///
/// Failing to start the shell is not an error; it shows up in the exit
/// status the same way it would in an interactive shell.
pub fn run_command(command: &str) -> CommandResult {
  let mut child = match launcher::shell_command(command)
    .stdin(Stdio::inherit())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
  {
    Ok(child) => child,
    Err(e) => {
      tracing::debug!("failed to run {:?}: {}", command, e);
      return CommandResult {
        exit_status: launcher::spawn_failure_code(&e),
        ..CommandResult::default()
      };
    }
  };

  let combined = Mutex::new(Vec::new());
  let (stdout, stderr) = thread::scope(|s| {
    let stdout = child.stdout.take().map(|r| s.spawn(|| drain(r, &combined)));
    let stderr = child.stderr.take().map(|r| s.spawn(|| drain(r, &combined)));
    (
      stdout.and_then(|h| h.join().ok()).unwrap_or_default(),
      stderr.and_then(|h| h.join().ok()).unwrap_or_default(),
    )
  });

  let exit_status = match child.wait() {
    Ok(status) => launcher::exit_code(status),
    Err(_) => 1,
  };
  CommandResult {
    stdout,
    stderr,
    combined_output: combined.into_inner().unwrap_or_else(|e| e.into_inner()),
    exit_status,
  }
}

fn drain(mut reader: impl Read, combined: &Mutex<Vec<u8>>) -> Vec<u8> {
  let mut own = Vec::new();
  let mut buf = [0u8; 4096];
  loop {
    match reader.read(&mut buf) {
      Ok(0) => break,
      Ok(n) => {
        own.extend_from_slice(&buf[..n]);
        if let Ok(mut c) = combined.lock() {
          c.extend_from_slice(&buf[..n]);
        }
      }
      Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
      Err(_) => break,
    }
  }
  own
}

#[cfg(all(test, unix))]
mod test {
  use std::path::Path;

  use super::*;
  use crate::script;

  #[test]
  fn captures_stdout() {
    let r = run_command("echo hello");
    assert_eq!(r.exit_status, 0);
    assert_eq!(r.stdout, b"hello\n");
    assert_eq!(r.stderr, b"");
    assert_eq!(r.combined_output, b"hello\n");
  }

  #[test]
  fn captures_stderr_and_status() {
    let r = run_command("echo oops >&2; exit 3");
    assert_eq!(r.exit_status, 3);
    assert_eq!(r.stdout, b"");
    assert_eq!(r.stderr, b"oops\n");
    assert_eq!(r.combined_output, b"oops\n");
  }

  #[test]
  fn combined_output_keeps_arrival_order() {
    let r = run_command("echo one; sleep 0.1; echo two >&2; sleep 0.1; echo three");
    assert_eq!(r.stdout, b"one\nthree\n");
    assert_eq!(r.stderr, b"two\n");
    assert_eq!(r.combined_output, b"one\ntwo\nthree\n");
  }

  #[test]
  fn unknown_command() {
    let r = run_command("xs-surely-not-a-command-anywhere");
    assert_eq!(r.exit_status, 127);
    assert!(!r.stderr.is_empty());
  }

  #[test]
  fn usable_from_lua() {
    script::load_source(
      Path::new("/nonexistent/config.lua"),
      r#"
      local shell = require("xs.shell")
      local r = shell.run("echo hello")
      assert(r:exit_status() == 0)
      assert(r:success())
      assert(not r:failure())
      assert(r:stdout() == "hello\n")
      assert(r:stderr() == "")
      assert(r:combined_output() == "hello\n")

      local f = shell.run("exit 2")
      assert(f:failure())
      assert(f:exit_status() == 2)
      "#,
    )
    .unwrap();
  }
}
