// interrupt.rs
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

//! An interrupt from the terminal reaches every process in the foreground
//! process group.  These tests send one from inside the session and check
//! that xs cleans up after itself.

#![cfg(unix)]

use std::{
  env,
  ffi::OsString,
  fs,
  os::unix::{fs::PermissionsExt, process::CommandExt},
  path::{Path, PathBuf},
  process::{Command, ExitStatus},
  sync::{Mutex, MutexGuard, PoisonError},
};

use tempfile::TempDir;

// Writing an executable while another thread forks can make exec fail with
// ETXTBSY, so the tests take turns.
static SERIAL: Mutex<()> = Mutex::new(());

struct Fixture {
  _serial: MutexGuard<'static, ()>,
  bin: TempDir,
  scratch: TempDir,
  home: TempDir,
}

impl Fixture {
  // `ssh` on the path is a shell script with the given body.
  fn new(ssh_body: &str) -> Self {
    let fixture = Self {
      _serial: SERIAL.lock().unwrap_or_else(PoisonError::into_inner),
      bin: tempfile::tempdir().unwrap(),
      scratch: tempfile::tempdir().unwrap(),
      home: tempfile::tempdir().unwrap(),
    };
    let ssh = fixture.bin.path().join("ssh");
    fs::write(&ssh, format!("#!/bin/sh\n{}\n", ssh_body)).unwrap();
    fs::set_permissions(&ssh, fs::Permissions::from_mode(0o755)).unwrap();
    fixture
  }

  fn marker(&self) -> PathBuf {
    self.home.path().join("disconnected")
  }

  // Runs `xs <args>` as the leader of its own process group so that
  // `kill 0` stays within it.
  fn xs(&self, config: &str, args: &[&str]) -> ExitStatus {
    let config_path = self.home.path().join("config.lua");
    fs::write(&config_path, config).unwrap();
    let mut path = OsString::from(self.bin.path());
    if let Some(rest) = env::var_os("PATH") {
      path.push(":");
      path.push(rest);
    }
    Command::new(env!("CARGO_BIN_EXE_xs"))
      .args(args)
      .env("PATH", path)
      .env("TMPDIR", self.scratch.path())
      .env("XS_CONFIG", &config_path)
      .env_remove("XS_DEBUG")
      .current_dir(self.home.path())
      .process_group(0)
      .status()
      .unwrap()
  }

  fn leftovers(&self) -> Vec<String> {
    leftovers(self.scratch.path())
  }
}

fn leftovers(dir: &Path) -> Vec<String> {
  fs::read_dir(dir)
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
    .filter(|n| n.starts_with("xs.ssh_config."))
    .collect()
}

#[test]
fn interrupted_client_still_disconnects_cleanly() {
  let fixture = Fixture::new("kill -INT 0\nsleep 1\nexit 0");
  let config = format!(
    r#"host("a", {{ on_after_disconnect = {{ "touch '{}'" }} }})"#,
    fixture.marker().display()
  );
  let status = fixture.xs(&config, &["a"]);
  // The client died of the interrupt, xs did not.
  assert_eq!(status.code(), Some(128 + 2));
  assert!(fixture.marker().exists());
  assert!(fixture.leftovers().is_empty(), "{:?}", fixture.leftovers());
}

#[test]
fn quit_signal_is_handled_the_same_way() {
  let fixture = Fixture::new("kill -QUIT 0\nsleep 1\nexit 0");
  let config = format!(
    r#"host("a", {{ on_after_disconnect = {{ "touch '{}'" }} }})"#,
    fixture.marker().display()
  );
  let status = fixture.xs(&config, &["a"]);
  assert_eq!(status.code(), Some(128 + 3));
  assert!(fixture.marker().exists());
  assert!(fixture.leftovers().is_empty(), "{:?}", fixture.leftovers());
}

#[test]
fn interrupted_before_hook_removes_the_config() {
  let fixture = Fixture::new("exit 0");
  let config = format!(
    r#"host("a", {{
      on_before_connect = {{ "kill -INT 0; sleep 1" }},
      on_after_disconnect = {{ "touch '{}'" }},
    }})"#,
    fixture.marker().display()
  );
  let status = fixture.xs(&config, &["a"]);
  // The hook failed, so the client never ran and nothing was scheduled.
  assert_eq!(status.code(), Some(1));
  assert!(!fixture.marker().exists());
  assert!(fixture.leftovers().is_empty(), "{:?}", fixture.leftovers());
}
