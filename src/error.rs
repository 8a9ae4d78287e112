// error.rs
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

use crate::hooks::HookStage;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("failed to load config {path}: {reason}")]
  ConfigLoad { path: String, reason: String },
  #[error("host {0} already registered")]
  DuplicateHost(String),
  #[error("{key} must be a table but got {type_name}")]
  NotATable {
    key: &'static str,
    type_name: &'static str,
  },
  #[error("{key} entries must be strings or functions but got {type_name}")]
  BadHookEntry {
    key: &'static str,
    type_name: &'static str,
  },
  #[error("invalid number of arguments. want 1 or 2, got {0}")]
  BadArgumentCount(usize),
  #[error("destination host is required")]
  DestinationRequired,
  #[error("unknown host: {0}")]
  UnknownHost(String),
  #[error("script error: {0}")]
  Script(String),
  #[error("hook {stage} failed with exit status {code}")]
  HookFailed { stage: HookStage, code: i32 },
  #[error("cannot run {program}: {reason}")]
  CannotSpawn {
    program: String,
    reason: String,
    code: i32,
  },
  #[error("cannot create temporary file: {0}")]
  CannotCreateTempFile(String),
  #[error("cannot write file {0}")]
  CannotWriteFile(String),
  #[error("cannot read file {0}")]
  CannotReadFile(String),
  #[error("cannot write stdout")]
  CannotWriteStdOut,
  #[error("template error: {0}")]
  Template(String),
  #[error("bad hosts file {path}: {reason}")]
  CannotParseHostsFile { path: String, reason: String },
  #[error("arguments must be utf-8")]
  NonUtf8Argument,
  #[error("cannot locate own executable: {0}")]
  UnknownExecutable(String),
}

impl Error {
  /// Exit status the process should terminate with when this error aborts
  /// it.
  pub fn exit_code(&self) -> i32 {
    match *self {
      Error::CannotSpawn { code, .. } => code,
      _ => 1,
    }
  }
}

impl From<Error> for mlua::Error {
  fn from(e: Error) -> Self {
    mlua::Error::external(e)
  }
}
