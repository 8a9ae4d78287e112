// hooks.rs
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

use std::fmt;

use crate::{
  error::Error,
  host::{Hook, Host},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookStage {
  BeforeConnect,
  AfterConnect,
  AfterDisconnect,
}

impl HookStage {
  pub fn hooks(self, host: &Host) -> &[Hook] {
    match self {
      HookStage::BeforeConnect => &host.on_before_connect,
      HookStage::AfterConnect => &host.on_after_connect,
      HookStage::AfterDisconnect => &host.on_after_disconnect,
    }
  }
}

impl fmt::Display for HookStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      HookStage::BeforeConnect => "on_before_connect",
      HookStage::AfterConnect => "on_after_connect",
      HookStage::AfterDisconnect => "on_after_disconnect",
    })
  }
}

/// Turns a hook list into a single script, one piece per line.
///
/// Callables are invoked in order.  Pieces that come out empty are left out,
/// so the result is empty when there is nothing to run.
pub fn compile(hooks: &[Hook]) -> Result<String, Error> {
  let mut pieces = Vec::with_capacity(hooks.len());
  for hook in hooks {
    let piece = match hook {
      Hook::Literal(s) => s.clone(),
      Hook::Callable(f) => f.call()?,
    };
    if !piece.is_empty() {
      pieces.push(piece);
    }
  }
  Ok(pieces.join("\n"))
}
