// host.rs
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

use std::collections::HashMap;

use crate::script::ScriptFunction;

#[derive(Clone, Debug, Default)]
pub struct Host {
  pub name: String,
  pub description: String,
  pub hidden: bool,
  pub ssh_config: HashMap<String, String>,
  pub on_before_connect: Vec<Hook>,
  pub on_after_connect: Vec<Hook>,
  pub on_after_disconnect: Vec<Hook>,
}

impl Host {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Self::default()
    }
  }

  /// The ssh_config directives ordered by the directive name.
  pub fn sorted_ssh_config(&self) -> Vec<(&str, &str)> {
    let mut directives = self
      .ssh_config
      .iter()
      .map(|(k, v)| (k.as_str(), v.as_str()))
      .collect::<Vec<_>>();
    directives.sort_unstable_by_key(|(k, _)| *k);
    directives
  }
}

/// A piece of hook script: either given as is or produced by calling a
/// function defined in the configuration script.
#[derive(Clone, Debug)]
pub enum Hook {
  Literal(String),
  Callable(ScriptFunction),
}

impl From<&str> for Hook {
  fn from(s: &str) -> Self {
    Hook::Literal(s.to_owned())
  }
}
