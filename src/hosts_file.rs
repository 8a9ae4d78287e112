// hosts_file.rs
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

//! Declarative hosts files.
//!
//! ```toml
//! [[host]]
//! name = "web"
//! description = "Web server"
//! on_before_connect = ["echo connecting"]
//!
//! [host.ssh_config]
//! HostName = "192.0.2.10"
//! Port = 22
//! ```

use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;

use crate::{
  config::Config,
  error::Error,
  host::{Hook, Host},
};

pub fn load(path: &Path) -> Result<Config, Error> {
  let s = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
    path: path.to_string_lossy().into(),
    reason: e.to_string(),
  })?;
  let hosts_file: HostsFile =
    toml::from_str(&s).map_err(|e| Error::CannotParseHostsFile {
      path: path.to_string_lossy().into(),
      reason: e.message().into(),
    })?;
  let mut config = Config::new(path);
  for host in hosts_file.host {
    config
      .add_host(host.into())
      .map_err(|e| Error::ConfigLoad {
        path: path.to_string_lossy().into(),
        reason: e.to_string(),
      })?;
  }
  Ok(config)
}

#[derive(Debug, Deserialize)]
struct HostsFile {
  #[serde(default)]
  host: Vec<HostDe>,
}

#[derive(Debug, Deserialize)]
struct HostDe {
  name: String,
  #[serde(default)]
  description: String,
  #[serde(default)]
  hidden: bool,
  #[serde(default)]
  ssh_config: HashMap<String, DirectiveValue>,
  #[serde(default)]
  on_before_connect: Vec<String>,
  #[serde(default)]
  on_after_connect: Vec<String>,
  #[serde(default)]
  on_after_disconnect: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DirectiveValue {
  String(String),
  Integer(i64),
  Float(f64),
  Boolean(bool),
}

impl From<DirectiveValue> for String {
  fn from(v: DirectiveValue) -> Self {
    match v {
      DirectiveValue::String(s) => s,
      DirectiveValue::Integer(i) => i.to_string(),
      DirectiveValue::Float(f) => f.to_string(),
      DirectiveValue::Boolean(b) => if b { "yes" } else { "no" }.into(),
    }
  }
}

impl From<HostDe> for Host {
  fn from(h: HostDe) -> Self {
    let literals =
      |v: Vec<String>| v.into_iter().map(Hook::Literal).collect::<Vec<_>>();
    Host {
      name: h.name,
      description: h.description,
      hidden: h.hidden,
      ssh_config: h
        .ssh_config
        .into_iter()
        .map(|(k, v)| (k, v.into()))
        .collect(),
      on_before_connect: literals(h.on_before_connect),
      on_after_connect: literals(h.on_after_connect),
      on_after_disconnect: literals(h.on_after_disconnect),
    }
  }
}
