// config.rs
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

use std::{
  ops::Deref,
  path::{Path, PathBuf},
};

use crate::{
  error::Error, host::Host, host_filter::HostFilter, hosts_file,
  script::{self, ScriptRuntime},
};

/// The hosts defined by the configuration file of this invocation.
#[derive(Debug)]
pub struct Config {
  pub path: PathBuf,
  pub hosts: Vec<Host>,
  // Keeps the interpreter alive for as long as the callable hooks are.
  _runtime: Option<ScriptRuntime>,
}

impl Config {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      hosts: Vec::new(),
      _runtime: None,
    }
  }

  pub(crate) fn from_runtime(
    path: impl Into<PathBuf>,
    hosts: Vec<Host>,
    runtime: ScriptRuntime,
  ) -> Self {
    Self {
      path: path.into(),
      hosts,
      _runtime: Some(runtime),
    }
  }

  /// Loads the configuration from a Lua script or, if the file name ends with
  /// `.toml`, from a declarative hosts file.
  pub fn load(path: &Path) -> Result<Self, Error> {
    if !path.is_file() {
      return Err(Error::ConfigLoad {
        path: path.to_string_lossy().into(),
        reason: "no config file".into(),
      });
    }
    if path.extension().is_some_and(|e| e == "toml") {
      hosts_file::load(path)
    } else {
      script::load(path)
    }
  }

  pub fn add_host(&mut self, host: Host) -> Result<(), Error> {
    check_new_name(self.hosts.iter().map(|h| h.name.as_str()), &host.name)?;
    self.hosts.push(host);
    Ok(())
  }

  pub fn host_filter(&self) -> HostFilter<'_> {
    HostFilter::new(&self.hosts)
  }
}

/// Host names are unique within a configuration.
pub(crate) fn check_new_name<I, S>(existing: I, name: &str) -> Result<(), Error>
where
  I: IntoIterator<Item = S>,
  S: Deref<Target = str>,
{
  if existing.into_iter().any(|n| &*n == name) {
    return Err(Error::DuplicateHost(name.into()));
  }
  Ok(())
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn add_host_rejects_duplicates() {
    let mut config = Config::new("/tmp/config.toml");
    config.add_host(Host::new("a")).unwrap();
    config.add_host(Host::new("b")).unwrap();
    assert!(matches!(
      config.add_host(Host::new("a")),
      Err(Error::DuplicateHost(ref n)) if n == "a"
    ));
    assert_eq!(config.hosts.len(), 2);
    assert!(config.host_filter().host_by_name("a").is_some());
    assert!(config.host_filter().host_by_name("b").is_some());
  }

  #[test]
  fn new_name_check() {
    assert!(check_new_name(["a", "b"], "c").is_ok());
    assert!(check_new_name(Vec::<&str>::new(), "a").is_ok());
    assert!(matches!(
      check_new_name(["a", "b"], "b"),
      Err(Error::DuplicateHost(ref n)) if n == "b"
    ));
  }

  #[test]
  fn missing_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.lua");
    let err = Config::load(&path).unwrap_err();
    assert!(
      matches!(err, Error::ConfigLoad { ref reason, .. } if reason == "no config file")
    );
    assert!(err.to_string().contains(&*path.to_string_lossy()));
  }
}
