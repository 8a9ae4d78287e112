// host_filter.rs
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

use crate::host::Host;

#[derive(Clone, Debug)]
pub struct HostFilter<'a> {
  hosts: Vec<&'a Host>,
}

impl<'a> HostFilter<'a> {
  pub fn new(hosts: &'a [Host]) -> Self {
    Self {
      hosts: hosts.iter().collect(),
    }
  }

  pub fn exclude_hidden(mut self) -> Self {
    self.hosts.retain(|h| !h.hidden);
    self
  }

  pub fn hosts(&self) -> &[&'a Host] {
    &self.hosts
  }

  pub fn host_by_name(&self, name: &str) -> Option<&'a Host> {
    self.hosts.iter().find(|h| h.name == name).copied()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn hosts() -> Vec<Host> {
    [("a", false), ("b", true), ("c", false), ("d", true)]
      .into_iter()
      .map(|(name, hidden)| Host {
        hidden,
        ..Host::new(name)
      })
      .collect()
  }

  fn names(f: &HostFilter<'_>) -> Vec<String> {
    f.hosts().iter().map(|h| h.name.clone()).collect()
  }

  #[test]
  fn unfiltered_keeps_everything() {
    let hosts = hosts();
    assert_eq!(names(&HostFilter::new(&hosts)), ["a", "b", "c", "d"]);
  }

  #[test]
  fn exclude_hidden_preserves_order() {
    let hosts = hosts();
    let f = HostFilter::new(&hosts).exclude_hidden();
    assert_eq!(names(&f), ["a", "c"]);
  }

  #[test]
  fn exclude_hidden_is_idempotent() {
    let hosts = hosts();
    let once = HostFilter::new(&hosts).exclude_hidden();
    let twice = once.clone().exclude_hidden();
    assert_eq!(names(&once), names(&twice));
  }

  #[test]
  fn lookup_by_name() {
    let hosts = hosts();
    let all = HostFilter::new(&hosts);
    assert_eq!(all.host_by_name("b").map(|h| h.hidden), Some(true));
    assert!(all.host_by_name("x").is_none());
    assert!(all.exclude_hidden().host_by_name("b").is_none());
  }
}
