// ssh_config.rs
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

//! The ssh_config file handed to the ssh client.

use std::fmt::Write;

use crate::host::Host;

/// Renders one `Host` block per host, in the given order, directives sorted
/// by name.  Hidden hosts are included.
pub fn render(hosts: &[Host]) -> String {
  let mut blocks = Vec::with_capacity(hosts.len());
  for host in hosts {
    let mut block = format!("Host {}\n", host.name);
    for (key, value) in host.sorted_ssh_config() {
      // Writing into a String cannot fail
      let _ = writeln!(block, "    {} {}", key, value);
    }
    blocks.push(block);
  }
  blocks.join("\n")
}

#[cfg(test)]
mod test {
  use super::*;

  fn host(name: &str, hidden: bool, directives: &[(&str, &str)]) -> Host {
    Host {
      hidden,
      ssh_config: directives
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
      ..Host::new(name)
    }
  }

  #[test]
  fn single_host_block() {
    let hosts = [host("a", false, &[("Port", "22"), ("HostName", "1.2.3.4")])];
    assert_eq!(
      render(&hosts),
      "Host a\n    HostName 1.2.3.4\n    Port 22\n"
    );
  }

  #[test]
  fn blocks_are_separated_and_hidden_hosts_included() {
    let hosts = [
      host("a", false, &[("User", "me")]),
      host("b", true, &[]),
      host("c", false, &[("User", "you")]),
    ];
    assert_eq!(
      render(&hosts),
      "Host a\n    User me\n\nHost b\n\nHost c\n    User you\n"
    );
  }

  #[test]
  fn rendering_is_deterministic() {
    let directives = [
      ("User", "me"),
      ("ProxyJump", "bastion"),
      ("HostName", "10.0.0.1"),
      ("Port", "2222"),
      ("IdentityFile", "~/.ssh/id"),
    ];
    let hosts = [host("x", false, &directives), host("y", false, &directives)];
    let first = render(&hosts);
    for _ in 0..10 {
      assert_eq!(render(&hosts), first);
    }
    assert!(first.starts_with(
      "Host x\n    HostName 10.0.0.1\n    IdentityFile ~/.ssh/id\n    \
       Port 2222\n    ProxyJump bastion\n    User me\n"
    ));
  }

  #[test]
  fn no_hosts_no_output() {
    assert_eq!(render(&[]), "");
  }
}
