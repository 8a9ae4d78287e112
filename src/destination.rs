// destination.rs
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

/// The host part of a destination of the form `[ssh://][user@]host[:port]`.
///
/// No validation; whatever is left after stripping the other parts is the
/// hostname.
pub fn extract_hostname(destination: &str) -> &str {
  let s = destination.strip_prefix("ssh://").unwrap_or(destination);
  let s = s.split_once('@').map_or(s, |(_, host)| host);
  s.split_once(':').map_or(s, |(host, _)| host)
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn all_destination_shapes() {
    for (destination, hostname) in [
      ("example.com", "example.com"),
      ("user@example.com", "example.com"),
      ("example.com:22", "example.com"),
      ("user@example.com:22", "example.com"),
      ("ssh://example.com", "example.com"),
      ("ssh://user@example.com", "example.com"),
      ("ssh://example.com:22", "example.com"),
      ("ssh://user@example.com:22", "example.com"),
    ] {
      assert_eq!(extract_hostname(destination), hostname, "{}", destination);
    }
  }

  #[test]
  fn first_separator_wins() {
    assert_eq!(extract_hostname("a@b@c"), "b@c");
    assert_eq!(extract_hostname("a:1:2"), "a");
    assert_eq!(extract_hostname(""), "");
  }
}
