// template.rs
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

//! Text templates with `{{ name }}` and `{{ name.field }}` placeholders.
//!
//! There are no conditionals, loops or filters.  Text outside of the
//! placeholders is copied as is.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::Error;

fn placeholder() -> &'static Regex {
  static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
  PLACEHOLDER.get_or_init(|| {
    Regex::new(
      r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)\s*\}\}",
    )
    .expect("placeholder pattern is valid")
  })
}

/// Renders `template` asking `lookup` for the value of each placeholder.
///
/// A placeholder for which `lookup` returns `None` fails the whole rendering.
pub fn render(
  template: &str,
  mut lookup: impl FnMut(&str) -> Option<String>,
) -> Result<String, Error> {
  let mut fragments = Vec::<String>::new();
  let mut remaining = template;
  while let Some(captures) = placeholder().captures(remaining) {
    let (Some(full_match), Some(name)) = (captures.get(0), captures.get(1))
    else {
      break;
    };
    let Some(value) = lookup(name.as_str()) else {
      return Err(Error::Template(format!(
        "undefined variable {}",
        name.as_str()
      )));
    };
    fragments.push(remaining[..full_match.start()].to_string());
    fragments.push(value);
    remaining = &remaining[full_match.end()..];
  }
  fragments.push(remaining.to_string());
  Ok(fragments.concat())
}
