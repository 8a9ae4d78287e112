// env.rs
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

use std::{env, ffi::OsString, path::PathBuf};

pub const CONFIG_VAR: &str = "XS_CONFIG";
pub const DEBUG_VAR: &str = "XS_DEBUG";
pub const NO_COLOR_VAR: &str = "XS_NO_COLOR";

const TRUTHY: &[&str] = &[
  "1", "true", "TRUE", "True", "yes", "YES", "Yes", "on", "ON", "On",
];

pub fn is_truthy(value: &str) -> bool {
  TRUTHY.contains(&value)
}

fn flag(name: &str) -> bool {
  env::var(name).map(|v| is_truthy(&v)).unwrap_or(false)
}

pub fn debug_enabled() -> bool {
  flag(DEBUG_VAR)
}

pub fn no_color() -> bool {
  flag(NO_COLOR_VAR)
}

/// Location of the configuration file.
///
/// `XS_CONFIG` wins when set and non-empty; a relative value is taken relative
/// to the current working directory.  Otherwise `~/.xs/config.lua`.
pub fn config_file_path() -> PathBuf {
  resolve_config_file_path(
    env::var_os(CONFIG_VAR),
    env::current_dir().ok(),
    dirs::home_dir(),
  )
}

fn resolve_config_file_path(
  var: Option<OsString>,
  cwd: Option<PathBuf>,
  home: Option<PathBuf>,
) -> PathBuf {
  match var {
    Some(f) if !f.is_empty() => {
      let f = PathBuf::from(f);
      match cwd {
        Some(cwd) if f.is_relative() => cwd.join(f),
        _ => f,
      }
    }
    _ => home.unwrap_or_default().join(".xs").join("config.lua"),
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn truthy_spellings() {
    for v in TRUTHY {
      assert!(is_truthy(v), "{} should be truthy", v);
    }
    for v in ["", "0", "false", "no", "off", "tRuE", "y", " 1"] {
      assert!(!is_truthy(v), "{:?} should not be truthy", v);
    }
  }

  #[test]
  fn config_path_defaults_to_home() {
    assert_eq!(
      resolve_config_file_path(
        None,
        Some("/work".into()),
        Some("/home/me".into())
      ),
      PathBuf::from("/home/me/.xs/config.lua"),
    );
    assert_eq!(
      resolve_config_file_path(
        Some("".into()),
        Some("/work".into()),
        Some("/home/me".into())
      ),
      PathBuf::from("/home/me/.xs/config.lua"),
    );
  }

  #[test]
  fn config_path_override() {
    assert_eq!(
      resolve_config_file_path(
        Some("/etc/xs.lua".into()),
        Some("/work".into()),
        Some("/home/me".into())
      ),
      PathBuf::from("/etc/xs.lua"),
    );
    assert_eq!(
      resolve_config_file_path(
        Some("conf/xs.lua".into()),
        Some("/work".into()),
        Some("/home/me".into())
      ),
      PathBuf::from("/work/conf/xs.lua"),
    );
  }
}
