// commands.rs
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

//! The builtin commands.  Their output is meant for other programs as much as
//! for people, so none of them prints debug output.

use std::{env, io, path::Path};

use crate::{cli::Builtin, config::Config, error::Error, ssh_config, template};

const ZSH_COMPLETION_TEMPLATE: &str =
  include_str!("templates/zsh_completion.zsh");
const XSCP_FUNCTION_TEMPLATE: &str = include_str!("templates/xscp_function.sh");

pub fn run(
  builtin: &Builtin,
  config_path: &Path,
  out: &mut impl io::Write,
) -> Result<(), Error> {
  let text = match *builtin {
    Builtin::List { all } => list(&Config::load(config_path)?, all),
    Builtin::SshConfig => ssh_config::render(&Config::load(config_path)?.hosts),
    Builtin::ZshCompletion { hosts: true } => {
      completion_hosts(&Config::load(config_path)?)
    }
    Builtin::ZshCompletion { hosts: false } => zsh_completion(&executable()?)?,
    Builtin::XscpFunction { ref name } => {
      xscp_function(&executable()?, name)?
    }
  };
  out
    .write_all(text.as_bytes())
    .map_err(|_| Error::CannotWriteStdOut)
}

fn list(config: &Config, all: bool) -> String {
  let mut filter = config.host_filter();
  if !all {
    filter = filter.exclude_hidden();
  }
  let rows = filter
    .hosts()
    .iter()
    .map(|h| [h.name.clone(), h.description.clone(), h.hidden.to_string()])
    .collect::<Vec<_>>();
  render_table(["HOST", "DESCRIPTION", "HIDDEN"], &rows)
}

// Left aligned columns, three spaces apart
fn render_table(header: [&str; 3], rows: &[[String; 3]]) -> String {
  let mut widths = header.map(|h| h.chars().count());
  for row in rows {
    for (w, cell) in widths.iter_mut().zip(row) {
      *w = (*w).max(cell.chars().count());
    }
  }
  let line = |cells: [&str; 3]| {
    let mut s = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
      if i > 0 {
        s.push_str("   ");
      }
      s.push_str(cell);
      s.extend(std::iter::repeat(' ').take(width - cell.chars().count()));
    }
    s.truncate(s.trim_end().len());
    s.push('\n');
    s
  };
  let mut table = line(header);
  for row in rows {
    table.push_str(&line([&row[0], &row[1], &row[2]]));
  }
  table
}

fn completion_hosts(config: &Config) -> String {
  config
    .host_filter()
    .exclude_hidden()
    .hosts()
    .iter()
    .map(|h| format!("{}\t{}\n", h.name, h.description))
    .collect()
}

fn zsh_completion(executable: &str) -> Result<String, Error> {
  template::render(ZSH_COMPLETION_TEMPLATE, |var| match var {
    "executable" => Some(executable.to_string()),
    _ => None,
  })
}

fn xscp_function(executable: &str, name: &str) -> Result<String, Error> {
  let name = if name.is_empty() { "xscp" } else { name };
  template::render(XSCP_FUNCTION_TEMPLATE, |var| match var {
    "executable" => Some(executable.to_string()),
    "name" => Some(name.to_string()),
    _ => None,
  })
}

fn executable() -> Result<String, Error> {
  env::current_exe()
    .map(|p| p.to_string_lossy().into_owned())
    .map_err(|e| Error::UnknownExecutable(e.to_string()))
}
