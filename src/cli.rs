// cli.rs
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

//! Command line dispatch.
//!
//! Everything that is not a builtin command is handed to ssh untouched, so
//! clap only ever sees the command line when its first argument names a
//! builtin.

use std::{env, io};

use clap::{CommandFactory, Parser};

use crate::{env as xs_env, error::Error};

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
  Help,
  Builtin(Builtin),
  /// Connect with the given ssh arguments.
  Connect(Vec<String>),
}

impl Action {
  pub fn from_command_line() -> Result<Self, Error> {
    let args = env::args_os()
      .skip(1)
      .map(|a| a.into_string().map_err(|_| Error::NonUtf8Argument))
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Self::from_args(args))
  }

  pub fn from_args(args: Vec<String>) -> Self {
    let Some(first) = args.first() else {
      return Action::Help;
    };
    if matches!(first.as_str(), "help" | "-h" | "--help") {
      return Action::Help;
    }
    if Cli::command().find_subcommand(first).is_some() {
      // Exits with clap's own message on bad usage
      let cli = Cli::parse_from(std::iter::once("xs".to_string()).chain(args));
      return Action::Builtin(cli.builtin);
    }
    Action::Connect(args)
  }

  pub fn is_connect(&self) -> bool {
    matches!(*self, Action::Connect(_))
  }
}

#[derive(Debug, clap::Parser)]
#[clap(name = "xs", disable_help_subcommand = true, max_term_width = 80)]
struct Cli {
  #[clap(subcommand)]
  builtin: Builtin,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::Subcommand)]
pub enum Builtin {
  /// List defined hosts
  #[clap(visible_alias = "ls")]
  List {
    /// List all hosts including hidden hosts
    #[clap(long, short)]
    all: bool,
  },
  /// Output the generated ssh_config to STDOUT
  SshConfig,
  /// Output zsh completion script to STDOUT
  ZshCompletion {
    /// Output the visible hosts instead, one per line
    #[clap(long)]
    hosts: bool,
  },
  /// Output xscp function code to STDOUT
  XscpFunction {
    /// Function name
    #[clap(long, short, value_name = "NAME", default_value = "xscp")]
    name: String,
  },
}

pub fn print_help(out: &mut impl io::Write) -> Result<(), Error> {
  let builtins = Cli::command()
    .get_subcommands()
    .map(|c| {
      let name = match c.get_visible_aliases().collect::<Vec<_>>() {
        aliases if aliases.is_empty() => c.get_name().to_string(),
        aliases => format!("{}, {}", c.get_name(), aliases.join(", ")),
      };
      let about = c.get_about().map(|a| a.to_string()).unwrap_or_default();
      format!("   {:<18} {}\n", name, about)
    })
    .collect::<String>();
  write!(
    out,
    "\
Usage: xs [options] builtin_command|destination [command [args ...]]

XS is a SSH command wrapper that enhances your SSH operations.

Options:
   -h, --help         Show this help message and exit
   You can also use ssh command options. Check 'man ssh' for more information.

Builtin commands:
{builtins}
Destination Hosts:
   You can define destination hosts in the configuration file.

Environment variables:
   {config:<18} Path to the configuration file. Default is ~/.xs/config.lua
   {debug:<18} If set to \"true\", XS will output debug information.
   {no_color:<18} If set to \"true\", XS will not output color codes in debug
                      information.

Version: {version}
",
    builtins = builtins,
    config = xs_env::CONFIG_VAR,
    debug = xs_env::DEBUG_VAR,
    no_color = xs_env::NO_COLOR_VAR,
    version = env!("CARGO_PKG_VERSION"),
  )
  .map_err(|_| Error::CannotWriteStdOut)
}
