// main.rs
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

#![deny(
  future_incompatible,
  missing_debug_implementations,
  nonstandard_style,
  rust_2021_compatibility,
  unused
)]

use std::{io, process};

use xs::{
  cli::{self, Action},
  commands,
  env,
  error::Error,
  launcher::SystemLauncher,
  logging, session,
};

fn main() {
  let action = Action::from_command_line().unwrap_or_else(die);

  // Builtins write machine readable output, keep it free of debug lines
  logging::init(action.is_connect() && env::debug_enabled(), !env::no_color());

  let config_path = env::config_file_path();

  match action {
    Action::Help => cli::print_help(&mut io::stdout()).unwrap_or_else(die),
    Action::Builtin(ref builtin) => {
      commands::run(builtin, &config_path, &mut io::stdout().lock())
        .unwrap_or_else(die)
    }
    Action::Connect(ref args) => {
      let code = session::start(args, &config_path, &mut SystemLauncher)
        .unwrap_or_else(die);
      process::exit(code);
    }
  }
}

fn die<T>(e: Error) -> T {
  eprintln!("Error: {}", e);
  process::exit(e.exit_code());
}
