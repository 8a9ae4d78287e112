// session.rs
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

//! Connecting to a host.
//!
//! The hooks only run when no remote command was given, i.e. when the user
//! is logging in to a shell:
//!
//! 1. `on_before_connect` runs locally before the ssh client is started,
//! 2. `on_after_connect` is sent as the remote command, followed by a line
//!    that hands the session over to the login shell, and
//! 3. `on_after_disconnect` runs locally after the ssh client has exited.

use std::{
  env,
  ffi::OsString,
  io::Write,
  path::{Path, PathBuf},
};

use tempfile::{Builder, TempPath};

use crate::{
  config::Config,
  destination,
  error::Error,
  hooks::{self, HookStage},
  host::Host,
  launcher::{Launcher, SSH_PROGRAM},
  logging::RAW_TARGET,
  ssh_config,
};

/// The ssh options that take the following argument as their value.
pub const OPTIONS_WITH_VALUE: [&str; 21] = [
  "-B", "-b", "-c", "-D", "-E", "-e", "-F", "-I", "-i", "-J", "-L", "-l",
  "-m", "-O", "-o", "-p", "-Q", "-R", "-S", "-W", "-w",
];

/// Appended to the `on_after_connect` script so that the user ends up in
/// their shell once the script is done.
const SHELL_HANDOFF: &str = "\nexec $SHELL\n";

/// The command line split into the options for the ssh client and the
/// positional parameters, destination first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SshArgs {
  pub options: Vec<String>,
  pub params: Vec<String>,
}

impl SshArgs {
  pub fn parse(args: &[String]) -> Result<Self, Error> {
    let mut options = Vec::new();
    let mut i = 0;
    while i < args.len() {
      let arg = &args[i];
      if !arg.starts_with('-') {
        return Ok(Self {
          options,
          params: args[i..].to_vec(),
        });
      }
      options.push(arg.clone());
      if OPTIONS_WITH_VALUE.contains(&arg.as_str()) {
        if let Some(value) = args.get(i + 1) {
          options.push(value.clone());
          i += 1;
        }
      }
      i += 1;
    }
    Err(Error::DestinationRequired)
  }

  pub fn destination(&self) -> &str {
    &self.params[0]
  }

  /// No remote command was given.
  pub fn is_login_shell(&self) -> bool {
    self.params.len() == 1
  }
}

/// The ssh_config written for the ssh client.  The file is removed when this
/// is dropped.
#[derive(Debug)]
struct GeneratedSshConfig {
  path: PathBuf,
  file: Option<TempPath>,
}

impl GeneratedSshConfig {
  fn write(contents: &str) -> Result<Self, Error> {
    Self::write_in(&env::temp_dir(), contents)
  }

  fn write_in(dir: &Path, contents: &str) -> Result<Self, Error> {
    let mut file = Builder::new()
      .prefix("xs.ssh_config.")
      .suffix(".tmp")
      .tempfile_in(dir)
      .map_err(|e| Error::CannotCreateTempFile(e.to_string()))?;
    let path = file.path().to_path_buf();
    file
      .write_all(contents.as_bytes())
      .and_then(|_| file.flush())
      .map_err(|e| {
        Error::CannotWriteFile(format!("{}: {}", path.display(), e))
      })?;
    tracing::debug!("generated ssh config file: {}", path.display());
    Ok(Self {
      path,
      file: Some(file.into_temp_path()),
    })
  }

  fn path(&self) -> &Path {
    &self.path
  }
}

impl Drop for GeneratedSshConfig {
  fn drop(&mut self) {
    if let Some(file) = self.file.take() {
      let path = self.path.display();
      match file.close() {
        Ok(()) => tracing::debug!("removed ssh config file: {}", path),
        Err(e) => tracing::debug!("failed to remove {}: {}", path, e),
      }
    }
  }
}

/// Connects the way `xs <args>` does with the configuration at
/// `config_path`.  The arguments are checked before the configuration is
/// loaded.
pub fn start(
  args: &[String],
  config_path: &Path,
  launcher: &mut impl Launcher,
) -> Result<i32, Error> {
  let args = SshArgs::parse(args)?;
  tracing::debug!("config file: {}", config_path.display());
  let config = Config::load(config_path)?;
  run(&config, args, launcher)
}

/// Connects to the host named by the destination in `args` and returns the
/// exit status of the ssh client.
pub fn run(
  config: &Config,
  args: SshArgs,
  launcher: &mut impl Launcher,
) -> Result<i32, Error> {
  let login_shell = args.is_login_shell();

  let ssh_config =
    GeneratedSshConfig::write(&ssh_config::render(&config.hosts))?;

  let hostname = destination::extract_hostname(args.destination());
  let host = config
    .host_filter()
    .host_by_name(hostname)
    .ok_or_else(|| Error::UnknownHost(hostname.into()))?;
  tracing::debug!("find host: {}", host.name);

  if login_shell {
    run_local_hooks(HookStage::BeforeConnect, host, launcher)?;
  }

  let after_disconnect =
    login_shell && !host.on_after_disconnect.is_empty();

  let result = connect(host, ssh_config.path(), args, launcher);

  if after_disconnect {
    if let Err(e) =
      run_local_hooks(HookStage::AfterDisconnect, host, launcher)
    {
      eprintln!("failed to run {}: {}", HookStage::AfterDisconnect, e);
    }
  }

  drop(ssh_config);
  result
}

fn connect(
  host: &Host,
  ssh_config_path: &Path,
  args: SshArgs,
  launcher: &mut impl Launcher,
) -> Result<i32, Error> {
  let login_shell = args.is_login_shell();
  let SshArgs {
    mut options,
    mut params,
  } = args;

  if login_shell && !host.on_after_connect.is_empty() {
    tracing::debug!("run hooks: {}", HookStage::AfterConnect);
    let script = hooks::compile(&host.on_after_connect)?;
    if !script.is_empty() {
      let script = script + SHELL_HANDOFF;
      tracing::debug!("hook script (remote):");
      tracing::debug!(target: RAW_TARGET, "{}", script);
      // The remote command would otherwise run without a terminal.
      if !options.iter().any(|o| o == "-t") {
        options.push("-t".into());
      }
      params.push(script);
    }
  }

  let mut ssh_args: Vec<OsString> =
    Vec::with_capacity(2 + options.len() + params.len());
  ssh_args.push("-F".into());
  ssh_args.push(ssh_config_path.into());
  ssh_args.extend(options.into_iter().map(OsString::from));
  ssh_args.extend(params.into_iter().map(OsString::from));
  tracing::debug!(
    "underlying ssh command: {} {}",
    SSH_PROGRAM,
    ssh_args
      .iter()
      .map(|a| a.to_string_lossy())
      .collect::<Vec<_>>()
      .join(" ")
  );

  launcher.run_ssh(&ssh_args)
}

fn run_local_hooks(
  stage: HookStage,
  host: &Host,
  launcher: &mut impl Launcher,
) -> Result<(), Error> {
  let hooks = stage.hooks(host);
  if hooks.is_empty() {
    return Ok(());
  }
  tracing::debug!("run hooks: {}", stage);
  let script = hooks::compile(hooks)?;
  if script.is_empty() {
    return Ok(());
  }
  tracing::debug!("hook script (local):");
  tracing::debug!(target: RAW_TARGET, "{}", script);
  match launcher.run_local_script(&script)? {
    0 => Ok(()),
    code => Err(Error::HookFailed { stage, code }),
  }
}
