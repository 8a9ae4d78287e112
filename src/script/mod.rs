// script/mod.rs
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

//! Lua configuration scripts.
//!
//! The script sees a single builtin, `host`, which registers a new host and
//! returns a handle to it.  The handle is used either through field assignment
//!
//! ```lua
//! local web = host("web")
//! web.description = "Web server"
//! web.ssh_config = { HostName = "192.0.2.10" }
//! ```
//!
//! or by calling it with a table of fields, `host "web" { ... }`, which is the
//! same as passing the table as the second argument, `host("web", { ... })`.

mod debuglogger;
mod shell;
mod template;

use std::{
  cell::{Ref, RefCell},
  fmt, fs,
  path::{Path, MAIN_SEPARATOR},
  rc::Rc,
};

use mlua::{
  AnyUserData, FromLua, Function, IntoLua, Lua, MetaMethod, MultiValue,
  Table, UserData, UserDataMethods, Value,
};

use crate::{
  config::{self, Config},
  error::Error,
  host::{Hook, Host},
};

/// The interpreter that ran the configuration script.
pub struct ScriptRuntime {
  _lua: Lua,
}

impl fmt::Debug for ScriptRuntime {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("ScriptRuntime")
  }
}

/// A function defined by the configuration script.
#[derive(Clone)]
pub struct ScriptFunction(Function);

impl fmt::Debug for ScriptFunction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("ScriptFunction")
  }
}

impl ScriptFunction {
  /// Calls the function without arguments and returns the text it produced.
  ///
  /// Returning `nil` counts as returning an empty string.
  pub fn call(&self) -> Result<String, Error> {
    match self.0.call::<Value>(()) {
      Ok(Value::Nil) => Ok(String::new()),
      Ok(v @ (Value::String(_) | Value::Integer(_) | Value::Number(_))) => {
        Ok(text(&v))
      }
      Ok(v) => Err(Error::Script(format!(
        "hook function must return a string but got {}",
        v.type_name()
      ))),
      Err(e) => Err(Error::Script(describe(&e))),
    }
  }
}

pub fn load(path: &Path) -> Result<Config, Error> {
  let source = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
    path: path.to_string_lossy().into(),
    reason: e.to_string(),
  })?;
  load_source(path, &source)
}

/// Runs the script `source` as if it was read from `path`.
pub fn load_source(path: &Path, source: &str) -> Result<Config, Error> {
  let load_error = |e: mlua::Error| Error::ConfigLoad {
    path: path.to_string_lossy().into(),
    reason: describe(&e),
  };
  let lua = Lua::new();
  let registry = Rc::new(RefCell::new(Registry::default()));
  install_globals(&lua, path, &registry).map_err(load_error)?;
  lua
    .load(source)
    .set_name(format!("@{}", path.display()))
    .exec()
    .map_err(load_error)?;
  let hosts = registry.borrow().snapshot();
  Ok(Config::from_runtime(path, hosts, ScriptRuntime { _lua: lua }))
}

fn install_globals(
  lua: &Lua,
  path: &Path,
  registry: &Rc<RefCell<Registry>>,
) -> mlua::Result<()> {
  let globals = lua.globals();

  let registry = Rc::clone(registry);
  globals.set(
    "host",
    lua.create_function(move |lua, args: MultiValue| {
      host_builtin(lua, &registry, args)
    })?,
  )?;

  let dir = path.parent().unwrap_or_else(|| Path::new("."));
  let xs = lua.create_table()?;
  xs.set("config_file", path.to_string_lossy().to_string())?;
  xs.set("config_dir", dir.to_string_lossy().to_string())?;
  globals.set("xs", xs)?;

  // Let the script require modules sitting next to it.
  let package: Table = globals.get("package")?;
  let search_path: String = package.get("path")?;
  package.set(
    "path",
    format!("{}{}?.lua;{}", dir.display(), MAIN_SEPARATOR, search_path),
  )?;

  let preload: Table = package.get("preload")?;
  preload.set(
    "xs.debuglogger",
    lua.create_function(|lua, ()| debuglogger::module(lua))?,
  )?;
  preload.set(
    "xs.shell",
    lua.create_function(|lua, ()| shell::module(lua))?,
  )?;
  preload.set(
    "xs.template",
    lua.create_function(|lua, ()| template::module(lua))?,
  )?;

  Ok(())
}

fn host_builtin(
  lua: &Lua,
  registry: &RefCell<Registry>,
  args: MultiValue,
) -> mlua::Result<HostHandle> {
  let mut args = args.into_iter().collect::<Vec<_>>();
  if !(1..=2).contains(&args.len()) {
    return Err(Error::BadArgumentCount(args.len()).into());
  }
  let attrs = if args.len() == 2 {
    args.pop().map(|v| Table::from_lua(v, lua)).transpose()?
  } else {
    None
  };
  let name = args
    .pop()
    .map(|v| String::from_lua(v, lua))
    .transpose()?
    .unwrap_or_default();
  let handle = registry.borrow_mut().register(name)?;
  if let Some(ref attrs) = attrs {
    handle.apply(attrs)?;
  }
  Ok(handle)
}

#[derive(Debug, Default)]
struct Registry {
  hosts: Vec<Rc<RefCell<Host>>>,
}

impl Registry {
  fn register(&mut self, name: String) -> Result<HostHandle, Error> {
    config::check_new_name(
      self.hosts.iter().map(|h| Ref::map(h.borrow(), |h| h.name.as_str())),
      &name,
    )?;
    let host = Rc::new(RefCell::new(Host::new(name)));
    self.hosts.push(Rc::clone(&host));
    Ok(HostHandle { host })
  }

  fn snapshot(&self) -> Vec<Host> {
    self.hosts.iter().map(|h| h.borrow().clone()).collect()
  }
}

#[derive(Clone, Debug)]
struct HostHandle {
  host: Rc<RefCell<Host>>,
}

impl HostHandle {
  fn apply(&self, attrs: &Table) -> mlua::Result<()> {
    for pair in attrs.pairs::<Value, Value>() {
      let (key, value) = pair?;
      let key = text(&key);
      if !key.is_empty() {
        self.set(&key, value)?;
      }
    }
    Ok(())
  }

  fn set(&self, key: &str, value: Value) -> mlua::Result<()> {
    let mut host = self.host.borrow_mut();
    match key {
      "name" => host.name = text(&value),
      "description" => host.description = text(&value),
      "hidden" => host.hidden = !matches!(value, Value::Nil | Value::Boolean(false)),
      "ssh_config" => {
        let directives = expect_table("ssh_config", value)?;
        for pair in directives.pairs::<Value, Value>() {
          let (k, v) = pair?;
          let k = text(&k);
          if !k.is_empty() {
            host.ssh_config.insert(k, text(&v));
          }
        }
      }
      "on_before_connect" => {
        host.on_before_connect = hooks("on_before_connect", value)?
      }
      "on_after_connect" => {
        host.on_after_connect = hooks("on_after_connect", value)?
      }
      "on_after_disconnect" => {
        host.on_after_disconnect = hooks("on_after_disconnect", value)?
      }
      _ => (),
    }
    Ok(())
  }

  fn get(&self, lua: &Lua, key: &str) -> mlua::Result<Value> {
    let host = self.host.borrow();
    match key {
      "name" => host.name.as_str().into_lua(lua),
      "description" => host.description.as_str().into_lua(lua),
      "hidden" => Ok(Value::Boolean(host.hidden)),
      "ssh_config" => lua
        .create_table_from(
          host.ssh_config.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )
        .map(Value::Table),
      "on_before_connect" => hook_table(lua, &host.on_before_connect),
      "on_after_connect" => hook_table(lua, &host.on_after_connect),
      "on_after_disconnect" => hook_table(lua, &host.on_after_disconnect),
      _ => Ok(Value::Nil),
    }
  }
}

impl UserData for HostHandle {
  fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
    methods.add_meta_method(MetaMethod::Index, |lua, this, key: String| {
      this.get(lua, &key)
    });
    methods.add_meta_method(
      MetaMethod::NewIndex,
      |_, this, (key, value): (String, Value)| this.set(&key, value),
    );
    methods.add_meta_function(
      MetaMethod::Call,
      |_, (handle, attrs): (AnyUserData, Table)| {
        handle.borrow::<HostHandle>()?.apply(&attrs)?;
        Ok(handle)
      },
    );
  }
}

fn expect_table(key: &'static str, value: Value) -> Result<Table, Error> {
  match value {
    Value::Table(t) => Ok(t),
    v => Err(Error::NotATable {
      key,
      type_name: v.type_name(),
    }),
  }
}

fn hooks(key: &'static str, value: Value) -> mlua::Result<Vec<Hook>> {
  expect_table(key, value)?
    .sequence_values::<Value>()
    .map(|v| match v? {
      Value::String(s) => Ok(Hook::Literal(s.to_string_lossy().into())),
      Value::Function(f) => Ok(Hook::Callable(ScriptFunction(f))),
      v => Err(
        Error::BadHookEntry {
          key,
          type_name: v.type_name(),
        }
        .into(),
      ),
    })
    .collect()
}

fn hook_table(lua: &Lua, hooks: &[Hook]) -> mlua::Result<Value> {
  let t = lua.create_table()?;
  for hook in hooks {
    match hook {
      Hook::Literal(s) => t.push(s.as_str())?,
      Hook::Callable(f) => t.push(f.0.clone())?,
    }
  }
  Ok(Value::Table(t))
}

// Strings and numbers as text, anything else as the empty string.
fn text(value: &Value) -> String {
  match value {
    Value::String(s) => s.to_string_lossy().into(),
    Value::Integer(i) => i.to_string(),
    Value::Number(n) => n.to_string(),
    _ => String::new(),
  }
}

// The innermost cause reads better than mlua's nested callback errors.
fn describe(e: &mlua::Error) -> String {
  match e {
    mlua::Error::CallbackError { cause, .. } => describe(cause),
    mlua::Error::ExternalError(cause) => cause.to_string(),
    mlua::Error::RuntimeError(msg) => msg.clone(),
    mlua::Error::SyntaxError { message, .. } => message.clone(),
    e => e.to_string(),
  }
}
