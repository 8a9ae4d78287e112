// script/debuglogger.rs
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

//! The `xs.debuglogger` module.

use mlua::{Function, Lua, MultiValue, Table};

use crate::logging::RAW_TARGET;

pub fn module(lua: &Lua) -> mlua::Result<Table> {
  let t = lua.create_table()?;
  t.set(
    "printf",
    lua.create_function(|lua, args: MultiValue| {
      let line = format(lua, args)?;
      tracing::debug!("{}", line);
      Ok(())
    })?,
  )?;
  t.set(
    "printf_no_prefix",
    lua.create_function(|lua, args: MultiValue| {
      let line = format(lua, args)?;
      tracing::debug!(target: RAW_TARGET, "{}", line);
      Ok(())
    })?,
  )?;
  Ok(t)
}

// Same rules as Lua's own string.format
fn format(lua: &Lua, args: MultiValue) -> mlua::Result<String> {
  let string: Table = lua.globals().get("string")?;
  let format: Function = string.get("format")?;
  format.call(args)
}
