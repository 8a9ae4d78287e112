// script/template.rs
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

//! The `xs.template` module.

use std::fs;

use mlua::{Lua, Table, Value};

use crate::{error::Error, template};

pub fn module(lua: &Lua) -> mlua::Result<Table> {
  let t = lua.create_table()?;
  t.set(
    "dostring",
    lua.create_function(|_, (text, vars): (String, Option<Table>)| {
      Ok(render(&text, vars.as_ref())?)
    })?,
  )?;
  t.set(
    "dofile",
    lua.create_function(|_, (path, vars): (String, Option<Table>)| {
      let text = fs::read_to_string(&path)
        .map_err(|e| Error::CannotReadFile(format!("{}: {}", path, e)))?;
      Ok(render(&text, vars.as_ref())?)
    })?,
  )?;
  Ok(t)
}

fn render(text: &str, vars: Option<&Table>) -> Result<String, Error> {
  template::render(text, |name| vars.and_then(|v| lookup(v, name)))
}

// Follows `a.b.c` through nested tables.
fn lookup(vars: &Table, path: &str) -> Option<String> {
  let mut segments = path.split('.');
  let mut value = vars.get::<Value>(segments.next()?).ok()?;
  for segment in segments {
    value = match value {
      Value::Table(t) => t.get::<Value>(segment).ok()?,
      _ => return None,
    };
  }
  match value {
    Value::Boolean(b) => Some(b.to_string()),
    v @ (Value::String(_) | Value::Integer(_) | Value::Number(_)) => {
      Some(super::text(&v))
    }
    _ => None,
  }
}

#[cfg(test)]
mod test {
  use std::path::Path;

  use crate::script;

  fn run(source: &str) -> Result<(), String> {
    script::load_source(Path::new("/nonexistent/config.lua"), source)
      .map(|_| ())
      .map_err(|e| e.to_string())
  }

  #[test]
  fn dostring_with_nested_vars() {
    run(
      r#"
      local template = require("xs.template")
      local s = template.dostring(
        "Host {{ name }} port {{ net.port }} up {{ up }}",
        { name = "web", net = { port = 22 }, up = true }
      )
      assert(s == "Host web port 22 up true", s)
      assert(template.dostring("static") == "static")
      "#,
    )
    .unwrap();
  }

  #[test]
  fn undefined_variable_is_an_error() {
    let err = run(
      r#"require("xs.template").dostring("{{ nope }}", { yes = 1 })"#,
    )
    .unwrap_err();
    assert!(err.contains("undefined variable nope"), "{}", err);
    let err = run(r#"require("xs.template").dostring("{{ a.b }}", { a = 1 })"#)
      .unwrap_err();
    assert!(err.contains("undefined variable a.b"), "{}", err);
  }

  #[test]
  fn dofile_reads_the_template() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("motd.tmpl");
    std::fs::write(&path, "Welcome to {{ host }}\n").unwrap();
    let source = format!(
      r#"
      local s = require("xs.template").dofile({:?}, {{ host = "db" }})
      assert(s == "Welcome to db\n", s)
      "#,
      path.to_string_lossy()
    );
    run(&source).unwrap();
  }

  #[test]
  fn dofile_missing_file() {
    let err = run(r#"require("xs.template").dofile("/nonexistent/x.tmpl")"#)
      .unwrap_err();
    assert!(err.contains("cannot read file /nonexistent/x.tmpl"), "{}", err);
  }
}
