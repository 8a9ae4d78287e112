// logging.rs
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

//! Debug output.
//!
//! Everything goes through `tracing::debug!`.  The subscriber installed here
//! prints one `[debug] ...` line per event on the standard error, dimmed
//! unless colors are turned off.  Events targeted at [`RAW_TARGET`] are
//! printed as is, which is what we want for multi-line hook scripts.

use std::{
  fmt::{self, Write as _},
  io,
};

use colored::Colorize;
use tracing::{level_filters::LevelFilter, Event, Subscriber};
use tracing_subscriber::{
  fmt::{
    format::Writer, FmtContext, FormatEvent, FormatFields, MakeWriter,
  },
  registry::LookupSpan,
};

/// Target for events that are printed without the `[debug]` prefix.
pub const RAW_TARGET: &str = "xs::raw";

const PREFIX: &str = "[debug] ";

#[derive(Clone, Copy, Debug)]
pub struct DebugLineFormat {
  color: bool,
}

impl<S, N> FormatEvent<S, N> for DebugLineFormat
where
  S: Subscriber + for<'a> LookupSpan<'a>,
  N: for<'a> FormatFields<'a> + 'static,
{
  fn format_event(
    &self,
    ctx: &FmtContext<'_, S, N>,
    mut writer: Writer<'_>,
    event: &Event<'_>,
  ) -> fmt::Result {
    let mut line = String::new();
    if event.metadata().target() != RAW_TARGET {
      line.push_str(PREFIX);
    }
    ctx.format_fields(Writer::new(&mut line), event)?;
    if self.color {
      write!(writer, "{}", line.dimmed())?;
    } else {
      writer.write_str(&line)?;
    }
    if !line.ends_with('\n') {
      writer.write_char('\n')?;
    }
    Ok(())
  }
}

pub fn subscriber<W>(
  debug: bool,
  color: bool,
  make_writer: W,
) -> impl Subscriber + Send + Sync
where
  W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
  tracing_subscriber::fmt()
    .with_max_level(if debug {
      LevelFilter::DEBUG
    } else {
      LevelFilter::OFF
    })
    .with_ansi(false)
    .event_format(DebugLineFormat { color })
    .with_writer(make_writer)
    .finish()
}

/// Installs the process wide subscriber writing to the standard error.
pub fn init(debug: bool, color: bool) {
  // Fails only if a subscriber is already installed and then the existing one
  // stays in charge.
  let _ = tracing::subscriber::set_global_default(subscriber(
    debug,
    color,
    io::stderr,
  ));
}

#[cfg(test)]
pub(crate) mod test {
  use std::sync::{Arc, Mutex};

  use super::*;

  #[derive(Clone, Default)]
  struct Captured(Arc<Mutex<Vec<u8>>>);

  impl Captured {
    fn contents(&self) -> String {
      String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
  }

  impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
      self.0.lock().unwrap().extend_from_slice(buf);
      Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
      Ok(())
    }
  }

  /// Runs `f` with a thread local debug subscriber and returns its output.
  pub(crate) fn capture(
    debug: bool,
    color: bool,
    f: impl FnOnce(),
  ) -> String {
    let captured = Captured::default();
    let sink = captured.clone();
    tracing::subscriber::with_default(
      subscriber(debug, color, move || sink.clone()),
      f,
    );
    captured.contents()
  }

  #[test]
  fn prefixed_line() {
    let out = capture(true, false, || tracing::debug!("test {}", "message"));
    assert_eq!(out, "[debug] test message\n");
  }

  #[test]
  fn raw_line() {
    let out = capture(true, false, || {
      tracing::debug!(target: RAW_TARGET, "test {}", "message")
    });
    assert_eq!(out, "test message\n");
  }

  #[test]
  fn no_double_newline() {
    let out = capture(true, false, || {
      tracing::debug!(target: RAW_TARGET, "echo hi\nexec $SHELL\n")
    });
    assert_eq!(out, "echo hi\nexec $SHELL\n");
  }

  #[test]
  fn colored_line_keeps_text() {
    let out = capture(true, true, || tracing::debug!("test {}", "message"));
    assert!(out.contains("[debug] test message"));
    assert!(out.ends_with('\n'));
  }

  #[test]
  fn silent_without_debug() {
    let out = capture(false, false, || {
      tracing::debug!("test {}", "message");
      tracing::debug!(target: RAW_TARGET, "raw");
    });
    assert_eq!(out, "");
  }
}
