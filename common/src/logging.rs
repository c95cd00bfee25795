// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! Root logger construction.

use std::fs::OpenOptions;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use slog::{o, Drain, Logger};

/// How log records are rendered.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Unstructured text, one record per line.
    #[default]
    Human,
    /// Bunyan-style json records.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("invalid log format: {s}")),
        }
    }
}

/// Build a root logger named `name`.  If `log_file` is set, records are
/// appended to that file, otherwise they go to stdout.
pub fn init(
    name: &str,
    log_file: &Option<String>,
    log_format: LogFormat,
) -> anyhow::Result<Logger> {
    // slog_bunyan requires a 'static name; the root logger lives for the
    // whole process, so leaking this one small string is fine.
    let name: &'static str = Box::leak(name.to_string().into_boxed_str());
    let drain = match (log_file, log_format) {
        (Some(path), LogFormat::Human) => {
            let file = open(path)?;
            let decorator = slog_term::PlainDecorator::new(file);
            let drain = slog_term::FullFormat::new(decorator).build().fuse();
            slog_async::Async::new(drain).build().fuse()
        }
        (Some(path), LogFormat::Json) => {
            let file = open(path)?;
            let drain = slog_bunyan::with_name(name, file).build().fuse();
            slog_async::Async::new(drain).build().fuse()
        }
        (None, LogFormat::Human) => {
            let decorator = slog_term::TermDecorator::new().build();
            let drain = slog_term::FullFormat::new(decorator).build().fuse();
            slog_async::Async::new(drain).build().fuse()
        }
        (None, LogFormat::Json) => {
            let drain = slog_bunyan::with_name(name, std::io::stdout())
                .build()
                .fuse();
            slog_async::Async::new(drain).build().fuse()
        }
    };

    Ok(Logger::root(drain, o!("name" => name.to_string())))
}

fn open(path: &str) -> anyhow::Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {path}"))
}

/// A synchronous logger that writes through the test harness's captured
/// stdout.
pub fn test_logger() -> Logger {
    let decorator =
        slog_term::PlainSyncDecorator::new(slog_term::TestStdoutWriter);
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    Logger::root(drain, o!())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Human".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert!("syslog".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_init_stdout() -> anyhow::Result<()> {
        let log = init("test", &None, LogFormat::Human)?;
        slog::info!(log, "logger up");
        Ok(())
    }
}
