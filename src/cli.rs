/*
 * ssaview: annotated viewer for SSA listings.
 * Copyright (C) 2022  Ruifeng Xie
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

//! Command line interface support.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use displaydoc::Display as DisplayDoc;
use parse_display::Display;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::ir::{load_program, program};
use crate::report::{write_referrer_report, write_viewer_report};

/// Entry to the command line interface.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// The SSA listing to analyse.
    input: PathBuf,
    /// Anything after the input is ignored.
    #[clap(hide = true)]
    trailing: Vec<String>,
}

/// Reports, one per executable.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq)]
pub enum Report {
    /// Every function, with its SSA dump and annotated instructions.
    #[display("ssa-viewer")]
    Viewer,
    /// The referrers of every map creation site.
    #[display("analyze-referrers")]
    Referrers,
}

impl Report {
    /// Usage message, printed when the input file is missing.
    pub fn usage(self) -> String {
        let example = match self {
            Report::Viewer => "demos/map-operations.ssa",
            Report::Referrers => "demos/tinygo-style.ssa",
        };
        format!("用法: {0} <SSA文件>\n示例: {0} {1}\n", self, example)
    }
}

/// All kinds of errors that might happen during command line execution.
#[derive(Debug, DisplayDoc, Error)]
pub enum Error {
    /// "errors" from [`clap`], including requests such as `--version` or `--help`.
    #[displaydoc("{0}")]
    InvalidArguments(#[from] clap::Error),
    /// the input cannot be loaded.
    #[displaydoc("{0}")]
    Load(#[from] program::Error),
    /// cannot write the report: {0}
    Output(#[from] io::Error),
}

/// Result type for the command line interface.
pub type Result = std::result::Result<(), Error>;

impl Cli {
    /// Run the command line interface, with arguments from the environment, writing to stdout.
    pub fn run(report: Report) -> Result {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        Cli::run_from(report, std::env::args_os(), &mut out)
    }

    /// Run the command line interface with the given arguments and output.
    pub fn run_from<I, T>(report: Report, args: I, out: &mut impl Write) -> Result
        where I: IntoIterator<Item=T>, T: Into<OsString> + Clone {
        let options = Cli::try_parse_from(args)?;
        options.execute(report, out)
    }

    fn execute(&self, report: Report, out: &mut impl Write) -> Result {
        debug!(%report, input = %self.input.display(), "running");
        if !self.trailing.is_empty() {
            debug!(ignored = ?self.trailing, "extra arguments");
        }
        let program = load_program(&self.input)?;
        let source = self.input.display();
        match report {
            Report::Viewer => write_viewer_report(out, source, &program)?,
            Report::Referrers => write_referrer_report(out, source, &program)?,
        }
        out.flush()?;
        Ok(())
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings and errors only).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Entry point shared by the executables.
pub fn main(report: Report) -> ExitCode {
    init_logging();
    match Cli::run(report) {
        Err(Error::InvalidArguments(err)) if !err.use_stderr() => err.exit(),
        result => {
            let stdout = io::stdout();
            let stderr = io::stderr();
            ExitCode::from(exit_status(report, result, &mut stdout.lock(), &mut stderr.lock()))
        }
    }
}

/// Tell the user what went wrong (if anything), and decide the exit status.
///
/// A missing input prints the usage on `out`; every other failure is reported on `err_out`.
fn exit_status(report: Report, result: Result, out: &mut impl Write, err_out: &mut impl Write) -> u8 {
    let written = match result {
        Ok(()) => return 0,
        Err(Error::InvalidArguments(err)) => {
            debug!(%err, "invalid arguments");
            write!(out, "{}", report.usage())
        }
        Err(err) => writeln!(err_out, "{}", err),
    };
    if let Err(err) = written {
        debug!(%err, "cannot report the failure");
    }
    1
}

#[cfg(test)]
mod tests {
    use std::io;
    use super::{Cli, Error, Report, exit_status};
    use crate::ir::program;

    const MAP_OPERATIONS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/map-operations.ssa");
    const TINYGO_PATTERN: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/tinygo-style.ssa");

    fn run(report: Report, args: &[&str]) -> (super::Result, String) {
        let mut out = Vec::new();
        let result = Cli::run_from(report, args.iter().copied(), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_missing_input() {
        let (result, out) = run(Report::Viewer, &["ssa-viewer"]);
        assert!(matches!(result, Err(Error::InvalidArguments(err)) if err.use_stderr()));
        assert!(out.is_empty());
        assert_eq!(Report::Viewer.usage(),
                   "用法: ssa-viewer <SSA文件>\n示例: ssa-viewer demos/map-operations.ssa\n");
    }

    #[test]
    fn test_missing_input_exit_status() {
        let (result, _) = run(Report::Viewer, &["ssa-viewer"]);
        let (mut out, mut err_out) = (Vec::<u8>::new(), Vec::<u8>::new());
        assert_eq!(exit_status(Report::Viewer, result, &mut out, &mut err_out), 1);
        assert_eq!(String::from_utf8(out).unwrap(), Report::Viewer.usage());
        assert!(err_out.is_empty());
    }

    #[test]
    fn test_load_failure_exit_status() {
        let (result, _) = run(Report::Referrers, &["analyze-referrers", "/nonexistent/listing.ssa"]);
        let (mut out, mut err_out) = (Vec::<u8>::new(), Vec::<u8>::new());
        assert_eq!(exit_status(Report::Referrers, result, &mut out, &mut err_out), 1);
        assert!(out.is_empty());
        assert!(String::from_utf8(err_out).unwrap().starts_with("解析文件失败: "));

        let (result, _) = run(Report::Viewer, &["ssa-viewer", MAP_OPERATIONS]);
        assert_eq!(exit_status(Report::Viewer, result, &mut io::sink(), &mut io::sink()), 0);
    }

    #[test]
    fn test_trailing_arguments() {
        let (result, out) = run(Report::Viewer, &["ssa-viewer", MAP_OPERATIONS, "extra", "more"]);
        assert!(result.is_ok());
        assert!(out.ends_with("包名: demo\n成员数量: 5\n"));
    }

    #[test]
    fn test_help() {
        let (result, _) = run(Report::Referrers, &["analyze-referrers", "--help"]);
        assert!(matches!(result, Err(Error::InvalidArguments(err)) if !err.use_stderr()));
    }

    #[test]
    fn test_viewer() {
        let (result, out) = run(Report::Viewer, &["ssa-viewer", MAP_OPERATIONS]);
        assert!(result.is_ok());
        assert!(out.starts_with(&format!("=== 分析文件: {} ===\n", MAP_OPERATIONS)));
        assert!(out.ends_with("包名: demo\n成员数量: 5\n"));
    }

    #[test]
    fn test_referrers() {
        let (result, out) = run(Report::Referrers, &["analyze-referrers", TINYGO_PATTERN]);
        assert!(result.is_ok());
        assert!(out.contains("分析函数: demonstrateTinyGoPattern\n\n找到 MakeMap: make map[string]interface{}\n引用者数量: 4\n"));
    }

    #[test]
    fn test_load_failure() {
        let (result, out) = run(Report::Viewer, &["ssa-viewer", "/nonexistent/listing.ssa"]);
        assert!(matches!(result, Err(Error::Load(program::Error::Io(_)))));
        assert!(out.is_empty());
    }
}
