//! Process-wide logger for the planner and its CLI.
//!
//! The chosen level applies to the planner's own modules. HTTP and runtime
//! crates underneath are capped at `warn` so a `debug` run shows selection
//! and routing decisions rather than connection pool chatter.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
};

use env_logger::{Builder, Target, WriteStyle, fmt::Formatter};
use log::{Level, LevelFilter, Record};

use crate::{
    Error, Result,
    options::{LogFormat, PlannerOptions},
};

/// Log targets that follow the configured level.
const PLANNER_MODULES: [&str; 2] = ["route_planner_core", "route_planner"];
const DEPENDENCY_CEILING: LevelFilter = LevelFilter::Warn;

pub fn init_logger(options: &PlannerOptions) -> Result<()> {
    let log_format = options.log_format;
    let log_timestamp = options.log_timestamp;
    let level = options.log_level.to_filter();

    let mut builder = Builder::new();
    builder.filter_level(dependency_level(level));
    for module in PLANNER_MODULES {
        builder.filter_module(module, level);
    }
    builder
        .write_style(WriteStyle::Never)
        .format(move |buf: &mut Formatter, record: &Record| {
            if log_timestamp {
                write!(buf, "{} ", buf.timestamp_millis())?;
            }
            let tag = level_tag(record.level());
            match log_format {
                LogFormat::Compact => writeln!(buf, "{tag} {}", record.args()),
                LogFormat::Pretty => {
                    writeln!(buf, "{tag} [{}] {}", record.target(), record.args())
                }
            }
        });

    let target = match options.log_output_path() {
        Some(log_path) => Target::Pipe(Box::new(open_log_file(log_path)?)),
        None => Target::Stderr,
    };
    builder.target(target);

    builder
        .try_init()
        .map_err(|e| Error::other(format!("logger init failed: {e}")))
}

fn dependency_level(level: LevelFilter) -> LevelFilter {
    level.min(DEPENDENCY_CEILING)
}

/// Opens `path` for appending, creating it when missing.
fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            Error::other(format!(
                "failed to open log output file {}: {e}",
                path.display()
            ))
        })
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Write, process};

    use log::LevelFilter;

    use super::{dependency_level, open_log_file};

    #[test]
    fn dependencies_never_log_below_warn() {
        assert_eq!(dependency_level(LevelFilter::Trace), LevelFilter::Warn);
        assert_eq!(dependency_level(LevelFilter::Info), LevelFilter::Warn);
        assert_eq!(dependency_level(LevelFilter::Error), LevelFilter::Error);
        assert_eq!(dependency_level(LevelFilter::Off), LevelFilter::Off);
    }

    #[test]
    fn log_file_is_appended_not_truncated() {
        let path = std::env::temp_dir().join(format!("route-planner-log-{}.log", process::id()));
        fs::write(&path, "earlier run\n").expect("seed log file");

        let mut file = open_log_file(&path).expect("open log file");
        writeln!(file, "this run").expect("append line");
        drop(file);

        let contents = fs::read_to_string(&path).expect("read log file");
        fs::remove_file(&path).expect("remove log file");
        assert_eq!(contents, "earlier run\nthis run\n");
    }

    #[test]
    fn missing_log_directory_is_an_error() {
        let path = std::env::temp_dir()
            .join(format!("route-planner-missing-{}", process::id()))
            .join("planner.log");
        let err = open_log_file(&path).expect_err("parent dir does not exist");
        assert!(err.to_string().contains("failed to open log output file"));
    }
}
