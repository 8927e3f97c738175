/// Logging bridge for post-view
///
/// Routes every `log::info!()`/`log::debug!()` etc. record to a log file:
/// /tmp/post_view_debug.log on Unix/macOS, %TEMP%\post_view_debug.log on
/// Windows. This keeps diagnostics out of the HTML the CLI prints to stdout.
///
/// Level precedence:
/// 1. `--log-level` on the command line
/// 2. `RUST_LOG` (which also mirrors records to stderr)
/// 3. `log_level` from the config file, applied with [`apply_config_level`]
use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use post_view_config::LogLevel;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

struct LogBridge {
    file: Mutex<Option<File>>,
    /// Mirror records to stderr (RUST_LOG set)
    mirror_stderr: bool,
    /// Level fixed by CLI or environment; config may not change it
    level_locked: bool,
}

impl LogBridge {
    fn write_raw(&self, msg: &str) {
        if let Some(ref mut file) = *self.file.lock() {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            get_timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        self.write_raw(&line);
        if self.mirror_stderr {
            eprint!("{line}");
        }
    }

    fn flush(&self) {
        if let Some(ref mut file) = *self.file.lock() {
            let _ = file.flush();
        }
    }
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();

/// Path of the debug log file
pub fn log_path() -> PathBuf {
    #[cfg(unix)]
    let path = PathBuf::from("/tmp/post_view_debug.log");
    #[cfg(not(unix))]
    let path = std::env::temp_dir().join("post_view_debug.log");
    path
}

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Parse `RUST_LOG`, accepting either a bare level or `target=level` lists
/// (the most verbose level named wins).
fn parse_rust_log(value: &str) -> Option<LevelFilter> {
    value
        .split(',')
        .filter_map(|directive| LogLevel::parse(directive.rsplit('=').next()?))
        .max()
        .map(LogLevel::to_level_filter)
}

/// Install the bridge as the global `log` logger.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_log_bridge(cli_level: Option<LevelFilter>) {
    let env_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| parse_rust_log(&v));
    let level = cli_level.or(env_level).unwrap_or(LevelFilter::Off);

    let mut installed = false;
    let bridge = BRIDGE.get_or_init(|| {
        installed = true;
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(log_path())
            .ok();
        LogBridge {
            file: Mutex::new(file),
            mirror_stderr: env_level.is_some(),
            level_locked: cli_level.is_some() || env_level.is_some(),
        }
    });
    if !installed {
        return;
    }

    if log::set_logger(bridge).is_ok() {
        log::set_max_level(level);
        bridge.write_raw(&format!(
            "\n{}\npost-view debug session started at {} (level={})\n{}\n",
            "=".repeat(80),
            get_timestamp(),
            level,
            "=".repeat(80)
        ));
    }
}

/// Apply the configured level unless the CLI or `RUST_LOG` already set one.
pub fn apply_config_level(level: LevelFilter) {
    if BRIDGE.get().is_some_and(|b| !b.level_locked) {
        log::set_max_level(level);
        log::debug!("Log level set from config: {}", level);
    }
}
