//! Tracing initialization. The terminal belongs to the UI while the app runs,
//! so log output goes to a file under the user's home directory instead of
//! stdout.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;

use directories::BaseDirs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".book-inventory-manager";
/// Log file name stored inside the application data directory.
const LOG_FILE_NAME: &str = "manager.log";

/// Route `tracing` output to the log file, honoring `RUST_LOG` with an `info`
/// default. Logging is optional: when the home directory cannot be resolved
/// or the file cannot be opened, the app simply runs without it.
pub fn init() {
    let Some(path) = log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(Arc::new(file))
            .with_ansi(false),
    );
    let _ = subscriber.try_init();
}

/// Resolve the absolute path of the log file inside the user's home.
fn log_path() -> Option<PathBuf> {
    let base_dirs = BaseDirs::new()?;
    Some(base_dirs.home_dir().join(DATA_DIR_NAME).join(LOG_FILE_NAME))
}
