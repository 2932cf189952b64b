// ============================================
// src/logging.rs
// ログ出力の初期化 (画面は TUI が使うのでファイルに書く)
// ============================================

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "kanawiz.log";

/// 既定のログファイルの場所
pub fn default_log_path() -> Option<PathBuf> {
    ProjectDirs::from("jp", "kanawiz", "KANA_WIZ").map(|dirs| dirs.data_dir().join(LOG_FILE))
}

/// ログを初期化する。返り値の guard は終了まで保持すること
///
/// ディレクトリが作れない場合などはログ無しで続行する。
pub fn init(path: Option<&Path>) -> Option<WorkerGuard> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_log_path()?,
    };
    let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = path.file_name()?;
    fs::create_dir_all(dir).ok()?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kanawiz=info")),
        )
        .try_init()
        .ok()?;

    Some(guard)
}
