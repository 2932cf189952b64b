// ============================================
// src/settings.rs
// 起動時設定の構造と読み込みロジック (読み込み専用、セッションは保存しない)
// ============================================

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use crate::session::SessionOptions;
use crate::speech::SpeechProfile;

const SETTINGS_FILE: &str = "settings.json";

/// 画面の配色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// 読み上げ設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub enabled: bool,
    pub locale: String,
    pub rate_wpm: u32,
    pub volume: u32,
    /// 読み上げ中なら止めてから次を喋る
    pub interrupt: bool,
    /// 自動検出の代わりに使うコマンド
    pub command: Option<String>,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        let profile = SpeechProfile::default();
        Self {
            enabled: true,
            locale: profile.locale,
            rate_wpm: profile.rate_wpm,
            volume: profile.volume,
            interrupt: true,
            command: None,
        }
    }
}

/// 起動時設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sequential: bool,
    pub challenge: bool,
    pub spelling: bool,
    pub theme: Theme,
    pub speech: SpeechSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let options = SessionOptions::default();
        Self {
            sequential: options.sequential,
            challenge: options.challenge,
            spelling: options.spelling,
            theme: Theme::default(),
            speech: SpeechSettings::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Settings {
    // MARK:設定ファイルのパスを取得する関数
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("jp", "kanawiz", "KANA_WIZ")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    /// 指定ファイルから読み込む
    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let file = File::open(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// MARK:設定を読み込む (失敗したらデフォルト)
    ///
    /// `explicit` が指定されていればそのファイル、無ければ OS ごとの設定ディレクトリを見る。
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Self::default(),
            },
        };

        // 既定の場所にファイルが無いのは普通なので警告しない
        if explicit.is_none() && !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Self::default();
        }

        match Self::from_path(&path) {
            Ok(settings) => {
                debug!(path = %path.display(), "settings loaded");
                settings
            }
            Err(err) => {
                warn!(error = %err, "falling back to default settings");
                Self::default()
            }
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            sequential: self.sequential,
            challenge: self.challenge,
            spelling: self.spelling,
            interrupt: self.speech.interrupt,
        }
    }

    pub fn speech_profile(&self) -> SpeechProfile {
        SpeechProfile {
            locale: self.speech.locale.clone(),
            rate_wpm: self.speech.rate_wpm,
            volume: self.speech.volume,
        }
    }
}
