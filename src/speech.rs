// ============================================
// src/speech.rs
// 読み上げ (音声合成) の呼び出し
// ============================================

use std::env;
use std::io;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use tracing::{debug, warn};

/// 読み上げ1回分のリクエスト
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utterance<'a> {
    pub text: &'a str,
    pub locale: &'a str,
    pub rate_wpm: u32,
    pub volume: u32, // 100 が標準、それ以上で大きめ
}

/// 読み上げ設定 (言語・速さ・音量)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechProfile {
    pub locale: String,
    pub rate_wpm: u32,
    pub volume: u32,
}

impl Default for SpeechProfile {
    /// ゆっくり、大きめの声で日本語
    fn default() -> Self {
        Self {
            locale: "ja-JP".to_string(),
            rate_wpm: 90,
            volume: 150,
        }
    }
}

impl SpeechProfile {
    pub fn utterance<'a>(&'a self, text: &'a str) -> Utterance<'a> {
        Utterance {
            text,
            locale: &self.locale,
            rate_wpm: self.rate_wpm,
            volume: self.volume,
        }
    }
}

/// 音声合成の窓口。失敗しても呼び出し側には伝えない (撃ちっぱなし)
pub trait Speaker {
    fn speak(&mut self, utterance: &Utterance<'_>);
    fn stop_if_speaking(&mut self);
}

impl<S: Speaker + ?Sized> Speaker for Box<S> {
    fn speak(&mut self, utterance: &Utterance<'_>) {
        (**self).speak(utterance);
    }

    fn stop_if_speaking(&mut self) {
        (**self).stop_if_speaking();
    }
}

/// 何も喋らない Speaker (--mute や音声合成が無い環境用)
#[derive(Debug, Default)]
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&mut self, utterance: &Utterance<'_>) {
        debug!(text = utterance.text, "speech muted");
    }

    fn stop_if_speaking(&mut self) {}
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("no speech synthesizer found on PATH (tried say, espeak-ng, espeak)")]
    NoBackend,
    #[error("speech command is empty")]
    EmptyCommand,
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// 使用する音声合成コマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// macOS の `say`
    Say,
    EspeakNg,
    Espeak,
    /// 設定ファイルで指定されたコマンド。`{text}` `{voice}` `{rate}` `{volume}` を置換する
    Custom(String),
}

impl Backend {
    /// PATH 上から使えるコマンドを探す
    pub fn detect() -> Option<Self> {
        [Self::Say, Self::EspeakNg, Self::Espeak]
            .into_iter()
            .find(|backend| on_path(backend.program_name()))
    }

    fn program_name(&self) -> &str {
        match self {
            Self::Say => "say",
            Self::EspeakNg => "espeak-ng",
            Self::Espeak => "espeak",
            Self::Custom(cmd) => cmd.split_whitespace().next().unwrap_or(""),
        }
    }

    /// ロケールから声の名前を決める ("ja-JP" -> Kyoko / ja)
    fn voice(&self, locale: &str) -> Option<String> {
        let lang = locale.split(['-', '_']).next().unwrap_or(locale);
        match self {
            Self::Say => (lang == "ja").then(|| "Kyoko".to_string()),
            _ if lang.is_empty() => None,
            _ => Some(lang.to_string()),
        }
    }

    /// コマンドライン (プログラム名 + 引数) を組み立てる
    pub fn command_line(&self, utterance: &Utterance<'_>) -> Vec<String> {
        let voice = self.voice(utterance.locale);
        let rate = utterance.rate_wpm.to_string();
        let mut line = vec![self.program_name().to_string()];

        match self {
            Self::Say => {
                // say には音量オプションが無い
                if let Some(voice) = voice {
                    line.extend(["-v".to_string(), voice]);
                }
                line.extend(["-r".to_string(), rate]);
                line.push(utterance.text.to_string());
            }
            Self::EspeakNg | Self::Espeak => {
                if let Some(voice) = voice {
                    line.extend(["-v".to_string(), voice]);
                }
                // espeak の振幅は 0..=200
                let amplitude = utterance.volume.min(200).to_string();
                line.extend(["-s".to_string(), rate, "-a".to_string(), amplitude]);
                line.push(utterance.text.to_string());
            }
            Self::Custom(cmd) => {
                let mut has_text = false;
                for arg in cmd.split_whitespace().skip(1) {
                    has_text |= arg.contains("{text}");
                    line.push(
                        arg.replace("{text}", utterance.text)
                            .replace("{voice}", voice.as_deref().unwrap_or(""))
                            .replace("{rate}", &rate)
                            .replace("{volume}", &utterance.volume.to_string()),
                    );
                }
                if !has_text {
                    line.push(utterance.text.to_string());
                }
            }
        }
        line
    }
}

fn on_path(program: &str) -> bool {
    let Some(paths) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&paths).any(|dir| is_file(&dir.join(program)))
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}

/// 外部コマンドを起動して読み上げる Speaker
#[derive(Debug)]
pub struct CommandSpeaker {
    backend: Backend,
    /// 起動済みでまだ回収していない子プロセス
    children: Vec<Child>,
}

impl CommandSpeaker {
    pub fn new(backend: Backend) -> Result<Self, SpeechError> {
        if backend.program_name().is_empty() {
            return Err(SpeechError::EmptyCommand);
        }
        Ok(Self {
            backend,
            children: Vec::new(),
        })
    }

    /// PATH から音声合成コマンドを自動検出して作成
    pub fn detect() -> Result<Self, SpeechError> {
        let backend = Backend::detect().ok_or(SpeechError::NoBackend)?;
        debug!(?backend, "speech backend detected");
        Self::new(backend)
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    fn try_speak(&mut self, utterance: &Utterance<'_>) -> Result<(), SpeechError> {
        self.reap();

        let line = self.backend.command_line(utterance);
        let (program, args) = line.split_first().ok_or(SpeechError::EmptyCommand)?;
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SpeechError::Spawn {
                program: program.clone(),
                source,
            })?;
        self.children.push(child);
        Ok(())
    }

    /// 終了済みの子プロセスを回収する (ゾンビ防止)
    fn reap(&mut self) {
        self.children
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&mut self, utterance: &Utterance<'_>) {
        // 読み上げは補助機能なので、失敗はログだけ残して無視する
        if let Err(err) = self.try_speak(utterance) {
            warn!(error = %err, text = utterance.text, "speech skipped");
        }
    }

    fn stop_if_speaking(&mut self) {
        for mut child in self.children.drain(..) {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
                let _ = child.wait();
                debug!(pid = child.id(), "interrupted utterance");
            }
        }
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        self.stop_if_speaking();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ka() -> Utterance<'static> {
        Utterance {
            text: "か",
            locale: "ja-JP",
            rate_wpm: 90,
            volume: 150,
        }
    }

    #[test]
    fn say_uses_japanese_voice_and_rate() {
        assert_eq!(
            Backend::Say.command_line(&ka()),
            ["say", "-v", "Kyoko", "-r", "90", "か"]
        );
    }

    #[test]
    fn say_without_japanese_locale_uses_default_voice() {
        let utterance = Utterance {
            locale: "en-US",
            ..ka()
        };
        assert_eq!(
            Backend::Say.command_line(&utterance),
            ["say", "-r", "90", "か"]
        );
    }

    #[test]
    fn espeak_clamps_amplitude() {
        let loud = Utterance {
            volume: 500,
            ..ka()
        };
        assert_eq!(
            Backend::EspeakNg.command_line(&loud),
            ["espeak-ng", "-v", "ja", "-s", "90", "-a", "200", "か"]
        );
        assert_eq!(
            Backend::Espeak.command_line(&ka()),
            ["espeak", "-v", "ja", "-s", "90", "-a", "150", "か"]
        );
    }

    #[test]
    fn custom_command_substitutes_placeholders() {
        let backend = Backend::Custom("tts --lang {voice} --speed {rate} {text}".to_string());
        assert_eq!(
            backend.command_line(&ka()),
            ["tts", "--lang", "ja", "--speed", "90", "か"]
        );
    }

    #[test]
    fn custom_command_appends_text_when_no_placeholder() {
        let backend = Backend::Custom("my-tts -q".to_string());
        assert_eq!(backend.command_line(&ka()), ["my-tts", "-q", "か"]);
    }

    #[test]
    fn empty_custom_command_is_rejected() {
        let err = CommandSpeaker::new(Backend::Custom("   ".to_string())).unwrap_err();
        assert!(matches!(err, SpeechError::EmptyCommand));
    }

    #[test]
    fn missing_program_is_skipped_silently() {
        let mut speaker =
            CommandSpeaker::new(Backend::Custom("kanawiz-no-such-tts-binary".to_string()))
                .unwrap();
        speaker.speak(&ka());
        speaker.stop_if_speaking();
        assert!(speaker.children.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn stop_if_speaking_kills_running_child() {
        let mut speaker =
            CommandSpeaker::new(Backend::Custom("sleep {text}".to_string())).unwrap();
        // テキストを秒数として渡す
        speaker.speak(&Utterance { text: "5", ..ka() });
        assert_eq!(speaker.children.len(), 1);
        speaker.stop_if_speaking();
        assert!(speaker.children.is_empty());
    }

    #[test]
    fn profile_builds_utterance() {
        let profile = SpeechProfile::default();
        assert_eq!(profile.utterance("あ"), Utterance { text: "あ", ..ka() });
    }
}
