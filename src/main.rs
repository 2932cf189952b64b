// ============================================
// src/main.rs (メインファイル)
// ============================================

use std::io::{Result, stdout};
use std::path::PathBuf;
use std::time::Duration;

// ひらがな一覧
mod kana;

// 練習セッション (位置とモード)
mod session;
use session::{SessionController, SessionEvent};

// 読み上げ
mod speech;
use speech::{CommandSpeaker, SilentSpeaker, Speaker};

// 起動時設定
mod settings;
use settings::Settings;

mod logging;
mod ui;
use ui::Palette;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, Event, KeyCode},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::{info, warn};

// --------------------------------------------------
// コマンドライン引数
// --------------------------------------------------

/// ひらがなのフラッシュカード
#[derive(Parser, Debug)]
#[command(name = "kanawiz", version, about)]
struct Cli {
    /// シャッフル (ランダム) モードで始める
    #[arg(long)]
    shuffle: bool,

    /// チャレンジモード (ローマ字を隠す) で始める
    #[arg(long)]
    challenge: bool,

    /// 読み上げモードで始める
    #[arg(long, overrides_with = "no_spelling")]
    spelling: bool,

    /// 読み上げモードをオフで始める
    #[arg(long)]
    no_spelling: bool,

    /// 音声を出さない
    #[arg(long)]
    mute: bool,

    /// シャッフルの乱数シード
    #[arg(long)]
    seed: Option<u64>,

    /// 設定ファイル (既定: OS の設定ディレクトリ/settings.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// ログファイル
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// 実際に使う設定を JSON で表示して終了
    #[arg(long)]
    print_settings: bool,
}

impl Cli {
    /// 引数で設定ファイルの値を上書きする
    fn apply(&self, settings: &mut Settings) {
        if self.shuffle {
            settings.sequential = false;
        }
        if self.challenge {
            settings.challenge = true;
        }
        if self.spelling {
            settings.spelling = true;
        }
        if self.no_spelling {
            settings.spelling = false;
        }
        if self.mute {
            settings.speech.enabled = false;
        }
    }
}

/// キー入力の意味
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Quit,
    Session(SessionEvent),
}

fn action_for(code: KeyCode) -> Option<Action> {
    let event = match code {
        KeyCode::Esc | KeyCode::Char('q') => return Some(Action::Quit),
        KeyCode::Left | KeyCode::Char('h') => SessionEvent::Advance { forward: false },
        KeyCode::Right | KeyCode::Char('l') => SessionEvent::Advance { forward: true },
        KeyCode::Char(' ') | KeyCode::Enter => SessionEvent::Select,
        KeyCode::Char('o') => SessionEvent::ToggleSequential,
        KeyCode::Char('c') => SessionEvent::ToggleChallenge,
        KeyCode::Char('s') => SessionEvent::ToggleSpelling,
        KeyCode::Char('r') => SessionEvent::Reset,
        _ => return None,
    };
    Some(Action::Session(event))
}

/// 設定に応じて Speaker を選ぶ。使えなければ黙って無音にする
fn build_speaker(settings: &Settings) -> Box<dyn Speaker> {
    if !settings.speech.enabled {
        return Box::new(SilentSpeaker);
    }
    let speaker = match &settings.speech.command {
        Some(cmd) => CommandSpeaker::new(speech::Backend::Custom(cmd.clone())),
        None => CommandSpeaker::detect(),
    };
    match speaker {
        Ok(speaker) => {
            info!(backend = ?speaker.backend(), "speech enabled");
            Box::new(speaker)
        }
        Err(err) => {
            warn!(error = %err, "speech unavailable, continuing silently");
            Box::new(SilentSpeaker)
        }
    }
}

// --------------------------------------------------
// メイン関数 (TUIセットアップと実行ループ)
// --------------------------------------------------

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.log_file.as_deref());

    let mut settings = Settings::load(cli.config.as_deref());
    cli.apply(&mut settings);

    if cli.print_settings {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let speaker = build_speaker(&settings);
    let options = settings.session_options();
    let profile = settings.speech_profile();
    let mut session = match cli.seed {
        Some(seed) => SessionController::with_seed(options, profile, speaker, seed),
        None => SessionController::new(options, profile, speaker),
    };
    let palette = Palette::for_theme(settings.theme);
    info!(?options, "session started");

    let mut terminal = setup_terminal().context("failed to set up terminal")?;
    let result = run_app(&mut terminal, &mut session, &palette);
    // ループが失敗しても端末は必ず元に戻す
    restore_terminal().context("failed to restore terminal")?;
    result.context("terminal loop failed")?;

    info!("session ended");
    Ok(())
}

fn setup_terminal() -> Result<Terminal<impl Backend>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?; // 代替スクリーンを使用
    stdout().execute(Hide)?; // カーソルを非表示
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

fn restore_terminal() -> Result<()> {
    stdout().execute(Show)?; // カーソルを再表示
    stdout().execute(LeaveAlternateScreen)?; // 代替スクリーンを終了
    disable_raw_mode()?;
    Ok(())
}

fn run_app<S: Speaker>(
    terminal: &mut Terminal<impl Backend>,
    session: &mut SessionController<S>,
    palette: &Palette,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, session, palette))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == event::KeyEventKind::Press {
                    match action_for(key.code) {
                        Some(Action::Quit) => break,
                        Some(Action::Session(event)) => {
                            session.handle(event);
                        }
                        None => {}
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("kanawiz").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_flags_keep_settings() {
        let mut settings = Settings::default();
        parse(&[]).apply(&mut settings);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn flags_override_settings() {
        let mut settings = Settings::default();
        parse(&["--shuffle", "--challenge", "--no-spelling", "--mute", "--seed", "3"])
            .apply(&mut settings);
        assert!(!settings.sequential);
        assert!(settings.challenge);
        assert!(!settings.spelling);
        assert!(!settings.speech.enabled);
    }

    #[test]
    fn spelling_flag_turns_spelling_on() {
        let mut settings = Settings {
            spelling: false,
            ..Settings::default()
        };
        parse(&["--spelling"]).apply(&mut settings);
        assert!(settings.spelling);
    }

    #[test]
    fn last_spelling_flag_wins() {
        let mut settings = Settings::default();
        parse(&["--spelling", "--no-spelling"]).apply(&mut settings);
        assert!(!settings.spelling);

        let mut settings = Settings {
            spelling: false,
            ..Settings::default()
        };
        parse(&["--no-spelling", "--spelling"]).apply(&mut settings);
        assert!(settings.spelling);
    }

    #[test]
    fn keys_map_to_session_events() {
        assert_eq!(action_for(KeyCode::Esc), Some(Action::Quit));
        assert_eq!(action_for(KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(
            action_for(KeyCode::Right),
            Some(Action::Session(SessionEvent::Advance { forward: true }))
        );
        assert_eq!(
            action_for(KeyCode::Char('h')),
            Some(Action::Session(SessionEvent::Advance { forward: false }))
        );
        assert_eq!(
            action_for(KeyCode::Char(' ')),
            Some(Action::Session(SessionEvent::Select))
        );
        assert_eq!(
            action_for(KeyCode::Char('c')),
            Some(Action::Session(SessionEvent::ToggleChallenge))
        );
        assert_eq!(action_for(KeyCode::Char('z')), None);
    }

    #[test]
    fn muted_settings_build_silent_speaker() {
        let mut settings = Settings::default();
        settings.speech.enabled = false;
        let mut speaker = build_speaker(&settings);
        // 無音でも呼び出しは成功する
        speaker.speak(&settings.speech_profile().utterance("あ"));
        speaker.stop_if_speaking();
    }
}
