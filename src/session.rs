// ============================================
// src/session.rs
// 練習セッションの状態 (表示位置とモード) を管理する
// ============================================

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::kana::{self, KANA_COUNT};
use crate::speech::{Speaker, SpeechProfile};

// --------------------------------------------------
// データ構造
// --------------------------------------------------

/// 起動時のモード設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub sequential: bool,
    pub challenge: bool,
    pub spelling: bool,
    /// 読み上げ中に次の読み上げが来たら前のものを止めるか
    pub interrupt: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            sequential: true,
            challenge: false,
            spelling: true,
            interrupt: true,
        }
    }
}

/// セッションの可変状態。SessionController だけが書き換える
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    position: usize, // 0..KANA_COUNT
    sequential: bool,
    challenge_mode: bool,
    spelling_mode: bool,
}

impl SessionState {
    fn new(options: &SessionOptions) -> Self {
        Self {
            position: 0,
            sequential: options.sequential,
            challenge_mode: options.challenge,
            // チャレンジモード中は読み上げない
            spelling_mode: options.spelling && !options.challenge,
        }
    }
}

/// 画面に渡す表示内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayPayload {
    pub glyph: &'static str,
    /// チャレンジモード中は None (ローマ字を隠す)
    pub romanization: Option<&'static str>,
}

/// 画面から届くイベント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Advance { forward: bool },
    Select,
    ToggleSequential,
    ToggleChallenge,
    ToggleSpelling,
    Reset,
}

/// 位置とモードを持ち、イベントごとに次の表示内容を決める
pub struct SessionController<S: Speaker> {
    state: SessionState,
    speaker: S,
    profile: SpeechProfile,
    interrupt: bool,
    rng: StdRng,
}

impl<S: Speaker> SessionController<S> {
    pub fn new(options: SessionOptions, profile: SpeechProfile, speaker: S) -> Self {
        Self::build(options, profile, speaker, StdRng::from_os_rng())
    }

    /// シャッフル順を再現したいとき用 (--seed)
    pub fn with_seed(
        options: SessionOptions,
        profile: SpeechProfile,
        speaker: S,
        seed: u64,
    ) -> Self {
        Self::build(options, profile, speaker, StdRng::seed_from_u64(seed))
    }

    fn build(options: SessionOptions, profile: SpeechProfile, speaker: S, rng: StdRng) -> Self {
        Self {
            state: SessionState::new(&options),
            speaker,
            profile,
            interrupt: options.interrupt,
            rng,
        }
    }

    // ---- 参照系 ----

    pub fn position(&self) -> usize {
        self.state.position
    }

    pub fn sequential(&self) -> bool {
        self.state.sequential
    }

    pub fn challenge_mode(&self) -> bool {
        self.state.challenge_mode
    }

    pub fn spelling_mode(&self) -> bool {
        self.state.spelling_mode
    }

    /// 現在の表示内容
    pub fn current_payload(&self) -> DisplayPayload {
        let entry = kana::entry(self.state.position);
        DisplayPayload {
            glyph: entry.glyph,
            romanization: (!self.state.challenge_mode).then_some(entry.romanization),
        }
    }

    // ---- 操作系 ----

    /// イベントを1件処理して、処理後の表示内容を返す
    pub fn handle(&mut self, event: SessionEvent) -> DisplayPayload {
        match event {
            SessionEvent::Advance { forward } => return self.advance(forward),
            SessionEvent::Select => return self.select_current(),
            SessionEvent::Reset => return self.reset(),
            SessionEvent::ToggleSequential => self.toggle_sequential(),
            SessionEvent::ToggleChallenge => self.toggle_challenge(),
            SessionEvent::ToggleSpelling => self.toggle_spelling(),
        }
        self.current_payload()
    }

    /// 次 (forward) / 前の文字へ。シャッフル中は向きに関係なくランダムに飛ぶ
    pub fn advance(&mut self, forward: bool) -> DisplayPayload {
        let p = self.state.position;
        self.state.position = if self.state.sequential {
            if forward {
                (p + 1) % KANA_COUNT
            } else {
                (p + KANA_COUNT - 1) % KANA_COUNT
            }
        } else {
            self.rng.random_range(0..KANA_COUNT)
        };
        debug!(from = p, to = self.state.position, forward, "advance");

        self.announce();
        self.current_payload()
    }

    /// 中央のタイルをもう一度押したとき (聞き直し)
    pub fn select_current(&mut self) -> DisplayPayload {
        self.announce();
        self.current_payload()
    }

    pub fn toggle_sequential(&mut self) {
        self.state.sequential = !self.state.sequential;
        debug!(sequential = self.state.sequential, "toggle order");
    }

    /// チャレンジモードに入ると読み上げは必ずオフ
    pub fn toggle_challenge(&mut self) {
        self.state.challenge_mode = !self.state.challenge_mode;
        if self.state.challenge_mode {
            self.state.spelling_mode = false;
        }
        debug!(challenge = self.state.challenge_mode, "toggle challenge");
    }

    /// チャレンジモード中は何もしない
    pub fn toggle_spelling(&mut self) {
        if self.state.challenge_mode {
            return;
        }
        self.state.spelling_mode = !self.state.spelling_mode;
        debug!(spelling = self.state.spelling_mode, "toggle spelling");
    }

    /// 先頭 (あ) に戻る。モードはそのまま
    pub fn reset(&mut self) -> DisplayPayload {
        self.state.position = 0;
        self.announce();
        self.current_payload()
    }

    fn announce(&mut self) {
        if !self.state.spelling_mode {
            return;
        }
        if self.interrupt {
            self.speaker.stop_if_speaking();
        }
        let glyph = kana::entry(self.state.position).glyph;
        self.speaker.speak(&self.profile.utterance(glyph));
    }
}

#[cfg(test)]
impl<S: Speaker> SessionController<S> {
    /// 任意の状態から始める (テスト用)
    pub(crate) fn with_state(
        position: usize,
        sequential: bool,
        challenge_mode: bool,
        spelling_mode: bool,
        speaker: S,
    ) -> Self {
        assert!(position < KANA_COUNT);
        let mut controller = Self::with_seed(SessionOptions::default(), SpeechProfile::default(), speaker, 7);
        controller.state = SessionState {
            position,
            sequential,
            challenge_mode,
            spelling_mode,
        };
        controller
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn speaker(&self) -> &S {
        &self.speaker
    }
}
