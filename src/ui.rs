// ============================================
// src/ui.rs
// 画面描画
// ============================================

use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::kana::KANA_COUNT;
use crate::session::SessionController;
use crate::settings::Theme;
use crate::speech::Speaker;

/// 配色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub tile: Color,
    pub text: Color,
    pub border: Color,
    pub accent: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            // オフホワイト (225, 225, 235) に灰色の文字
            Theme::Light => Self {
                background: Color::Rgb(225, 225, 235),
                tile: Color::Rgb(235, 235, 245),
                text: Color::Rgb(128, 128, 128),
                border: Color::Rgb(190, 190, 200),
                accent: Color::Rgb(90, 90, 110),
            },
            Theme::Dark => Self {
                background: Color::Black,
                tile: Color::Rgb(30, 30, 36),
                text: Color::Gray,
                border: Color::DarkGray,
                accent: Color::White,
            },
        }
    }
}

fn tile<'a>(palette: &Palette) -> Block<'a> {
    Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.border))
        .style(Style::default().bg(palette.tile))
}

/// タイルの縦中央に1行だけ置く
fn centered_in_tile<'a>(line: Line<'a>, height: u16) -> Paragraph<'a> {
    let pad = height.saturating_sub(3) / 2;
    let mut lines = vec![Line::default(); pad as usize];
    lines.push(line);
    Paragraph::new(lines).centered()
}

fn toggle_span<'a>(key: &'a str, label: &'a str, on: bool, palette: &Palette) -> Vec<Span<'a>> {
    let mark = if on { "■" } else { "□" };
    let style = if on {
        Style::default().fg(palette.accent).bold()
    } else {
        Style::default().fg(palette.text)
    };
    vec![
        Span::styled(format!("[{key}] "), Style::default().fg(palette.border)),
        Span::styled(format!("{label} {mark}"), style),
        Span::raw("   "),
    ]
}

pub fn draw<S: Speaker>(f: &mut Frame, session: &SessionController<S>, palette: &Palette) {
    let size = f.area();
    let block = Block::bordered()
        .title(" Kana Wiz ! ")
        .border_style(Style::default().fg(palette.border))
        .style(Style::default().bg(palette.background).fg(palette.text));
    let inner_area = block.inner(size);
    f.render_widget(block, size);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // [0] ステータス (順番 / 位置)
            Constraint::Min(0),    // [1] 空白
            Constraint::Length(9), // [2] タイル
            Constraint::Length(1), // [3] 空白
            Constraint::Length(1), // [4] ローマ字
            Constraint::Min(0),    // [5] 空白
            Constraint::Length(1), // [6] モード切替
            Constraint::Length(1), // [7] 操作説明
        ])
        .split(inner_area);

    let payload = session.current_payload();

    // 0. ステータス
    let order = if session.sequential() { "順番" } else { "シャッフル" };
    let status = format!("{order}  {} / {}", session.position() + 1, KANA_COUNT);
    f.render_widget(Paragraph::new(status).right_aligned(), chunks[0]);

    // 1. タイル (‹  あ  ›)
    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(7),
            Constraint::Length(3),
            Constraint::Length(16),
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(0),
        ])
        .split(chunks[2]);
    let height = chunks[2].height;

    for (area, arrow) in [(row[1], "‹"), (row[5], "›")] {
        f.render_widget(
            centered_in_tile(Line::from(arrow), height).block(tile(palette)),
            area,
        );
    }
    f.render_widget(
        centered_in_tile(
            Line::from(payload.glyph).style(Style::default().fg(palette.accent).bold()),
            height,
        )
        .block(tile(palette)),
        row[3],
    );

    // 2. ローマ字 (チャレンジモード中は空欄)
    f.render_widget(
        Paragraph::new(payload.romanization.unwrap_or(""))
            .style(Style::default().fg(palette.text))
            .centered(),
        chunks[4],
    );

    // 3. モード切替
    let mut toggles = Vec::new();
    toggles.extend(toggle_span("o", "順番", session.sequential(), palette));
    toggles.extend(toggle_span("c", "チャレンジ", session.challenge_mode(), palette));
    toggles.extend(toggle_span("s", "読み上げ", session.spelling_mode(), palette));
    f.render_widget(Paragraph::new(Line::from(toggles)).centered(), chunks[6]);

    // 4. 操作説明
    f.render_widget(
        Paragraph::new("←/h 前   →/l 次   Space 聞く   r 最初から   q 終了")
            .style(Style::default().fg(palette.border))
            .centered(),
        chunks[7],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::SilentSpeaker;
    use ratatui::backend::TestBackend;

    fn render(session: &SessionController<SilentSpeaker>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let palette = Palette::for_theme(Theme::Light);
        terminal.draw(|f| draw(f, session, &palette)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn shows_glyph_and_romanization() {
        let session = SessionController::with_state(17, true, false, false, SilentSpeaker);
        let screen = render(&session);
        assert!(screen.contains("つ"));
        assert!(screen.contains("tsu"));
        assert!(screen.contains("18 / 41"));
    }

    #[test]
    fn challenge_hides_romanization() {
        let session = SessionController::with_state(17, true, true, false, SilentSpeaker);
        let screen = render(&session);
        assert!(screen.contains("つ"));
        assert!(!screen.contains("tsu"));
    }

    #[test]
    fn themes_differ() {
        assert_ne!(Palette::for_theme(Theme::Light), Palette::for_theme(Theme::Dark));
    }
}
