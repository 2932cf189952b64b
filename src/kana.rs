/*
 * src/kana.rs
 * ひらがな一覧 (五十音順) を管理するモジュール
 */

/// ひらがな1文字分のデータ
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KanaEntry {
    pub romanization: &'static str, // 表示用 (ローマ字)
    pub glyph: &'static str,        // 表示・読み上げ用 (ひらがな)
}

/// 収録文字数
pub const KANA_COUNT: usize = 41;

/// ひらがな一覧 (五十音順)
pub static KANA_CATALOG: [KanaEntry; KANA_COUNT] = [
    // あ行
    KanaEntry { romanization: "a", glyph: "あ" },
    KanaEntry { romanization: "i", glyph: "い" },
    KanaEntry { romanization: "u", glyph: "う" },
    KanaEntry { romanization: "e", glyph: "え" },
    KanaEntry { romanization: "o", glyph: "お" },

    // か行
    KanaEntry { romanization: "ka", glyph: "か" },
    KanaEntry { romanization: "ki", glyph: "き" },
    KanaEntry { romanization: "ku", glyph: "く" },
    KanaEntry { romanization: "ke", glyph: "け" },
    KanaEntry { romanization: "ko", glyph: "こ" },

    // さ行
    KanaEntry { romanization: "sa", glyph: "さ" },
    KanaEntry { romanization: "shi", glyph: "し" },
    KanaEntry { romanization: "su", glyph: "す" },
    KanaEntry { romanization: "se", glyph: "せ" },
    KanaEntry { romanization: "so", glyph: "そ" },

    // た行
    KanaEntry { romanization: "ta", glyph: "た" },
    KanaEntry { romanization: "chi", glyph: "ち" },
    KanaEntry { romanization: "tsu", glyph: "つ" },
    KanaEntry { romanization: "te", glyph: "て" },
    KanaEntry { romanization: "to", glyph: "と" },

    // な行 (な のみ)
    KanaEntry { romanization: "na", glyph: "な" },

    // は行 (は を除く)
    KanaEntry { romanization: "hi", glyph: "ひ" },
    KanaEntry { romanization: "fu", glyph: "ふ" },
    KanaEntry { romanization: "he", glyph: "へ" },
    KanaEntry { romanization: "ho", glyph: "ほ" },

    // ま行
    KanaEntry { romanization: "ma", glyph: "ま" },
    KanaEntry { romanization: "mi", glyph: "み" },
    KanaEntry { romanization: "mu", glyph: "む" },
    KanaEntry { romanization: "me", glyph: "め" },
    KanaEntry { romanization: "mo", glyph: "も" },

    // や行
    KanaEntry { romanization: "ya", glyph: "や" },
    KanaEntry { romanization: "yu", glyph: "ゆ" },
    KanaEntry { romanization: "yo", glyph: "よ" },

    // ら行
    KanaEntry { romanization: "ra", glyph: "ら" },
    KanaEntry { romanization: "ri", glyph: "り" },
    KanaEntry { romanization: "ru", glyph: "る" },
    KanaEntry { romanization: "re", glyph: "れ" },
    KanaEntry { romanization: "ro", glyph: "ろ" },

    // わ行 + ん
    KanaEntry { romanization: "wa", glyph: "わ" },
    KanaEntry { romanization: "wo", glyph: "を" },
    KanaEntry { romanization: "n", glyph: "ん" },
];

/// 指定位置の文字を返す (範囲外は呼び出し側の不変条件違反)
pub fn entry(position: usize) -> &'static KanaEntry {
    &KANA_CATALOG[position]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_has_41_unique_entries() {
        assert_eq!(KANA_CATALOG.len(), 41);
        let glyphs: HashSet<_> = KANA_CATALOG.iter().map(|e| e.glyph).collect();
        let romaji: HashSet<_> = KANA_CATALOG.iter().map(|e| e.romanization).collect();
        assert_eq!(glyphs.len(), 41);
        assert_eq!(romaji.len(), 41);
    }

    #[test]
    fn catalog_is_in_gojuon_order() {
        let order: Vec<&str> = KANA_CATALOG.iter().map(|e| e.romanization).collect();
        let expected = "a i u e o ka ki ku ke ko sa shi su se so ta chi tsu te to na \
                        hi fu he ho ma mi mu me mo ya yu yo ra ri ru re ro wa wo n";
        assert_eq!(order, expected.split_whitespace().collect::<Vec<_>>());
    }

    #[test]
    fn every_glyph_is_a_single_hiragana_char() {
        for e in KANA_CATALOG.iter() {
            let mut chars = e.glyph.chars();
            let c = chars.next().unwrap();
            assert!(chars.next().is_none(), "{} は1文字ではない", e.glyph);
            assert!(('\u{3041}'..='\u{3096}').contains(&c), "{} はひらがなではない", e.glyph);
        }
    }

    #[test]
    fn entry_lookup_matches_catalog() {
        assert_eq!(entry(0).glyph, "あ");
        assert_eq!(entry(6).romanization, "ki");
        assert_eq!(entry(KANA_COUNT - 1).glyph, "ん");
    }
}
