//! services/reader/src/adapters/markup.rs
//!
//! Cleans the inline HTML the content API embeds in translation text.

use regex::Regex;
use std::sync::LazyLock;

// Footnote references look like `<sup foot_note=12345>1</sup>`.
static FOOTNOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<sup.*?</sup>").expect("footnote pattern is valid"));

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<.*?>").expect("tag pattern is valid"));

/// Removes footnote markers (and their numbers) from a translation.
pub fn strip_footnotes(text: &str) -> String {
    FOOTNOTE.replace_all(text, "").into_owned()
}

/// Removes footnote markers and then every remaining tag, keeping tag contents.
pub fn strip_markup(text: &str) -> String {
    let without_footnotes = FOOTNOTE.replace_all(text, "");
    TAG.replace_all(&without_footnotes, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footnotes_are_removed_with_their_numbers() {
        let raw = "In the name of Allah<sup foot_note=195932>1</sup>, the Most Gracious";
        assert_eq!(
            strip_footnotes(raw),
            "In the name of Allah, the Most Gracious"
        );
    }

    #[test]
    fn other_tags_survive_footnote_stripping() {
        let raw = "<i>Alif Lam Mim</i><sup foot_note=1>2</sup>";
        assert_eq!(strip_footnotes(raw), "<i>Alif Lam Mim</i>");
        assert_eq!(strip_markup(raw), "Alif Lam Mim");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(strip_footnotes("no markup here"), "no markup here");
        assert_eq!(strip_markup("  padded "), "padded");
    }
}
