use std::sync::LazyLock;

use regex::Regex;

static UNSAFE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("unsafe-char regex"));
/// Keycap sequences (`1️⃣`, `#⃣`) including their base character.
static KEYCAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[#*0-9]\x{FE0F}?\x{20E3}").expect("keycap regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("space regex"));

/// Strips everything but word characters, whitespace and hyphens, then
/// collapses whitespace runs. Pictographs and path separators are removed.
pub fn sanitize_title(title: &str) -> String {
    let without_keycaps = KEYCAP.replace_all(title, "");
    let stripped = UNSAFE.replace_all(&without_keycaps, "");
    // Emoji glue counts as a word character for the regex.
    let stripped: String = stripped.chars().filter(|c| !is_emoji_glue(*c)).collect();
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

fn is_emoji_glue(c: char) -> bool {
    matches!(c, '\u{200D}' | '\u{20E3}' | '\u{FE00}'..='\u{FE0F}' | '\u{E0020}'..='\u{E007F}')
}
