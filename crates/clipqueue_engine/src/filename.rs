use sha2::{Digest, Sha256};

const MAX_STEM_CHARS: usize = 80;

/// Windows-safe, deterministic file stem for a video: `{title}--{short_hash(url)}`.
///
/// The hash keeps two videos whose titles sanitize to the same text apart.
pub fn artifact_stem(title: &str, url: &str) -> String {
    format!("{}--{}", safe_stem(title), short_hash(url))
}

fn safe_stem(title: &str) -> String {
    let mut compacted = String::with_capacity(title.len());
    let mut prev_underscore = false;
    for c in title.chars().map(|c| if is_forbidden(c) { '_' } else { c }) {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    let mut stem: String = compacted
        .trim_matches(&['_', ' ', '.'][..])
        .chars()
        .take(MAX_STEM_CHARS)
        .collect();
    // Truncation can leave a dangling space or dot before the hash.
    stem.truncate(stem.trim_end_matches(&[' ', '.'][..]).len());

    if stem.is_empty() {
        stem = "video".to_string();
    }
    stem
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}')
}

fn short_hash(input: &str) -> String {
    use std::fmt::Write;

    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
