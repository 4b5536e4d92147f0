/// Characters replaced by a space before whitespace collapsing.
/// Covers what at least one common filesystem or shell treats specially.
const UNSAFE_CHARS: &[char] = &[
    '\\', '/', ':', '*', '?', '"', '<', '>', '|', '#', '%', '{', '}', '[', ']', '^', '~', '`', '+',
    '=', ',', ';',
];

const MAX_LEN: usize = 120;

/// Map an arbitrary user-supplied label to a filesystem-safe base name.
///
/// Empty or whitespace-only input falls back to `default`. The result is
/// bounded to 120 characters, and the transformation is idempotent.
pub fn sanitize(name: &str, default: &str) -> String {
    if name.trim().is_empty() {
        return default.to_owned();
    }

    let cleaned = name
        .split(|c: char| UNSAFE_CHARS.contains(&c) || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    // A name made only of unsafe characters cleans down to nothing
    if cleaned.is_empty() {
        return default.to_owned();
    }

    // Truncation can leave a trailing space, trim it so the
    // transformation stays idempotent
    let truncated: String = cleaned.chars().take(MAX_LEN).collect();
    truncated.trim_end().to_owned()
}
