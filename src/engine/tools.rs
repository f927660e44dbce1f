//! Path filters for the walk

use std::path::Path;

/// OS bookkeeping files that are never worth hashing.
pub fn is_os_hidden_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    matches!(
        name,
        // macOS
        ".DS_Store" | ".AppleDouble" | ".LSOverride"
        // Windows
        | "Thumbs.db" | "ehthumbs.db" | "Desktop.ini" | "$RECYCLE.BIN"
        // Linux
        | ".directory"
    ) || name.starts_with("._") // macOS resource forks
        || name.starts_with(".Trash-")
}

/// Glob match supporting `*` (any run, including empty) and `?` (one char). A leading `!` is ignored.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.strip_prefix('!').unwrap_or(pattern).chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    // Position of the last `*` and the text index it was tried at.
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                star = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                // Let the last `*` swallow one more char and retry.
                Some((sp, st)) => {
                    p = sp + 1;
                    t = st + 1;
                    star = Some((sp, st + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

/// True if `path` matches any exclude pattern (by file name or full path) or is an OS junk file.
pub fn is_excluded(path: &Path, exclude_patterns: &[String]) -> bool {
    if is_os_hidden_file(path) {
        return true;
    }
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let path_str = path.to_str().unwrap_or("");
    exclude_patterns
        .iter()
        .any(|pattern| glob_match(pattern, name) || glob_match(pattern, path_str))
}
