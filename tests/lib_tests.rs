use pipehash::FileDigest;
use pipehash::engine::{OutputFormat, format_digest, glob_match, is_excluded, is_os_hidden_file};
use std::path::PathBuf;

// --- glob_match ---

#[test]
fn test_glob_match_literal() {
    assert!(glob_match("node_modules", "node_modules"));
    assert!(!glob_match("node_modules", "node_module"));
    assert!(!glob_match("node_module", "node_modules"));
}

#[test]
fn test_glob_match_star() {
    assert!(glob_match("*.log", "foo.log"));
    assert!(glob_match("*.log", ".log"));
    assert!(!glob_match("*.log", "foo.log.txt"));
    assert!(glob_match("node_*", "node_modules"));
    assert!(glob_match("*", ""));
    assert!(glob_match("a*b*c", "aXXbYYc"));
    assert!(!glob_match("a*b*c", "aXXbYY"));
}

#[test]
fn test_glob_match_question() {
    assert!(glob_match("file?.txt", "file1.txt"));
    assert!(!glob_match("file?.txt", "file.txt"));
    assert!(!glob_match("file?.txt", "file12.txt"));
}

#[test]
fn test_glob_match_backtracks() {
    assert!(glob_match("*ab", "aab"));
    assert!(glob_match("*a*a", "banana"));
    assert!(!glob_match("*x*y", "xxxx"));
}

#[test]
fn test_glob_match_negation_stripped() {
    assert!(glob_match("!node_modules", "node_modules"));
}

// --- is_os_hidden_file / is_excluded ---

#[test]
fn test_os_hidden_files() {
    for name in [".DS_Store", "Thumbs.db", "Desktop.ini", "._foo", ".Trash-1000"] {
        assert!(is_os_hidden_file(&PathBuf::from("/x").join(name)), "{}", name);
    }
    assert!(!is_os_hidden_file(&PathBuf::from("/x/.gitignore")));
    assert!(!is_os_hidden_file(&PathBuf::from("/x/readme.md")));
}

#[test]
fn test_is_excluded_by_name() {
    let patterns = ["node_modules".to_string()];
    assert!(is_excluded(&PathBuf::from("/foo/node_modules"), &patterns));
    assert!(!is_excluded(&PathBuf::from("/foo/src"), &patterns));
}

#[test]
fn test_is_excluded_by_glob() {
    let patterns = ["*.log".to_string()];
    assert!(is_excluded(&PathBuf::from("/foo/bar/baz.log"), &patterns));
    assert!(!is_excluded(&PathBuf::from("/foo/bar/baz.txt"), &patterns));
}

#[test]
fn test_is_excluded_by_full_path() {
    let patterns = ["/foo/gen/*".to_string()];
    assert!(is_excluded(&PathBuf::from("/foo/gen/out.rs"), &patterns));
    assert!(!is_excluded(&PathBuf::from("/foo/src/out.rs"), &patterns));
}

#[test]
fn test_is_excluded_no_patterns() {
    assert!(!is_excluded(&PathBuf::from("/foo/bar.txt"), &[]));
    assert!(is_excluded(&PathBuf::from("/foo/.DS_Store"), &[]));
}

// --- format_digest ---

fn digest(path: &str, content: &[u8]) -> FileDigest {
    FileDigest {
        path: PathBuf::from(path),
        size: content.len() as u64,
        hash: *blake3::hash(content).as_bytes(),
    }
}

#[test]
fn test_format_plain() {
    let d = digest("dir/a.txt", b"abc");
    let line = format_digest(&d, OutputFormat::Plain);
    assert_eq!(line, format!("{}  dir/a.txt", blake3::hash(b"abc").to_hex()));
}

#[test]
fn test_format_json() {
    let d = digest("dir/a.txt", b"abc");
    let line = format_digest(&d, OutputFormat::Json);
    let v: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(v["path"], "dir/a.txt");
    assert_eq!(v["size"], 3);
    assert_eq!(v["blake3"], blake3::hash(b"abc").to_hex().as_str());
}

#[test]
fn test_output_format_from_flag() {
    assert_eq!(OutputFormat::from_json_flag(true), OutputFormat::Json);
    assert_eq!(OutputFormat::from_json_flag(false), OutputFormat::Plain);
}
