//! Safe filename generation utilities

use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static INVALID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f\x7f]"#).expect("valid filename pattern"));

static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Longest stem kept, in bytes
const MAX_STEM_LEN: usize = 200;

/// Turn a scraped title into a file stem that stays inside its directory.
///
/// Whitespace runs (tabs and newlines included) collapse to one space. Path
/// separators and other characters invalid on common filesystems become
/// `_`; leading and trailing dots and spaces are dropped so `..` cannot
/// survive; an empty result becomes `video`.
pub fn safe_stem(title: &str) -> String {
    let collapsed = WHITESPACE_RUNS.replace_all(title, " ");
    let replaced = INVALID_CHARS.replace_all(&collapsed, "_");
    let mut stem = replaced
        .trim_matches(|c: char| c == '.' || c == ' ')
        .to_string();

    if stem.len() > MAX_STEM_LEN {
        let mut cut = MAX_STEM_LEN;
        while !stem.is_char_boundary(cut) {
            cut -= 1;
        }
        stem.truncate(cut);
        stem = stem.trim_end_matches(|c: char| c == '.' || c == ' ').to_string();
    }

    if stem.is_empty() {
        return "video".to_string();
    }

    if RESERVED_NAMES.contains(&stem.to_uppercase().as_str()) {
        stem.push('_');
    }

    stem
}

/// `stem` plus `extension`, the extension given with or without its dot
pub fn with_extension(stem: &str, extension: &str) -> String {
    match extension.trim_start_matches('.') {
        "" => stem.to_string(),
        ext => format!("{}.{}", stem, ext),
    }
}

/// Sanitise every title and disambiguate repeats with ` (2)`, ` (3)`, ...
///
/// Depends only on the order of `titles`, so the same listing always maps to
/// the same stems.
pub fn unique_stems<'a, I>(titles: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut stems = Vec::new();

    for title in titles {
        let stem = safe_stem(title);
        let count = seen.entry(stem.to_lowercase()).or_insert(0);
        *count += 1;
        stems.push(if *count == 1 {
            stem
        } else {
            format!("{} ({})", stem, count)
        });
    }

    stems
}

/// Path of the partial file written while a download is in flight
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_stem() {
        assert_eq!(safe_stem("Week 1"), "Week 1");
        assert_eq!(safe_stem("Test Video: Title"), "Test Video_ Title");
        assert_eq!(safe_stem("Video with <invalid> chars"), "Video with _invalid_ chars");
        assert_eq!(safe_stem("  spaced \t  out  "), "spaced out");
        assert_eq!(safe_stem("Week\n1"), "Week 1");
        assert_eq!(safe_stem("Week\r\n\t1\x07"), "Week 1_");
        assert_eq!(safe_stem(""), "video");
        assert_eq!(safe_stem("..."), "video");
        assert_eq!(safe_stem("con"), "con_");
    }

    #[test]
    fn test_titles_cannot_escape_directory() {
        let dir = Path::new("down");
        let titles = ["../../etc/passwd", "..", "a/b\\c", "/absolute", "..\\win"];
        let stems = unique_stems(titles);
        for (title, stem) in titles.iter().zip(&stems) {
            let path = dir.join(with_extension(stem, "mp4"));
            assert_eq!(path.parent(), Some(dir), "{} escaped as {:?}", title, path);
        }
        assert_eq!(stems[0], "_.._etc_passwd");
    }

    #[test]
    fn test_long_titles_are_truncated_on_char_boundary() {
        let title = "é".repeat(150);
        let stem = safe_stem(&title);
        assert!(stem.len() <= MAX_STEM_LEN);
        assert!(stem.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_with_extension() {
        assert_eq!(with_extension("Week 1", "mp4"), "Week 1.mp4");
        assert_eq!(with_extension("Week 1", ".mkv"), "Week 1.mkv");
        assert_eq!(with_extension("Week 1", ""), "Week 1");
    }

    #[test]
    fn test_unique_stems() {
        let stems = unique_stems(["Intro", "Week 1", "intro", "Intro", "Week/1"]);
        assert_eq!(stems, vec!["Intro", "Week 1", "intro (2)", "Intro (3)", "Week_1"]);
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("down/Week 1.mp4")),
            PathBuf::from("down/Week 1.mp4.part")
        );
    }
}
