//! File name sanitization for lookups under the download directory

use std::path::is_separator;

/// Final path component of a user-supplied name
///
/// Splits on the platform's path separators, so on Unix a `\` is an ordinary
/// file name character. Names that are empty, `.`, `..`, or contain NUL
/// resolve to nothing.
pub(crate) fn basename(input: &str) -> Option<&str> {
    let name = input.rsplit(is_separator).next()?;
    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        return None;
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_names() {
        assert_eq!(basename("a.jpg"), Some("a.jpg"));
        assert_eq!(basename("photo 01 (1).png"), Some("photo 01 (1).png"));
        assert_eq!(basename(".hidden"), Some(".hidden"));
        assert_eq!(basename("..name"), Some("..name"));
    }

    #[test]
    fn strips_directory_components() {
        assert_eq!(basename("../../etc/passwd"), Some("passwd"));
        assert_eq!(basename("/etc/shadow"), Some("shadow"));
        assert_eq!(basename("album/a.jpg"), Some("a.jpg"));
        assert_eq!(basename("a/b/c/d.txt"), Some("d.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn backslash_is_part_of_the_name_on_unix() {
        assert_eq!(basename("a\\b.jpg"), Some("a\\b.jpg"));
        assert_eq!(basename("..\\..\\win.ini"), Some("..\\..\\win.ini"));
        assert_eq!(basename("album/a\\b.jpg"), Some("a\\b.jpg"));
    }

    #[cfg(windows)]
    #[test]
    fn backslash_separates_on_windows() {
        assert_eq!(basename("..\\..\\windows\\win.ini"), Some("win.ini"));
        assert_eq!(basename("a/b\\c/d.txt"), Some("d.txt"));
        assert_eq!(basename("a\\.."), None);
    }

    #[test]
    fn rejects_names_without_a_file_component() {
        for input in ["", ".", "..", "/", "../", "foo/..", "dir/", "bad\0name"] {
            assert_eq!(basename(input), None, "input {input:?}");
        }
    }
}
