//! Validation of single path components.

/// Characters that may never appear in a name.
const FORBIDDEN: [char; 4] = ['/', '\\', ':', '\0'];

/// Returns `true` if `name` is a valid path component.
///
/// A name is rejected when it is empty, contains `/`, `\`, `:` or NUL, or
/// contains two consecutive dots anywhere. A single dot, including a trailing
/// one (`"file."`), is allowed.
///
/// ```rust
/// use vfs_overlay::is_valid_name;
///
/// assert!(is_valid_name("file.txt"));
/// assert!(is_valid_name("file."));
/// assert!(!is_valid_name(".."));
/// assert!(!is_valid_name("a/b"));
/// ```
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(FORBIDDEN) && !name.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        for name in ["a", "file.txt", "file.", ".hidden", "with space", "ünïcode", "."] {
            assert!(is_valid_name(name), "{name:?}");
        }
    }

    #[test]
    fn rejects_empty() {
        assert!(!is_valid_name(""));
    }

    #[test]
    fn rejects_separators_and_nul() {
        for name in ["a/b", "/", "a\\b", "c:", "nul\0byte"] {
            assert!(!is_valid_name(name), "{name:?}");
        }
    }

    #[test]
    fn rejects_consecutive_dots() {
        for name in ["..", "...", "a..b", "file..", "..hidden"] {
            assert!(!is_valid_name(name), "{name:?}");
        }
    }
}
