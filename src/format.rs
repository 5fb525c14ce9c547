//! Display formatting helpers.

/// Format an integer with spaces as thousands separators.
///
/// ```
/// # use imgcomp::format::format_int_with_spaces;
/// assert_eq!(format_int_with_spaces(1234567), "1 234 567");
/// assert_eq!(format_int_with_spaces(-4096), "-4 096");
/// ```
pub fn format_int_with_spaces(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// Wrap a path onto several lines at `/` boundaries.
///
/// Segments are kept whole; a new line starts whenever appending the next
/// `/segment` would push the current line past `max_len`. Each continuation
/// line starts with the `/` it was split at. A single segment longer than
/// `max_len` still gets its own line rather than being cut.
pub fn wrap_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len || !path.contains('/') {
        return path.to_string();
    }

    let mut out = String::with_capacity(path.len() + 8);
    let mut line_len = 0;

    for (i, part) in path.split('/').enumerate() {
        let seg_len = part.chars().count() + usize::from(i > 0);
        if line_len > 0 && line_len + seg_len > max_len {
            out.push('\n');
            line_len = 0;
        }
        if i > 0 {
            out.push('/');
        }
        out.push_str(part);
        line_len += seg_len;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_numbers_have_no_separator() {
        assert_eq!(format_int_with_spaces(0), "0");
        assert_eq!(format_int_with_spaces(999), "999");
        assert_eq!(format_int_with_spaces(-999), "-999");
    }

    #[test]
    fn separators_every_three_digits() {
        assert_eq!(format_int_with_spaces(1000), "1 000");
        assert_eq!(format_int_with_spaces(480000), "480 000");
        assert_eq!(format_int_with_spaces(12345678), "12 345 678");
    }

    #[test]
    fn extreme_values() {
        assert_eq!(
            format_int_with_spaces(i64::MIN),
            "-9 223 372 036 854 775 808"
        );
    }

    #[test]
    fn short_path_unchanged() {
        assert_eq!(wrap_path("/tmp/a.png", 40), "/tmp/a.png");
    }

    #[test]
    fn path_without_slashes_unchanged() {
        let name = "a-very-long-file-name-without-directories.png";
        assert_eq!(wrap_path(name, 10), name);
    }

    #[test]
    fn wraps_at_slash_boundaries() {
        assert_eq!(
            wrap_path("/home/user/photos/a.png", 10),
            "/home/user\n/photos\n/a.png"
        );
    }

    #[test]
    fn relative_path_first_segment_has_no_slash() {
        assert_eq!(
            wrap_path("pictures/2024/holiday/beach.jpg", 14),
            "pictures/2024\n/holiday\n/beach.jpg"
        );
    }

    #[test]
    fn oversized_segment_gets_own_line() {
        assert_eq!(
            wrap_path("/a/averyveryverylongsegment/b", 8),
            "/a\n/averyveryverylongsegment\n/b"
        );
    }
}
