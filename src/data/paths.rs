//! Path text manipulation for paths that end up inside generated script lines.
//!
//! Manifest and material files store game-relative paths with forward slashes
//! (`objects/mechs/atlas/body/atlas_body.cga`). The generated commands embed
//! them in Python string literals on Windows, where a single backslash starts an
//! escape sequence, so every separator has to be written as `\\`.

/// The escaped separator as it appears inside generated string literals.
pub const ESCAPED_SEPARATOR: &str = "\\\\";

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Write every `/` or `\` as an escaped separator (`\\`). Each separator is
/// doubled on its own, so a UNC prefix `\\` becomes four backslashes.
pub fn escape_separators(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 8);
    for c in path.chars() {
        if is_separator(c) {
            out.push_str(ESCAPED_SEPARATOR);
        } else {
            out.push(c);
        }
    }
    out
}

/// Whether `path` already reads as escaped script text: it has separators,
/// all of them backslashes in runs of even length. A leading run of exactly
/// two is a UNC prefix, not an escaped root.
pub fn is_escaped(path: &str) -> bool {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, c) in path.char_indices() {
        match (c, start) {
            ('/', _) => return false,
            ('\\', None) => start = Some(i),
            ('\\', Some(_)) => {}
            (_, Some(s)) => {
                runs.push((s, i - s));
                start = None;
            }
            (_, None) => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, path.len() - s));
    }

    !runs.is_empty()
        && runs.iter().all(|(_, len)| len % 2 == 0)
        && !matches!(runs.first(), Some((0, 2)))
}

/// Escape a directory for embedding, with a trailing escaped separator.
/// Text that is already escaped only gets the trailing separator added, so
/// escaping happens once per raw input.
pub fn escape_dir(dir: &str) -> String {
    if is_escaped(dir) {
        if dir.ends_with(ESCAPED_SEPARATOR) {
            dir.to_string()
        } else {
            format!("{dir}{ESCAPED_SEPARATOR}")
        }
    } else {
        escape_separators(&with_trailing_separator(dir))
    }
}

/// Append a backslash unless `path` already ends with a separator.
pub fn with_trailing_separator(path: &str) -> String {
    if path.ends_with(is_separator) {
        path.to_string()
    } else {
        format!("{path}\\")
    }
}

/// Last path segment, splitting on either separator.
pub fn last_segment(path: &str) -> &str {
    path.rsplit(is_separator).next().unwrap_or(path)
}

/// Extension of the last segment without the dot, if there is one.
pub fn extension(path: &str) -> Option<&str> {
    let segment = last_segment(path);
    segment
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|_| !segment.starts_with('.') || segment.matches('.').count() > 1)
}

/// Replace the extension of the last segment with `ext` (given without a dot).
/// Paths without an extension get one appended.
pub fn replace_extension(path: &str, ext: &str) -> String {
    let segment_start = path.len() - last_segment(path).len();
    match path[segment_start..].rfind('.') {
        Some(dot) if dot > 0 => format!("{}.{ext}", &path[..segment_start + dot]),
        _ => format!("{path}.{ext}"),
    }
}

/// Relative game path converted to the platform's separators, for reading it
/// from disk under the base directory.
pub fn to_native(path: &str) -> std::path::PathBuf {
    path.split(is_separator).filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn single_separator_is_doubled() {
        assert_eq!(escape_separators(r"a\b"), r"a\\b");
        assert_eq!(escape_separators("a/b/c.dds"), r"a\\b\\c.dds");
    }

    #[test]
    fn runs_are_not_collapsed() {
        assert_eq!(escape_separators(r"\\server\mwo"), r"\\\\server\\mwo");
        assert_eq!(escape_separators("a//b"), r"a\\\\b");
    }

    #[test]
    fn escaped_text_detection() {
        assert!(is_escaped(r"d:\\depot\\mwo\\"));
        assert!(is_escaped(r"\\\\server\\mwo"));
        assert!(!is_escaped(r"d:\depot\mwo"));
        assert!(!is_escaped(r"\\server\mwo"));
        assert!(!is_escaped(r"\\server"));
        assert!(!is_escaped("d:/depot"));
        assert!(!is_escaped("atlas"));
    }

    #[test]
    fn directories_are_escaped_once() {
        let once = escape_dir(r"d:\depot\mwo");
        assert_eq!(once, r"d:\\depot\\mwo\\");
        assert_eq!(escape_dir(&once), once);
        assert_eq!(escape_dir(r"d:\\depot\\mwo"), once);
        assert_eq!(escape_dir(r"\\server\mwo"), r"\\\\server\\mwo\\");
    }

    #[test]
    fn trailing_separator() {
        assert_eq!(with_trailing_separator(r"d:\depot"), r"d:\depot\");
        assert_eq!(with_trailing_separator(r"d:\depot\"), r"d:\depot\");
        assert_eq!(with_trailing_separator("/srv/mwo/"), "/srv/mwo/");
    }

    #[test]
    fn extension_rewrites() {
        assert_eq!(
            replace_extension("objects/mechs/atlas/body/leftarm.cgf", "dae"),
            "objects/mechs/atlas/body/leftarm.dae"
        );
        assert_eq!(replace_extension("textures/atlas_diff.tif", "dds"), "textures/atlas_diff.dds");
        assert_eq!(replace_extension("v1.2/noext", "dds"), "v1.2/noext.dds");
        assert_eq!(extension("a/b/leftarm.CGA"), Some("CGA"));
        assert_eq!(extension("a.b/leftarm"), None);
    }

    #[test]
    fn segments() {
        assert_eq!(last_segment("objects/mechs/atlas/body/atlas_body"), "atlas_body");
        assert_eq!(last_segment(r"objects\mechs\leftarm.dae"), "leftarm.dae");
        assert_eq!(last_segment("leftarm.dae"), "leftarm.dae");
    }
}
