//! Rename annotations on reported file paths.
//!
//! Two forms are recognized, tried in order:
//! - scoped: `src/{old.rs => new.rs}` (shared prefix and suffix kept outside the braces)
//! - simple: `old.rs => lib/new.rs` (no shared part)
//!
//! Anything else, including malformed annotations, is a plain path.

use tracing::debug;

const ARROW: &str = " => ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenamePath<'a> {
    Plain(&'a str),
    Simple { from: String, to: String },
    Scoped { from: String, to: String },
}

impl<'a> RenamePath<'a> {
    pub fn parse(path: &'a str) -> Self {
        if path.contains('{') || path.contains('}') {
            if let Some((from, to)) = parse_scoped(path) {
                return RenamePath::Scoped { from, to };
            }
        } else if let Some((from, to)) = parse_simple(path) {
            return RenamePath::Simple { from, to };
        }
        if path.contains(ARROW) {
            debug!(path, "malformed rename annotation, keeping path as-is");
        }
        RenamePath::Plain(path)
    }

    pub fn is_rename(&self) -> bool {
        !matches!(self, RenamePath::Plain(_))
    }
}

/// A candidate rename found in one history key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEdge {
    /// The literal key the annotated entries were filed under.
    pub key: String,
    pub from: String,
    pub to: String,
}

pub fn extract_edge(path: &str) -> Option<RenameEdge> {
    match RenamePath::parse(path) {
        RenamePath::Plain(_) => None,
        RenamePath::Simple { from, to } | RenamePath::Scoped { from, to } => Some(RenameEdge {
            key: path.to_string(),
            from,
            to,
        }),
    }
}

fn parse_scoped(path: &str) -> Option<(String, String)> {
    let open = path.find('{')?;
    let close = open + path[open..].find('}')?;
    let prefix = &path[..open];
    let suffix = &path[close + 1..];
    if suffix.contains('{') || suffix.contains('}') {
        return None;
    }
    let (left, right) = path[open + 1..close].split_once(ARROW)?;
    if right.contains(ARROW) || (left.is_empty() && right.is_empty()) {
        return None;
    }
    Some((join_path(prefix, left, suffix), join_path(prefix, right, suffix)))
}

fn parse_simple(path: &str) -> Option<(String, String)> {
    let (from, to) = path.split_once(ARROW)?;
    if from.trim().is_empty() || to.trim().is_empty() || to.contains(ARROW) {
        return None;
    }
    Some((from.to_string(), to.to_string()))
}

fn join_path(prefix: &str, middle: &str, suffix: &str) -> String {
    let joined = format!("{prefix}{middle}{suffix}");
    let mut out = String::with_capacity(joined.len());
    let mut after_slash = false;
    for ch in joined.chars() {
        if ch == '/' {
            if after_slash {
                continue;
            }
            after_slash = true;
        } else {
            after_slash = false;
        }
        out.push(ch);
    }
    // `{ => src}/a.rs` means the file used to live at the root
    if prefix.is_empty() && middle.is_empty() {
        return out.trim_start_matches('/').to_string();
    }
    out
}

/// Render a rename the way `git log --stat` does: the common directory
/// prefix and suffix stay outside the braces.
pub fn annotate(from: &str, to: &str) -> String {
    if from == to {
        return from.to_string();
    }

    let common_head: usize = from
        .chars()
        .zip(to.chars())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .sum();
    let prefix_len = from[..common_head].rfind('/').map_or(0, |i| i + 1);

    let common_tail: usize = from
        .chars()
        .rev()
        .zip(to.chars().rev())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .sum();
    let tail = common_tail.min(from.len() - prefix_len).min(to.len() - prefix_len);
    let tail_start = from.len() - tail;
    let suffix_len = if from.is_char_boundary(tail_start) {
        from[tail_start..].find('/').map_or(0, |i| tail - i)
    } else {
        0
    };

    let prefix = &from[..prefix_len];
    let suffix = &from[from.len() - suffix_len..];
    if prefix.is_empty() && suffix.is_empty() {
        return format!("{from}{ARROW}{to}");
    }
    let old_mid = &from[prefix_len..from.len() - suffix_len];
    let new_mid = &to[prefix_len..to.len() - suffix_len];
    format!("{prefix}{{{old_mid}{ARROW}{new_mid}}}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scoped(from: &str, to: &str) -> RenamePath<'static> {
        RenamePath::Scoped {
            from: from.into(),
            to: to.into(),
        }
    }

    #[test]
    fn scoped_rename_in_directory() {
        assert_eq!(
            RenamePath::parse("src/{old.ts => new.ts}"),
            scoped("src/old.ts", "src/new.ts")
        );
    }

    #[test]
    fn scoped_rename_with_suffix() {
        assert_eq!(
            RenamePath::parse("{lib => src/lib}/a.rs"),
            scoped("lib/a.rs", "src/lib/a.rs")
        );
    }

    #[test]
    fn empty_branch_collapses_separators() {
        assert_eq!(
            RenamePath::parse("src/{ => util}/io.rs"),
            scoped("src/io.rs", "src/util/io.rs")
        );
        assert_eq!(
            RenamePath::parse("src/{legacy => }/io.rs"),
            scoped("src/legacy/io.rs", "src/io.rs")
        );
        assert_eq!(RenamePath::parse("{ => src}/a.rs"), scoped("a.rs", "src/a.rs"));
    }

    #[test]
    fn whole_path_rename() {
        assert_eq!(
            RenamePath::parse("README => docs/README.md"),
            RenamePath::Simple {
                from: "README".into(),
                to: "docs/README.md".into()
            }
        );
    }

    #[test]
    fn plain_paths_are_not_renames() {
        assert_eq!(RenamePath::parse("src/main.rs"), RenamePath::Plain("src/main.rs"));
        assert!(!RenamePath::parse("a=>b").is_rename());
        assert!(extract_edge("src/main.rs").is_none());
    }

    #[test]
    fn malformed_annotations_fail_open() {
        for path in [
            "src/{a => b",
            "src/a => b}",
            "src/{ => }/x.rs",
            "{a => b}/{c => d}",
            "a => b => c",
            " => b",
        ] {
            assert_eq!(RenamePath::parse(path), RenamePath::Plain(path), "{path}");
        }
    }

    #[test]
    fn braces_without_arrow_are_plain() {
        assert_eq!(
            RenamePath::parse("templates/{name}.html"),
            RenamePath::Plain("templates/{name}.html")
        );
    }

    #[test]
    fn edge_keeps_literal_key() {
        let edge = extract_edge("src/{old.ts => new.ts}").unwrap();
        assert_eq!(edge.key, "src/{old.ts => new.ts}");
        assert_eq!(edge.from, "src/old.ts");
        assert_eq!(edge.to, "src/new.ts");
    }

    #[test]
    fn annotate_uses_common_directory() {
        assert_eq!(annotate("src/old.ts", "src/new.ts"), "src/{old.ts => new.ts}");
        assert_eq!(annotate("a/x.rs", "b/x.rs"), "{a => b}/x.rs");
        assert_eq!(annotate("lib/a.rs", "src/lib/a.rs"), "{lib => src/lib}/a.rs");
        assert_eq!(annotate("src/a/x.rs", "src/x.rs"), "src/{a/x.rs => x.rs}");
    }

    #[test]
    fn annotate_without_common_part_uses_whole_form() {
        assert_eq!(annotate("a.rs", "src/a.rs"), "a.rs => src/a.rs");
        assert_eq!(annotate("x", "y"), "x => y");
        assert_eq!(annotate("same.rs", "same.rs"), "same.rs");
    }

    #[test]
    fn annotated_paths_parse_back() {
        let cases = [
            ("src/old.ts", "src/new.ts"),
            ("lib/a.rs", "src/lib/a.rs"),
            ("docs/ü/readme.md", "docs/é/readme.md"),
            ("a.rs", "src/a.rs"),
        ];
        for (from, to) in cases {
            let edge = extract_edge(&annotate(from, to)).unwrap();
            assert_eq!((edge.from.as_str(), edge.to.as_str()), (from, to));
        }
    }
}
