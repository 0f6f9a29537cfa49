//! Glob expansion for manifest entries.
//!
//! Supported syntax, per `/`-separated component:
//!
//! | token    | matches                                         |
//! |----------|-------------------------------------------------|
//! | `*`      | any run of characters                           |
//! | `?`      | exactly one character                           |
//! | `[a-z]`  | one character from the class (`[!..]` negates)  |
//! | `**`     | zero or more directory levels (whole component) |
//!
//! Wildcards never match hidden entries (leading `.`) unless the component
//! itself starts with `.`. A trailing `/` keeps directories only. Results are
//! produced top-down in file-name order, so a directory always precedes its
//! contents.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use modpack_core::{config::validate_pattern, ConfigError};

use crate::error::{io_err, SyncError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Wildcard(String),
    Recursive,
}

/// A parsed manifest pattern, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
    dirs_only: bool,
}

impl Pattern {
    /// Parse and validate `raw`.
    pub fn parse(raw: &str) -> Result<Self, SyncError> {
        validate_pattern(raw)?;

        let segments: Vec<Segment> = raw
            .split(['/', '\\'])
            .filter(|part| !part.is_empty() && *part != ".")
            .map(|part| {
                if part == "**" {
                    Segment::Recursive
                } else if part.contains(['*', '?', '[']) {
                    Segment::Wildcard(part.to_owned())
                } else {
                    Segment::Literal(part.to_owned())
                }
            })
            .collect();

        if segments.is_empty() {
            return Err(ConfigError::InvalidPattern {
                pattern: raw.to_owned(),
                reason: "pattern names the project root itself",
            }
            .into());
        }

        Ok(Self {
            raw: raw.to_owned(),
            segments,
            dirs_only: raw.ends_with(['/', '\\']),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `true` if any component contains a wildcard.
    pub fn is_glob(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| !matches!(segment, Segment::Literal(_)))
    }

    /// The pattern as a plain relative path. Only meaningful when
    /// [`is_glob`](Self::is_glob) is `false`.
    pub fn literal_path(&self) -> PathBuf {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Literal(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Expand against `root`, returning matches relative to `root`.
    ///
    /// No matches is not an error.
    pub fn expand(&self, root: &Path) -> Result<Vec<PathBuf>, SyncError> {
        let mut current = vec![PathBuf::new()];
        let last = self.segments.len() - 1;

        for (index, segment) in self.segments.iter().enumerate() {
            let is_last = index == last;
            let mut next = Vec::new();

            for base in &current {
                match segment {
                    Segment::Literal(name) => {
                        let candidate = base.join(name);
                        let full = root.join(&candidate);
                        let keep = if is_last {
                            full.symlink_metadata().is_ok()
                        } else {
                            full.is_dir()
                        };
                        if keep {
                            next.push(candidate);
                        }
                    }
                    Segment::Wildcard(pattern) => {
                        let dir = root.join(base);
                        if !dir.is_dir() {
                            continue;
                        }
                        for name in sorted_child_names(&dir)? {
                            if is_hidden(&name) && !pattern.starts_with('.') {
                                continue;
                            }
                            if !wildcard_match(pattern, &name) {
                                continue;
                            }
                            let candidate = base.join(&name);
                            if is_last || root.join(&candidate).is_dir() {
                                next.push(candidate);
                            }
                        }
                    }
                    Segment::Recursive => {
                        let dir = root.join(base);
                        if !dir.is_dir() {
                            continue;
                        }
                        let walker = WalkDir::new(&dir)
                            .follow_links(false)
                            .sort_by_file_name()
                            .into_iter()
                            .filter_entry(|e| {
                                e.depth() == 0
                                    || !e.file_name().to_str().is_some_and(is_hidden)
                            });
                        for entry in walker {
                            let entry = entry.map_err(|e| walk_err(&dir, e))?;
                            if !is_last && !entry.file_type().is_dir() {
                                continue;
                            }
                            let Ok(rest) = entry.path().strip_prefix(&dir) else {
                                continue;
                            };
                            if rest.as_os_str().is_empty() {
                                next.push(base.clone());
                            } else {
                                next.push(base.join(rest));
                            }
                        }
                    }
                }
            }

            current = dedup(next);
        }

        if self.dirs_only {
            current.retain(|relative| root.join(relative).is_dir());
        }
        Ok(current)
    }
}

fn dedup(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// UTF-8 child names of `dir`, sorted. Non-UTF-8 names cannot match a
/// wildcard and are left out.
fn sorted_child_names(dir: &Path) -> Result<Vec<String>, SyncError> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

pub(crate) fn walk_err(fallback: &Path, err: walkdir::Error) -> SyncError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| fallback.to_path_buf());
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
    io_err(path, source)
}

// ---------------------------------------------------------------------------
// Component matching
// ---------------------------------------------------------------------------

/// Match a single path component against a wildcard pattern.
fn wildcard_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    let (mut pi, mut ni) = (0, 0);
    // Position of the last `*` and the name index it is currently absorbing up to.
    let mut star: Option<(usize, usize)> = None;

    while ni < n.len() {
        let step = match p.get(pi) {
            Some('*') => {
                star = Some((pi, ni));
                pi += 1;
                continue;
            }
            Some('?') => Some(1),
            Some('[') => match match_class(&p[pi..], n[ni]) {
                Some((true, len)) => Some(len),
                Some((false, _)) => None,
                // Unterminated class: `[` is literal.
                None => (n[ni] == '[').then_some(1),
            },
            Some(&c) => (c == n[ni]).then_some(1),
            None => None,
        };

        if let Some(len) = step {
            pi += len;
            ni += 1;
        } else if let Some((star_pi, star_ni)) = star {
            pi = star_pi + 1;
            ni = star_ni + 1;
            star = Some((star_pi, star_ni + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}

/// Match `c` against the bracket class at the start of `class`.
///
/// Returns `(matched, consumed_len)`, or `None` when the class is unterminated.
fn match_class(class: &[char], c: char) -> Option<(bool, usize)> {
    let mut start = 1;
    let negate = matches!(class.get(start), Some('!') | Some('^'));
    if negate {
        start += 1;
    }
    // A `]` directly after the opening bracket is a member, not the end.
    let close = start + 1 + class.get(start + 1..)?.iter().position(|&ch| ch == ']')?;
    let members = &class[start..close];

    let mut matched = false;
    let mut k = 0;
    while k < members.len() {
        if k + 2 < members.len() && members[k + 1] == '-' {
            matched |= members[k] <= c && c <= members[k + 2];
            k += 3;
        } else {
            matched |= members[k] == c;
            k += 1;
        }
    }
    Some((matched != negate, close + 1))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
