//! Ant-style path patterns.
//!
//! Patterns are split on `/` into segments, each of which is one of:
//!
//! | Segment | Matches |
//! |---------|---------|
//! | `users` | exactly that segment |
//! | `*.css`, `file?.txt` | one segment; `*` is any run of characters, `?` one character |
//! | `{id}` | one non-empty segment, captured as variable `id` |
//! | `**` | zero or more whole segments |
//!
//! Empty segments are ignored on both sides, so `/admin` and `/admin/`
//! are the same path for matching purposes.

use crate::params::Params;

/// Kind of a parsed pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Matches the segment text exactly.
    Literal(String),
    /// Segment containing `*` or `?`.
    Glob(String),
    /// Named variable, e.g. `{id}`.
    Variable(String),
    /// `**`
    AnyDepth,
}

impl Segment {
    fn parse(raw: &str, case_sensitive: bool) -> Self {
        let fold = |s: &str| {
            if case_sensitive {
                s.to_string()
            } else {
                s.to_ascii_lowercase()
            }
        };

        if raw == "**" {
            Self::AnyDepth
        } else if let Some(name) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Self::Variable(name.to_string())
        } else if raw.contains(|c: char| c == '*' || c == '?') {
            Self::Glob(fold(raw))
        } else {
            Self::Literal(fold(raw))
        }
    }

    fn matches(&self, segment: &str, case_sensitive: bool, params: &mut Params) -> bool {
        match self {
            Self::Literal(literal) => {
                if case_sensitive {
                    literal == segment
                } else {
                    literal.eq_ignore_ascii_case(segment)
                }
            }
            Self::Glob(glob) => {
                if case_sensitive {
                    glob_match(glob.as_bytes(), segment.as_bytes())
                } else {
                    glob_match(glob.as_bytes(), segment.to_ascii_lowercase().as_bytes())
                }
            }
            Self::Variable(name) => {
                params.push(name.as_str(), segment);
                true
            }
            Self::AnyDepth => true,
        }
    }
}

/// Matches one segment against a glob made of literals, `*` and `?`.
fn glob_match(glob: &[u8], text: &[u8]) -> bool {
    let (mut g, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        match glob.get(g) {
            Some(b'*') => {
                star = Some((g, t));
                g += 1;
            }
            Some(&c) if c == b'?' || c == text[t] => {
                g += 1;
                t += 1;
            }
            _ => match star {
                Some((star_g, star_t)) => {
                    g = star_g + 1;
                    t = star_t + 1;
                    star = Some((star_g, star_t + 1));
                }
                None => return false,
            },
        }
    }

    glob[g..].iter().all(|&c| c == b'*')
}

/// A compiled ant-style path pattern.
///
/// # Example
///
/// ```rust
/// use bastion_matcher::PathPattern;
///
/// let admin = PathPattern::new("/admin/**");
/// assert!(admin.matches("/admin"));
/// assert!(admin.matches("/admin/users/42"));
/// assert!(!admin.matches("/administrator"));
///
/// let assets = PathPattern::new("/static/*.css");
/// assert!(assets.matches("/static/site.css"));
/// assert!(!assets.matches("/static/css/site.css"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    case_sensitive: bool,
}

impl PathPattern {
    /// Compiles a case-sensitive pattern.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self::compile(pattern.into(), true)
    }

    /// Compiles a pattern that ignores ASCII case.
    #[must_use]
    pub fn case_insensitive(pattern: impl Into<String>) -> Self {
        Self::compile(pattern.into(), false)
    }

    fn compile(raw: String, case_sensitive: bool) -> Self {
        let segments = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| Segment::parse(s, case_sensitive))
            .collect();
        Self {
            raw,
            segments,
            case_sensitive,
        }
    }

    /// Returns the pattern text as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true if the pattern matches every path (`/**`).
    #[must_use]
    pub fn matches_any_path(&self) -> bool {
        matches!(self.segments.as_slice(), [Segment::AnyDepth])
    }

    /// Returns true if `path` matches this pattern.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.extract(path).is_some()
    }

    /// Matches `path` and returns the captured `{name}` variables.
    #[must_use]
    pub fn extract(&self, path: &str) -> Option<Params> {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        self.match_segments(&self.segments, &path_segments, &mut params)
            .then_some(params)
    }

    fn match_segments(&self, pattern: &[Segment], path: &[&str], params: &mut Params) -> bool {
        match pattern.split_first() {
            None => path.is_empty(),
            Some((Segment::AnyDepth, rest)) => {
                if rest.is_empty() {
                    return true;
                }
                (0..=path.len()).any(|skip| {
                    let mark = params.len();
                    let matched = self.match_segments(rest, &path[skip..], params);
                    if !matched {
                        params.truncate(mark);
                    }
                    matched
                })
            }
            Some((segment, rest)) => match path.split_first() {
                Some((first, tail)) => {
                    segment.matches(first, self.case_sensitive, params)
                        && self.match_segments(rest, tail, params)
                }
                None => false,
            },
        }
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
