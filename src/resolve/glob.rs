// src/resolve/glob.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// One compiled source pattern such as `src/scss/**/*.scss` or
/// `!src/js/vendor/**`.
///
/// `*` never crosses a `/`; only `**` descends into subdirectories.
#[derive(Clone)]
pub struct SourceGlob {
    pattern: String,
    negated: bool,
    base: PathBuf,
    is_glob: bool,
    matcher: GlobMatcher,
}

impl fmt::Debug for SourceGlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceGlob")
            .field("pattern", &self.pattern)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl SourceGlob {
    pub fn new(pattern: &str) -> Result<Self> {
        let (negated, body) = match pattern.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, pattern),
        };
        let body = body.trim_start_matches("./");

        if body.is_empty() {
            anyhow::bail!("empty pattern");
        }

        let matcher = GlobBuilder::new(body)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pattern}"))?
            .compile_matcher();

        let (base, is_glob) = glob_base(body);

        Ok(Self {
            pattern: pattern.to_string(),
            negated,
            base,
            is_glob,
            matcher,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// `!pattern` globs exclude files matched by the others.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Literal directory prefix before the first wildcard segment.
    ///
    /// Output paths are computed relative to this base, so
    /// `src/scss/**/*.scss` writes `src/scss/a/b.scss` as `a/b.scss`.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// `false` for a plain path like `src/index.html`.
    pub fn is_glob(&self) -> bool {
        self.is_glob
    }

    /// Match a forward-slash path relative to the project root.
    pub fn is_match(&self, rel_path: &str) -> bool {
        self.matcher.is_match(rel_path)
    }
}

/// Split a pattern into its literal directory base.
///
/// For a pattern without wildcards the base is the parent directory.
fn glob_base(pattern: &str) -> (PathBuf, bool) {
    let segments: Vec<&str> = pattern.split('/').collect();
    let first_magic = segments
        .iter()
        .position(|seg| seg.contains(GLOB_META));

    match first_magic {
        Some(idx) => (segments[..idx].iter().collect(), true),
        None => {
            let parent: PathBuf = segments[..segments.len().saturating_sub(1)]
                .iter()
                .collect();
            (parent, false)
        }
    }
}
