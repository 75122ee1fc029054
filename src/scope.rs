//! Which parts of a presentation a color swap may touch.
//!
//! A part is eligible when it passes three gates:
//!
//! - **scope**: its folder belongs to the selected [`Scope`]
//! - **theme**: with a theme filter, slides, layouts and masters must use one
//!   of the listed themes; other parts pass
//! - **slides**: with a slide filter, the part must belong to one of the
//!   listed slides (see [`slide_content`](crate::pptx::slide_content))

use crate::container::OoxmlContainer;
use crate::error::{Error, Result};
use crate::pptx::relations::{LAYOUTS_DIR, MASTERS_DIR, SLIDES_DIR};
use crate::pptx::{SlideOrder, ThemeGraph};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

const CONTENT_DIRS: [&str; 4] = [
    "ppt/slides/",
    "ppt/charts/",
    "ppt/diagrams/",
    "ppt/notesSlides/",
];

const MASTER_DIRS: [&str; 4] = [
    "ppt/slideMasters/",
    "ppt/slideLayouts/",
    "ppt/notesMasters/",
    "ppt/handoutMasters/",
];

/// Structural role of the parts to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Content and master parts.
    #[default]
    All,
    /// Slides, charts, diagrams and notes.
    Content,
    /// Slide masters, layouts, notes masters and handout masters.
    Master,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::All, Scope::Content, Scope::Master];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::All => "all",
            Scope::Content => "content",
            Scope::Master => "master",
        }
    }

    /// Folder prefixes covered by this scope.
    pub fn dirs(&self) -> Vec<&'static str> {
        match self {
            Scope::Content => CONTENT_DIRS.to_vec(),
            Scope::Master => MASTER_DIRS.to_vec(),
            Scope::All => CONTENT_DIRS.iter().chain(MASTER_DIRS.iter()).copied().collect(),
        }
    }

    /// Whether a part path falls under this scope.
    pub fn includes(&self, path: &str) -> bool {
        self.dirs().iter().any(|d| path.starts_with(d))
    }

    /// Scope names, sorted.
    pub fn valid_values() -> Vec<&'static str> {
        let mut values: Vec<&'static str> = Self::ALL.iter().map(|s| s.as_str()).collect();
        values.sort_unstable();
        values
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| Error::InvalidScope {
                value: s.to_string(),
                valid: Self::valid_values(),
            })
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Largest slide number accepted by [`parse_slide_range`].
pub const MAX_SLIDE_NUMBER: usize = 10_000;

/// Parse a slide list such as `1,3,5-8`.
///
/// Returns sorted slide numbers without duplicates. Numbers above
/// [`MAX_SLIDE_NUMBER`] are rejected before any range is expanded.
pub fn parse_slide_range(input: &str) -> Result<Vec<usize>> {
    let invalid = |msg: String| Error::InvalidSlideRange(msg);
    let number = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|_| invalid(format!("invalid slide number '{}'", s.trim())))
    };
    let in_bounds = |n: usize| match n {
        0 => Err(invalid(format!("invalid slide number {} (must be ≥ 1)", n))),
        n if n > MAX_SLIDE_NUMBER => Err(invalid(format!(
            "invalid slide number {} (must be ≤ {})",
            n, MAX_SLIDE_NUMBER
        ))),
        n => Ok(n),
    };

    let mut slides = BTreeSet::new();

    for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        if entry.contains('-') {
            let (start, end) = match entry.split('-').collect::<Vec<_>>()[..] {
                [start, end] => (in_bounds(number(start)?)?, in_bounds(number(end)?)?),
                _ => {
                    return Err(invalid(format!(
                        "invalid range format '{}' (expected '1-5')",
                        entry
                    )))
                }
            };
            if start > end {
                return Err(invalid(format!("invalid range {}-{} (start > end)", start, end)));
            }
            slides.extend(start..=end);
        } else {
            slides.insert(in_bounds(number(entry)?)?);
        }
    }

    if slides.is_empty() {
        return Err(invalid("no slides specified".to_string()));
    }

    Ok(slides.into_iter().collect())
}

/// Append `.xml` to a theme name given without it.
pub fn normalize_theme_name(name: &str) -> String {
    if name.ends_with(".xml") {
        name.to_string()
    } else {
        format!("{}.xml", name)
    }
}

/// Scope, theme filter and slide filter of a color swap.
///
/// # Example
///
/// ```
/// use pptx_toolkit::scope::{Scope, ScopeSelection};
///
/// let selection = ScopeSelection::new()
///     .with_themes(["theme1"])
///     .with_slides([3, 1, 3]);
///
/// assert_eq!(selection.slides(), &[1, 3]);
/// assert_eq!(selection.effective_scope(), Scope::Content);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSelection {
    scope: Option<Scope>,
    themes: Vec<String>,
    slides: Vec<usize>,
}

impl ScopeSelection {
    /// No explicit scope and no filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scope explicitly.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Restrict to parts using these themes (`theme1` or `theme1.xml`).
    pub fn with_themes<I, S>(mut self, themes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.themes = themes
            .into_iter()
            .map(Into::into)
            .map(|t: String| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        self
    }

    /// Restrict to parts owned by these 1-based slide numbers.
    pub fn with_slides(mut self, slides: impl IntoIterator<Item = usize>) -> Self {
        let unique: BTreeSet<usize> = slides.into_iter().collect();
        self.slides = unique.into_iter().collect();
        self
    }

    /// The scope as given, if any.
    pub fn scope(&self) -> Option<Scope> {
        self.scope
    }

    /// Theme names as given.
    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    /// Sorted, deduplicated slide numbers.
    pub fn slides(&self) -> &[usize] {
        &self.slides
    }

    pub fn has_theme_filter(&self) -> bool {
        !self.themes.is_empty()
    }

    pub fn has_slide_filter(&self) -> bool {
        !self.slides.is_empty()
    }

    /// The explicit scope, else `content` under a slide filter, else `all`.
    pub fn effective_scope(&self) -> Scope {
        match self.scope {
            Some(scope) => scope,
            None if self.has_slide_filter() => Scope::Content,
            None => Scope::All,
        }
    }

    /// Reject a slide filter combined with a scope other than `content`.
    pub fn validate(&self) -> Result<()> {
        let scope = self.effective_scope();
        if self.has_slide_filter() && scope != Scope::Content {
            return Err(Error::SlidesRequireContentScope(scope.to_string()));
        }
        Ok(())
    }
}

/// Eligibility of the parts of one presentation under a [`ScopeSelection`].
///
/// Construction performs all archive-level validation.
pub struct PartFilter<'a> {
    container: &'a OoxmlContainer,
    scope: Scope,
    graph: ThemeGraph,
    theme_files: Option<BTreeSet<String>>,
    slide_parts: Option<BTreeSet<String>>,
    slides_matched: Option<usize>,
}

impl<'a> PartFilter<'a> {
    /// Validate `selection` against the package and build the filter.
    ///
    /// Fails if a slide filter is used outside the `content` scope, if a
    /// theme is not used by any slide master, or if a slide number exceeds
    /// the slide count.
    pub fn new(container: &'a OoxmlContainer, selection: &ScopeSelection) -> Result<Self> {
        selection.validate()?;

        let graph = ThemeGraph::build(container);

        let theme_files = if selection.has_theme_filter() {
            let missing: Vec<String> = selection
                .themes()
                .iter()
                .filter(|t| !graph.has_theme(&normalize_theme_name(t)))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(Error::ThemeNotFound {
                    missing,
                    available: graph.available_themes(),
                });
            }
            Some(
                selection
                    .themes()
                    .iter()
                    .map(|t| normalize_theme_name(t))
                    .collect::<BTreeSet<_>>(),
            )
        } else {
            None
        };

        let mut slides_matched = None;
        let slide_parts = if selection.has_slide_filter() {
            let order = SlideOrder::read(container)?;
            order.validate(selection.slides())?;

            if let Some(themes) = &theme_files {
                let matched = selection
                    .slides()
                    .iter()
                    .filter_map(|&n| order.part(n))
                    .filter(|slide| {
                        graph
                            .slide_theme(container, slide)
                            .is_some_and(|t| themes.contains(t))
                    })
                    .count();
                slides_matched = Some(matched);
            }

            Some(order.content(container, selection.slides()))
        } else {
            None
        };

        Ok(Self {
            container,
            scope: selection.effective_scope(),
            graph,
            theme_files,
            slide_parts,
            slides_matched,
        })
    }

    /// The scope in effect.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Under both a theme and a slide filter, how many requested slides use
    /// one of the themes.
    pub fn slides_matched(&self) -> Option<usize> {
        self.slides_matched
    }

    /// Whether a part may be rewritten.
    pub fn is_eligible(&self, path: &str) -> bool {
        self.scope.includes(path) && self.passes_theme_gate(path) && self.passes_slide_gate(path)
    }

    fn passes_theme_gate(&self, path: &str) -> bool {
        let Some(themes) = &self.theme_files else {
            return true;
        };

        let theme = if is_part_of(path, SLIDES_DIR) {
            self.graph.slide_theme(self.container, path)
        } else if is_part_of(path, LAYOUTS_DIR) {
            self.graph.layout_theme(path)
        } else if is_part_of(path, MASTERS_DIR) {
            self.graph.master_theme(path)
        } else {
            return true;
        };

        match theme {
            Some(theme) => themes.contains(theme),
            None => {
                log::debug!("{}: theme unresolved, excluded by theme filter", path);
                false
            }
        }
    }

    fn passes_slide_gate(&self, path: &str) -> bool {
        self.slide_parts
            .as_ref()
            .is_none_or(|parts| parts.contains(path))
    }
}

/// A part directly inside `dir`.
fn is_part_of(path: &str, dir: &str) -> bool {
    path.strip_prefix(dir)
        .is_some_and(|rest| !rest.contains('/'))
}
