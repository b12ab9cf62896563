//! Url path patterns: matching concrete paths and enumerating all of them.
//!
//! A pattern is a sequence of literal and variable segments, where each
//! variable takes its values from a finite list:
//!
//! ```
//! use lithograph_generator::pattern::{PatternDefinition, PatternMatcher};
//!
//! let matcher = PatternMatcher::new(
//!     PatternDefinition::new()
//!         .values("animal", ["cat", "dog"])
//!         .literal("/animal/")
//!         .variable("animal"),
//! )
//! .unwrap();
//!
//! let all: Vec<String> = matcher.iter().collect();
//! assert_eq!(all, ["/animal/cat", "/animal/dog"]);
//!
//! let captures = matcher.match_path("/animal/dog").unwrap();
//! assert_eq!(captures["animal"], "dog");
//! ```

use std::collections::BTreeMap;

use crate::{
    error::{GeneratorError, Result},
    prefix_tree::PrefixTree,
};

/// Variable name to matched value.
pub type Captures = BTreeMap<String, String>;

/// One segment of a url path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Text that must appear verbatim.
    Literal(String),
    /// A value taken from the named value list.
    Variable(String),
}

impl PatternSegment {
    /// Parse a raw segment; `{name}` is a variable, anything else a literal.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) if !name.is_empty() => Self::Variable(name.to_string()),
            _ => Self::Literal(raw.to_string()),
        }
    }
}

/// Value lists plus the segment sequence of a pattern.
#[derive(Debug, Clone, Default)]
pub struct PatternDefinition {
    value_lists: BTreeMap<String, Vec<String>>,
    segments: Vec<PatternSegment>,
}

impl PatternDefinition {
    /// Create an empty definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a definition from raw segments (see [`PatternSegment::parse`]).
    pub fn from_segments<I, S>(segments: I, value_lists: BTreeMap<String, Vec<String>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            value_lists,
            segments: segments
                .into_iter()
                .map(|s| PatternSegment::parse(s.as_ref()))
                .collect(),
        }
    }

    /// Set the value list of a variable.
    #[must_use]
    pub fn values<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_lists
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Append a literal segment.
    #[must_use]
    pub fn literal(mut self, text: impl Into<String>) -> Self {
        self.segments.push(PatternSegment::Literal(text.into()));
        self
    }

    /// Append a variable segment.
    #[must_use]
    pub fn variable(mut self, name: impl Into<String>) -> Self {
        self.segments.push(PatternSegment::Variable(name.into()));
        self
    }

    /// Segments of the pattern.
    #[must_use]
    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    /// Values of a variable.
    #[must_use]
    pub fn value_list(&self, name: &str) -> Option<&[String]> {
        self.value_lists.get(name).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone)]
enum MatcherPart {
    Literal(String),
    Variable { name: String, tree: PrefixTree },
}

/// Matches url paths against a pattern and enumerates every path it accepts.
///
/// Each variable segment takes the longest value of its list found at the
/// current position, left to right, with no backtracking. When values of
/// adjacent variables overlap across the segment border this can reject a
/// path some other split would accept.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    definition: PatternDefinition,
    parts: Vec<MatcherPart>,
}

impl PatternMatcher {
    /// Build a matcher; every variable must have a value list.
    pub fn new(definition: PatternDefinition) -> Result<Self> {
        let parts = definition
            .segments
            .iter()
            .map(|segment| match segment {
                PatternSegment::Literal(text) => Ok(MatcherPart::Literal(text.clone())),
                PatternSegment::Variable(name) => {
                    let values = definition.value_list(name).ok_or_else(|| {
                        GeneratorError::PatternViolation(format!(
                            "variable \"{name}\" has no value list"
                        ))
                    })?;
                    Ok(MatcherPart::Variable {
                        name: name.clone(),
                        tree: PrefixTree::new(values),
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { definition, parts })
    }

    /// Definition the matcher was built from.
    #[must_use]
    pub fn definition(&self) -> &PatternDefinition {
        &self.definition
    }

    /// Split a url path into variable values, or `None` if it does not match.
    #[must_use]
    pub fn match_path(&self, url_path: &str) -> Option<Captures> {
        let mut position = 0;
        let mut captures = Captures::new();

        for part in &self.parts {
            match part {
                MatcherPart::Literal(text) => {
                    if !url_path.get(position..)?.starts_with(text.as_str()) {
                        return None;
                    }
                    position += text.len();
                }
                MatcherPart::Variable { name, tree } => {
                    let value = tree.match_at(url_path, position)?;
                    position += value.len();
                    captures.insert(name.clone(), value.to_string());
                }
            }
        }

        (position == url_path.len()).then_some(captures)
    }

    /// Like [`match_path`](Self::match_path), failing on mismatch.
    pub fn match_path_or_err(&self, url_path: &str) -> Result<Captures> {
        self.match_path(url_path).ok_or_else(|| {
            GeneratorError::PatternViolation(format!(
                "Failed to match on url {url_path} (pattern is {:?})",
                self.definition.segments
            ))
        })
    }

    /// Iterate every url path the pattern produces.
    ///
    /// Each call starts over from the first path.
    #[must_use]
    pub fn iter(&self) -> PatternIterator<'_> {
        PatternIterator::new(&self.definition)
    }

    /// First produced path, used as a representative of the whole pattern.
    #[must_use]
    pub fn first(&self) -> Option<String> {
        self.iter().next()
    }
}

impl<'a> IntoIterator for &'a PatternMatcher {
    type Item = String;
    type IntoIter = PatternIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Cartesian product of the variable values, in a fixed order.
///
/// The rightmost variable changes fastest. An empty pattern produces
/// nothing; a pattern made only of literals produces exactly one path.
#[derive(Debug, Clone)]
pub struct PatternIterator<'a> {
    // always one more than `variables`
    constants: Vec<String>,
    variables: Vec<&'a [String]>,
    indices: Vec<usize>,
    finished: bool,
}

impl<'a> PatternIterator<'a> {
    fn new(definition: &'a PatternDefinition) -> Self {
        let mut constants = vec![String::new()];
        let mut variables = Vec::new();

        for segment in &definition.segments {
            match segment {
                PatternSegment::Literal(text) => {
                    if let Some(last) = constants.last_mut() {
                        last.push_str(text);
                    }
                }
                PatternSegment::Variable(name) => {
                    variables.push(definition.value_list(name).unwrap_or_default());
                    constants.push(String::new());
                }
            }
        }

        let finished = definition.segments.is_empty() || variables.iter().any(|v| v.is_empty());
        let indices = vec![0; variables.len()];

        Self {
            constants,
            variables,
            indices,
            finished,
        }
    }

    fn increment(&mut self) {
        for position in (0..self.indices.len()).rev() {
            if self.indices[position] + 1 < self.variables[position].len() {
                self.indices[position] += 1;
                return;
            }
            self.indices[position] = 0;
        }
        self.finished = true;
    }
}

impl Iterator for PatternIterator<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.finished {
            return None;
        }

        let mut result = String::new();
        for (i, values) in self.variables.iter().enumerate() {
            result.push_str(&self.constants[i]);
            result.push_str(&values[self.indices[i]]);
        }
        if let Some(last) = self.constants.last() {
            result.push_str(last);
        }

        self.increment();
        Some(result)
    }
}
