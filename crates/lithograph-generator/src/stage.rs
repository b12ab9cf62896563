//! Definition stages of a content set.

use std::fmt;

/// One of the sequential phases a content set goes through.
///
/// Stages only move forward; [`Stage::Run`] is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Widgets = 1,
    Resources = 2,
    Pages = 3,
    Run = 4,
}

impl Stage {
    /// Lowercase stage name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Widgets => "widgets",
            Self::Resources => "resources",
            Self::Pages => "pages",
            Self::Run => "run",
        }
    }

    /// The stage after this one, `None` for [`Stage::Run`].
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Widgets => Some(Self::Resources),
            Self::Resources => Some(Self::Pages),
            Self::Pages => Some(Self::Run),
            Self::Run => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert!(Stage::Widgets < Stage::Resources);
        assert!(Stage::Pages < Stage::Run);
        assert_eq!(Stage::Widgets as u8, 1);
        assert_eq!(Stage::Run as u8, 4);
    }

    #[test]
    fn test_stage_next() {
        let mut stage = Stage::Widgets;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            seen.push(next);
            stage = next;
        }
        assert_eq!(
            seen,
            [Stage::Widgets, Stage::Resources, Stage::Pages, Stage::Run]
        );
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Resources.to_string(), "resources");
        assert_eq!(format!("{}", Stage::Run), "run");
    }
}
