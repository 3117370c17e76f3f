//! Supported diagram notations.

/// Diagram notations recognized in fenced code blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramKind {
    /// Mermaid flowchart-style notation.
    Mermaid,
    /// PlantUML sequence-style notation.
    PlantUml,
}

impl DiagramKind {
    /// Parse a kind from a code fence info string.
    ///
    /// Returns `None` for fences that are not diagrams (`rust`, `text`, ...).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mermaid" => Some(Self::Mermaid),
            "plantuml" => Some(Self::PlantUml),
            _ => None,
        }
    }

    /// Canonical lowercase name, used in rendered-image filenames.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mermaid => "mermaid",
            Self::PlantUml => "plantuml",
        }
    }
}

impl std::fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
