use serde::{Deserialize, Serialize};

use super::instruction::Instruction;

/// Inline text produced by a resolved placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inline {
    Text(String),
    /// Text tagged with a display color, e.g. an actor's name.
    Styled { text: String, color: String },
}

impl Inline {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Styled { text, .. } => text,
        }
    }
}

/// One piece of an interpolated template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fragment {
    /// Literal template text; adjacent literal runs are already coalesced.
    Literal(String),
    /// The value a placeholder resolved to.
    Resolved(Inline),
    /// A placeholder that failed to resolve. `marker` is the fixed-format
    /// rendering of the original placeholder, shown in `color`.
    Error { marker: String, color: String },
}

impl Fragment {
    /// Builds the error marker for a placeholder's raw text.
    pub fn error_for(placeholder: &str, color: &str) -> Self {
        Self::Error {
            marker: format!("{{{}}}", placeholder),
            color: color.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Literal(text) => text,
            Self::Resolved(inline) => inline.text(),
            Self::Error { marker, .. } => marker,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Flattens fragments to plain text, dropping styling.
pub fn plain_text(fragments: &[Fragment]) -> String {
    fragments.iter().map(Fragment::text).collect()
}

/// A unit of narrative content in the scene frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Content {
    Paragraph(Vec<Fragment>),
    Speech {
        speaker: String,
        line: Vec<Fragment>,
    },
}

impl Content {
    pub fn plain_text(&self) -> String {
        match self {
            Self::Paragraph(fragments) => plain_text(fragments),
            Self::Speech { speaker, line } => format!("{}: \"{}\"", speaker, plain_text(line)),
        }
    }
}

/// An interactive choice: a label and the instruction run when selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneOption {
    pub label: String,
    pub instruction: Instruction,
}
