//! Path templates that turn a selection into a file path or URL path.
//!
//! Templates are validated when they are built, so rendering cannot fail.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use quizboard_core::model::Selection;
use quizboard_core::traits::SourceKind;

pub const DEFAULT_RESPONSES_TEMPLATE: &str = "{location}/{month}/level{level}.csv";
pub const DEFAULT_META_TEMPLATE: &str = "{location}/{month}/level{level}_meta.csv";

/// Errors in a path template string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template is empty")]
    Empty,

    #[error("unclosed '{{' in template {0:?}")]
    Unclosed(String),

    #[error("unknown placeholder {{{name}}} in template {template:?}")]
    UnknownPlaceholder { name: String, template: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Location,
    Month,
    Level,
}

/// A path with `{location}`, `{month}` and `{level}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathTemplate {
    raw: String,
    pieces: Vec<Piece>,
}

impl PathTemplate {
    pub fn render(&self, selection: &Selection) -> String {
        let mut out = String::with_capacity(self.raw.len() + 16);
        for piece in &self.pieces {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Location => out.push_str(&selection.location),
                Piece::Month => out.push_str(&selection.month),
                Piece::Level => out.push_str(&selection.level.to_string()),
            }
        }
        out
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for PathTemplate {
    type Err = TemplateError;

    fn from_str(template: &str) -> Result<Self, Self::Err> {
        if template.trim().is_empty() {
            return Err(TemplateError::Empty);
        }

        let mut pieces = Vec::new();
        let mut rest = template;
        while let Some(start) = rest.find('{') {
            if start > 0 {
                pieces.push(Piece::Text(rest[..start].to_string()));
            }
            let after = &rest[start + 1..];
            let end = after
                .find('}')
                .ok_or_else(|| TemplateError::Unclosed(template.to_string()))?;
            let piece = match &after[..end] {
                "location" => Piece::Location,
                "month" => Piece::Month,
                "level" => Piece::Level,
                other => {
                    return Err(TemplateError::UnknownPlaceholder {
                        name: other.to_string(),
                        template: template.to_string(),
                    })
                }
            };
            pieces.push(piece);
            rest = &after[end + 1..];
        }
        if !rest.is_empty() {
            pieces.push(Piece::Text(rest.to_string()));
        }

        Ok(Self {
            raw: template.to_string(),
            pieces,
        })
    }
}

impl TryFrom<String> for PathTemplate {
    type Error = TemplateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PathTemplate> for String {
    fn from(value: PathTemplate) -> Self {
        value.raw
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// The pair of templates used by every source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathTemplates {
    #[serde(default = "default_responses")]
    pub responses: PathTemplate,
    #[serde(default = "default_meta")]
    pub meta: PathTemplate,
}

fn default_responses() -> PathTemplate {
    PathTemplate {
        raw: DEFAULT_RESPONSES_TEMPLATE.to_string(),
        pieces: vec![
            Piece::Location,
            Piece::Text("/".into()),
            Piece::Month,
            Piece::Text("/level".into()),
            Piece::Level,
            Piece::Text(".csv".into()),
        ],
    }
}

fn default_meta() -> PathTemplate {
    PathTemplate {
        raw: DEFAULT_META_TEMPLATE.to_string(),
        pieces: vec![
            Piece::Location,
            Piece::Text("/".into()),
            Piece::Month,
            Piece::Text("/level".into()),
            Piece::Level,
            Piece::Text("_meta.csv".into()),
        ],
    }
}

impl Default for PathTemplates {
    fn default() -> Self {
        Self {
            responses: default_responses(),
            meta: default_meta(),
        }
    }
}

impl PathTemplates {
    pub fn for_kind(&self, kind: SourceKind) -> &PathTemplate {
        match kind {
            SourceKind::Responses => &self.responses,
            SourceKind::Meta => &self.meta,
        }
    }

    pub fn render(&self, kind: SourceKind, selection: &Selection) -> String {
        self.for_kind(kind).render(selection)
    }
}
