use thiserror::Error;

/// Errors raised while turning a diagram document into a graph
#[derive(Debug, Error)]
pub enum DiagramError {
    /// The document is not well-formed XML. Carries the parser's message.
    #[error("malformed diagram document: {0}")]
    MalformedDocument(String),
}

impl From<roxmltree::Error> for DiagramError {
    fn from(err: roxmltree::Error) -> Self {
        DiagramError::MalformedDocument(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DiagramError>;
