//! Error surface of the aggregation core.
//!
//! Every failure carries a kind so the (external) web layer can map it to a
//! transport response without string-matching messages. Construction-time
//! kinds abort the whole query; `UnknownPath` is recovered locally by the
//! aggregator (the offending record is skipped).

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The backing store is unreachable or unreadable.
    DataSource,
    /// A stored path string does not parse as a dotted integer path.
    MalformedPath,
    /// A layout row declares a parent absent from the layout set.
    OrphanNode,
    /// Two layout rows declare the same path.
    DuplicateNode,
    /// A movement record references a path absent from the built tree.
    UnknownPath,
    /// Parent of the root was requested.
    NoParent,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DataSource => "data_source",
            ErrorKind::MalformedPath => "malformed_path",
            ErrorKind::OrphanNode => "orphan_node",
            ErrorKind::DuplicateNode => "duplicate_node",
            ErrorKind::UnknownPath => "unknown_path",
            ErrorKind::NoParent => "no_parent",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct MoveError {
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl MoveError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn data_source(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataSource, message)
    }

    pub fn malformed_path(text: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::MalformedPath,
            format!("not a dotted integer path: {:?}", text.to_string()),
        )
    }

    pub fn orphan_node(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OrphanNode, message)
    }

    pub fn duplicate_node(path: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::DuplicateNode,
            format!("layout declares path {} twice", path),
        )
    }

    pub fn unknown_path(path: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::UnknownPath,
            format!("movement references path {} absent from layout", path),
        )
    }

    pub fn no_parent() -> Self {
        Self::new(ErrorKind::NoParent, "root path has no parent")
    }
}

impl From<rusqlite::Error> for MoveError {
    fn from(err: rusqlite::Error) -> Self {
        MoveError::data_source(format!("sqlite error: {}", err)).with_source(err)
    }
}

pub type Result<T> = std::result::Result<T, MoveError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_carries_kind_and_message() {
        let err = MoveError::data_source("cannot open test.db");
        assert_eq!(format!("{}", err), "[data_source] cannot open test.db");
    }

    #[test]
    fn kind_is_inspectable() {
        let err = MoveError::no_parent();
        assert_eq!(err.kind, ErrorKind::NoParent);
        assert_eq!(err.kind.as_str(), "no_parent");
    }

    #[test]
    fn sqlite_errors_map_to_data_source() {
        let err: MoveError = rusqlite::Error::QueryReturnedNoRows.into();
        assert_eq!(err.kind, ErrorKind::DataSource);
        assert!(err.source.is_some());
    }
}
