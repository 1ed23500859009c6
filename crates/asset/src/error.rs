//! Typed errors for mesh loading.

use std::fmt;

use thiserror::Error;

pub type MeshResult<T> = Result<T, MeshError>;

/// Attribute table a face reference resolves against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeKind {
    Position,
    TexCoord,
    Normal,
}

impl AttributeKind {
    /// Number of floats per table entry.
    pub const fn width(self) -> usize {
        match self {
            AttributeKind::Position | AttributeKind::Normal => 3,
            AttributeKind::TexCoord => 2,
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeKind::Position => "position",
            AttributeKind::TexCoord => "texture coordinate",
            AttributeKind::Normal => "normal",
        };
        f.write_str(name)
    }
}

/// Every load failure is fatal for the whole load; no partial buffer is returned.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("unsupported mesh format: '.{extension}' (expected '.{expected}')")]
    UnsupportedFormat {
        extension: String,
        expected: &'static str,
    },

    #[error("{source_name}:{line}: malformed attribute record '{content}'")]
    MalformedAttribute {
        source_name: String,
        line: usize,
        content: String,
    },

    #[error("{source_name}:{line}: malformed face reference '{token}'")]
    MalformedFaceReference {
        source_name: String,
        line: usize,
        token: String,
    },

    #[error(
        "{source_name}:{line}: {kind} index {index} out of range (table has {len} entries)"
    )]
    IndexOutOfRange {
        source_name: String,
        line: usize,
        kind: AttributeKind,
        index: i64,
        len: usize,
    },

    #[error("{source_name}:{line}: face requires normals but no 'vn' records were seen")]
    MissingNormalData { source_name: String, line: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_source_and_line() {
        let err = MeshError::IndexOutOfRange {
            source_name: "cube.obj".into(),
            line: 7,
            kind: AttributeKind::Position,
            index: 4,
            len: 3,
        };
        assert_eq!(
            err.to_string(),
            "cube.obj:7: position index 4 out of range (table has 3 entries)"
        );
    }

    #[test]
    fn io_errors_pass_through() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = MeshError::from(io);
        assert!(matches!(err, MeshError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
        assert_eq!(err.to_string(), "gone");
    }
}
