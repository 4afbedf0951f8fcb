use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Which end of an edge a missing node id was supposed to fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointRole {
    Source,
    Target,
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("node \"{0}\" already exists")]
    DuplicateNode(String),

    #[error("edge \"{0}\" already exists")]
    DuplicateEdge(String),

    #[error("edge \"{edge}\": {role} \"{endpoint}\" does not exist yet")]
    DanglingReference {
        edge: String,
        endpoint: String,
        role: EndpointRole,
    },

    #[error("a node's coordinate is not a finite number (id: {id})")]
    InvalidGeometry { id: String },
}

impl Error {
    /// Duplicate ids and dangling endpoints: the caller broke the store contract.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::DuplicateNode(_) | Self::DuplicateEdge(_) | Self::DanglingReference { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_contract_violations() {
        assert!(Error::DuplicateNode("a".into()).is_contract_violation());
        assert!(
            Error::DanglingReference {
                edge: "e".into(),
                endpoint: "b".into(),
                role: EndpointRole::Target,
            }
            .is_contract_violation()
        );
        assert!(!Error::InvalidGeometry { id: "a".into() }.is_contract_violation());
    }

    #[test]
    fn dangling_message_names_role() {
        let error = Error::DanglingReference {
            edge: "e1".into(),
            endpoint: "b".into(),
            role: EndpointRole::Target,
        };
        assert_eq!(error.to_string(), "edge \"e1\": target \"b\" does not exist yet");
    }
}
