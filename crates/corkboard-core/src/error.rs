use std::fmt;

/// Machine-readable error codes for client-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    CardNotFound,
    CardAlreadyTracked,
    VersionNotFound,
    DuplicateEdge,
    CycleDetected,
    EdgeLimitExceeded,
    InvalidRelationshipKind,
    EmptyPatch,
    UnknownConflict,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::CardNotFound => "E2001",
            Self::CardAlreadyTracked => "E2002",
            Self::VersionNotFound => "E2003",
            Self::DuplicateEdge => "E3001",
            Self::CycleDetected => "E3002",
            Self::EdgeLimitExceeded => "E3003",
            Self::InvalidRelationshipKind => "E3004",
            Self::EmptyPatch => "E4001",
            Self::UnknownConflict => "E4002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and client messages.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Board config parse error",
            Self::CardNotFound => "Card not found",
            Self::CardAlreadyTracked => "Card already tracked by the ledger",
            Self::VersionNotFound => "Card version not found",
            Self::DuplicateEdge => "Relationship already exists",
            Self::CycleDetected => "Relationship would create a dependency cycle",
            Self::EdgeLimitExceeded => "Relationship limit reached for card",
            Self::InvalidRelationshipKind => "Invalid relationship kind",
            Self::EmptyPatch => "Edit contains no changes",
            Self::UnknownConflict => "Conflict case not found",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users and clients.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in the board config TOML and retry."),
            Self::CardNotFound | Self::VersionNotFound => None,
            Self::CardAlreadyTracked => {
                Some("Register each card once; use submit_card_edit for updates.")
            }
            Self::DuplicateEdge => Some("The relationship is already present; no action needed."),
            Self::CycleDetected => {
                Some("Remove or redirect dependency links to keep the graph acyclic.")
            }
            Self::EdgeLimitExceeded => {
                Some("Remove unused relationships or raise graph.max_edges_per_card.")
            }
            Self::InvalidRelationshipKind => {
                Some("Use one of: blocks, relates_to, duplicate, parent_child.")
            }
            Self::EmptyPatch => Some("Include at least one changed field in the edit."),
            Self::UnknownConflict => {
                Some("The conflict was already resolved or abandoned; re-submit the edit.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 11] = [
        ErrorCode::ConfigParseError,
        ErrorCode::CardNotFound,
        ErrorCode::CardAlreadyTracked,
        ErrorCode::VersionNotFound,
        ErrorCode::DuplicateEdge,
        ErrorCode::CycleDetected,
        ErrorCode::EdgeLimitExceeded,
        ErrorCode::InvalidRelationshipKind,
        ErrorCode::EmptyPatch,
        ErrorCode::UnknownConflict,
        ErrorCode::InternalUnexpected,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let c = code.code();
            assert_eq!(c.len(), 5, "code {c} should be 5 chars");
            assert!(c.starts_with('E'));
            assert!(c.chars().skip(1).all(|ch| ch.is_ascii_digit()));
        }
    }

    #[test]
    fn messages_are_nonempty() {
        for code in ALL {
            assert!(!code.message().is_empty());
        }
    }
}
