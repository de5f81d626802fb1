//! Pipeline error type.
//!
//! One error struct for the whole crate, carrying a failure class and a
//! user-facing message. The class drives both the process exit code and the
//! caller's ability to distinguish precondition violations (an unknown report
//! name, an empty drill-down) from environment failures (unreachable source,
//! unwritable export path).

/// Failure class of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid invocation: bad arguments or an unusable configuration.
    Usage,
    /// A data source could not be discovered, fetched, or read.
    Source,
    /// The dataset yielded zero usable rows after normalization.
    Load,
    /// An unrecognized report name was requested.
    UnknownReport,
    /// A report requiring at least one result row was computed on an empty
    /// filtered set.
    EmptyResult,
    /// An export file could not be created or written.
    Export,
}

impl ErrorKind {
    /// Process exit code for this failure class.
    ///
    /// 2 = usage / local IO, 3 = no data, 4 = source acquisition.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Usage | ErrorKind::UnknownReport | ErrorKind::Export => 2,
            ErrorKind::Load | ErrorKind::EmptyResult => 3,
            ErrorKind::Source => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, message)
    }

    pub fn source(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Source, message)
    }

    pub fn load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Load, message)
    }

    pub fn unknown_report(name: &str) -> Self {
        Self::new(
            ErrorKind::UnknownReport,
            format!("Unknown report kind '{name}'. Run `pulse reports` for the list."),
        )
    }

    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmptyResult, message)
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Export, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_failure_class() {
        assert_eq!(AppError::usage("x").exit_code(), 2);
        assert_eq!(AppError::unknown_report("x").exit_code(), 2);
        assert_eq!(AppError::load("x").exit_code(), 3);
        assert_eq!(AppError::empty_result("x").exit_code(), 3);
        assert_eq!(AppError::source("x").exit_code(), 4);
    }

    #[test]
    fn unknown_report_names_the_kind() {
        let err = AppError::unknown_report("nonexistent");
        assert_eq!(err.kind(), ErrorKind::UnknownReport);
        assert!(err.to_string().contains("nonexistent"));
    }
}
