//! Process exit codes.

/// Exit codes for the dupscan binary.
///
/// - 0: Success (scan completed, whether or not duplicates were found)
/// - 1: Missing `paths` argument, or an unexpected fatal error
/// - 130: Interrupted by user (Ctrl+C); a partial report was written
///
/// Malformed command lines are rejected by clap before any of these apply
/// and exit with clap's status 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Scan completed.
    Success,
    /// The required `paths` argument was not supplied; usage was printed.
    MissingArgument,
    /// An unexpected failure, e.g. the output file could not be created.
    GeneralError,
    /// Scan was interrupted by user (Ctrl+C).
    Interrupted,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::MissingArgument | Self::GeneralError => 1,
            Self::Interrupted => 130,
        }
    }
}
