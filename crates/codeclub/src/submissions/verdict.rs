use serde::{Deserialize, Serialize};

/// Canonical outcome tag for a judged submission.
///
/// The numeric mapping below is a closed, versioned contract with the
/// external judge (Judge0 status ids). Changing any row is a breaking
/// change for every stored record and every consumer of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Unknown,
    InQueue,
    Processing,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    CompilationError,
    RuntimeErrorSigsegv,
    RuntimeErrorSigxfsz,
    RuntimeErrorSigfpe,
    RuntimeErrorSigabrt,
    RuntimeErrorNzec,
    RuntimeErrorOther,
    InternalError,
    ExecFormatError,
}

impl Verdict {
    /// Maps the judge's numeric status to a verdict. Absent or unrecognized
    /// codes collapse to [`Verdict::Unknown`].
    pub fn from_status(status: Option<i32>) -> Self {
        match status {
            Some(1) => Verdict::InQueue,
            Some(2) => Verdict::Processing,
            Some(3) => Verdict::Accepted,
            Some(4) => Verdict::WrongAnswer,
            Some(5) => Verdict::TimeLimitExceeded,
            Some(6) => Verdict::CompilationError,
            Some(7) => Verdict::RuntimeErrorSigsegv,
            Some(8) => Verdict::RuntimeErrorSigxfsz,
            Some(9) => Verdict::RuntimeErrorSigfpe,
            Some(10) => Verdict::RuntimeErrorSigabrt,
            Some(11) => Verdict::RuntimeErrorNzec,
            Some(12) => Verdict::RuntimeErrorOther,
            Some(13) => Verdict::InternalError,
            Some(14) => Verdict::ExecFormatError,
            _ => Verdict::Unknown,
        }
    }

    /// Parses a caller-supplied verdict label (the legacy `result` field).
    pub fn from_label(label: &str) -> Option<Self> {
        let verdict = match label.trim() {
            "IN_QUEUE" => Verdict::InQueue,
            "PROCESSING" => Verdict::Processing,
            "ACCEPTED" => Verdict::Accepted,
            "WRONG_ANSWER" => Verdict::WrongAnswer,
            "TIME_LIMIT_EXCEEDED" => Verdict::TimeLimitExceeded,
            "COMPILATION_ERROR" => Verdict::CompilationError,
            "RUNTIME_ERROR_SIGSEGV" => Verdict::RuntimeErrorSigsegv,
            "RUNTIME_ERROR_SIGXFSZ" => Verdict::RuntimeErrorSigxfsz,
            "RUNTIME_ERROR_SIGFPE" => Verdict::RuntimeErrorSigfpe,
            "RUNTIME_ERROR_SIGABRT" => Verdict::RuntimeErrorSigabrt,
            "RUNTIME_ERROR_NZEC" => Verdict::RuntimeErrorNzec,
            "RUNTIME_ERROR_OTHER" => Verdict::RuntimeErrorOther,
            "INTERNAL_ERROR" => Verdict::InternalError,
            "EXEC_FORMAT_ERROR" => Verdict::ExecFormatError,
            "UNKNOWN" => Verdict::Unknown,
            _ => return None,
        };
        Some(verdict)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Verdict::Unknown => "UNKNOWN",
            Verdict::InQueue => "IN_QUEUE",
            Verdict::Processing => "PROCESSING",
            Verdict::Accepted => "ACCEPTED",
            Verdict::WrongAnswer => "WRONG_ANSWER",
            Verdict::TimeLimitExceeded => "TIME_LIMIT_EXCEEDED",
            Verdict::CompilationError => "COMPILATION_ERROR",
            Verdict::RuntimeErrorSigsegv => "RUNTIME_ERROR_SIGSEGV",
            Verdict::RuntimeErrorSigxfsz => "RUNTIME_ERROR_SIGXFSZ",
            Verdict::RuntimeErrorSigfpe => "RUNTIME_ERROR_SIGFPE",
            Verdict::RuntimeErrorSigabrt => "RUNTIME_ERROR_SIGABRT",
            Verdict::RuntimeErrorNzec => "RUNTIME_ERROR_NZEC",
            Verdict::RuntimeErrorOther => "RUNTIME_ERROR_OTHER",
            Verdict::InternalError => "INTERNAL_ERROR",
            Verdict::ExecFormatError => "EXEC_FORMAT_ERROR",
        }
    }

    /// Only accepted verdicts feed the progress ledger.
    pub const fn is_accepted(self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}
