use std::fmt::{Display, Formatter};

pub type ComputeResult<T> = Result<T, ShapeError>;

/// Failure classes surfaced to callers of the `harmonia` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Arguments, configuration or input files that cannot drive a computation.
    InvalidInput,
    /// Reading or writing the filesystem failed.
    Io,
}

impl ErrorKind {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InvalidInput => 2,
            Self::Io => 3,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::InvalidInput => "invalid input",
            Self::Io => "i/o failure",
        })
    }
}

/// A user-facing failure with a stable dotted code such as `INPUT.DEGREE_ORDER`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} [{code}] {message}")]
pub struct HarmoniaError {
    kind: ErrorKind,
    code: &'static str,
    message: String,
}

impl HarmoniaError {
    pub fn invalid_input(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidInput,
            code,
            message: message.into(),
        }
    }

    pub fn io(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Io,
            code,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }

    /// `ERROR: [CODE] message`, the first stderr line of a failed run.
    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.code, self.message)
    }

    /// `FATAL EXIT CODE: n`, the last stderr line of a failed run.
    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

/// A caller buffer whose length differs from the documented shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{buffer} buffer holds {actual} elements but the launch shape requires {expected}")]
pub struct ShapeError {
    pub buffer: &'static str,
    pub expected: usize,
    pub actual: usize,
}

impl ShapeError {
    /// Checks `actual == expected`.
    pub fn check(buffer: &'static str, expected: usize, actual: usize) -> Result<(), Self> {
        if actual == expected {
            Ok(())
        } else {
            Err(Self {
                buffer,
                expected,
                actual,
            })
        }
    }
}

impl From<ShapeError> for HarmoniaError {
    fn from(error: ShapeError) -> Self {
        HarmoniaError::invalid_input("INPUT.BUFFER_SHAPE", error.to_string())
    }
}
