use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error when reading `{0}`: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("{}", format_missing(.0))]
    MissingDirectory(Vec<MissingDirectoryError>),
}

impl Error {
    /// All validation problems carried by this error, empty for other kinds.
    pub fn problems(&self) -> &[Problem] {
        match self {
            Error::Validation(errors) => &errors.problems,
            _ => &[],
        }
    }
}

/// A single malformed configuration field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `sidebar[1].autogenerate.directory`
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Two redirect rules share the same source path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("redirects[{second}]: `{from_path}` already redirected by redirects[{first}]")]
pub struct RedirectCollisionError {
    pub from_path: String,
    pub first: usize,
    pub second: usize,
}

/// An autogenerated sidebar section matched no documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("autogenerated sidebar directory `{source_directory}` contains no documents")]
pub struct MissingDirectoryError {
    pub source_directory: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    Invalid(ValidationError),
    RedirectCollision(RedirectCollisionError),
}

impl Problem {
    /// Field path the problem points at.
    pub fn field(&self) -> String {
        match self {
            Problem::Invalid(e) => e.field.clone(),
            Problem::RedirectCollision(e) => format!("redirects[{}].from", e.second),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Invalid(e) => write!(f, "{}", e),
            Problem::RedirectCollision(e) => write!(f, "{}", e),
        }
    }
}

/// Every problem found in one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub problems: Vec<Problem>,
}

impl ValidationErrors {
    pub fn invalid(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.problems
            .push(Problem::Invalid(ValidationError::new(field, reason)));
    }

    pub fn collision(&mut self, err: RedirectCollisionError) {
        self.problems.push(Problem::RedirectCollision(err));
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Configuration validation failed with {} problem(s):",
            self.problems.len()
        )?;
        for problem in &self.problems {
            write!(f, "\n  - {}", problem)?;
        }
        Ok(())
    }
}

fn format_missing(missing: &[MissingDirectoryError]) -> String {
    missing
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, Error>;
