//! Diagnostics reported back to the provider host.
//!
//! Every failure of a lifecycle operation ends up as a [Diagnostic] with a short summary and a
//! detail message. Schema validation collects all of its findings into [Diagnostics] before any
//! network call is made.

use std::fmt;

use strum::Display as StrumDisplay;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    /// Attribute path the diagnostic refers to, e.g. `metadata.name`
    pub path: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            path: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            path: None,
        }
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {} ({path}): {}", self.severity, self.summary, self.detail),
            None => write!(f, "{}: {}: {}", self.severity, self.summary, self.detail),
        }
    }
}

impl From<&Error> for Diagnostic {
    fn from(error: &Error) -> Self {
        let summary = match error {
            Error::Marshal(_) => "Unable to marshal resource",
            Error::Unmarshal(_) => "Unable to unmarshal resource",
            Error::Manifest(_) => "Unable to render manifest",
            Error::Apply { .. } => "Error applying resource",
            Error::Get { .. } => "Error reading resource",
            Error::Delete { .. } => "Error deleting resource",
            Error::WaitTimeout { .. } => "Error waiting for deletion",
            Error::UnexpectedImportIdentifier(_) => "Unexpected Import Identifier",
            Error::ProviderOffline => "Provider in offline mode",
            Error::UnexpectedProviderData(_) => "Unexpected Resource Configure Type",
            Error::Unconfigured => "Unconfigured resource",
            Error::InvalidConfiguration(_) => "Invalid configuration",
            Error::Kube { .. } | Error::Anyhow(_) => "Internal error",
        };
        Diagnostic::error(summary, error.to_string())
    }
}

/// An ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn add_error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic::error(summary, detail));
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Turns collected errors into [Error::InvalidConfiguration], keeping warnings-only
    /// collections as success.
    pub fn into_result(self) -> Result<(), Error> {
        if self.has_error() {
            Err(Error::InvalidConfiguration(self))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.0.iter().map(ToString::to_string).collect::<Vec<_>>();
        write!(f, "{}", rendered.join("; "))
    }
}

impl From<Error> for Diagnostics {
    fn from(error: Error) -> Self {
        match error {
            Error::InvalidConfiguration(diagnostics) => diagnostics,
            other => Diagnostics(vec![Diagnostic::from(&other)]),
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
