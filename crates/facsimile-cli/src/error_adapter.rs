//! Error adapter for converting CliError to miette diagnostics.
//!
//! This module provides the bridge between the tool's error types and
//! miette's rich diagnostic formatting. Malformed diagram files are
//! reported with a snippet of the offending TOML.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use facsimile::CopyPasteError;
use facsimile_core::DiagramError;

use crate::CliError;

/// Adapter rendering a [`CliError`] through miette.
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            CliError::Io(_) => "facsimile::io",
            CliError::Config(_) => "facsimile::config",
            CliError::Format { .. } => "facsimile::format",
            CliError::Serialize(_) => "facsimile::serialize",
            CliError::Argument(_) => "facsimile::argument",
            CliError::Diagram(_) => "facsimile::diagram",
            CliError::CopyPaste(_) => "facsimile::copy_paste",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            CliError::Argument(_) => "points are written as `x,y`, e.g. `--at 120,-40`",
            CliError::Diagram(DiagramError::ParentCycle(_)) => {
                "an element cannot be nested inside one of its own children"
            }
            CliError::Diagram(_) => "check that every referenced element id exists in the diagram",
            CliError::CopyPaste(CopyPasteError::Diagram(_)) => {
                "only ids present in the input diagram can be selected"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self.0 {
            CliError::Format { src, .. } => Some(src as &dyn miette::SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let CliError::Format {
            span: Some(span),
            message,
            ..
        } = self.0
        else {
            return None;
        };

        let span = SourceSpan::new(span.start.into(), span.len());
        Some(Box::new(std::iter::once(LabeledSpan::new_primary_with_span(
            Some(message.clone()),
            span,
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_has_label() {
        let src = "root = \"root\"\n[[elements]]\nid = 5\n";
        let err = toml::from_str::<facsimile_core::DiagramFile>(src).unwrap_err();
        let err = CliError::format("diagram.toml", src, &err);

        let adapter = ErrorAdapter(&err);

        assert_eq!(adapter.code().unwrap().to_string(), "facsimile::format");
        assert!(adapter.source_code().is_some());
        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].primary());
    }

    #[test]
    fn test_argument_error_has_help() {
        let err = CliError::Argument("bad point".to_string());

        let adapter = ErrorAdapter(&err);

        assert_eq!(adapter.code().unwrap().to_string(), "facsimile::argument");
        assert!(adapter.help().is_some());
        assert!(adapter.labels().is_none());
        assert_eq!(adapter.to_string(), "Invalid argument: bad point");
    }

    #[test]
    fn test_parent_cycle_has_help() {
        let err = CliError::Diagram(DiagramError::ParentCycle(facsimile_core::Id::new("lane")));

        let adapter = ErrorAdapter(&err);

        assert_eq!(adapter.code().unwrap().to_string(), "facsimile::diagram");
        assert!(
            adapter
                .help()
                .unwrap()
                .to_string()
                .contains("nested inside one of its own children")
        );
    }
}
