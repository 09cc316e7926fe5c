//! Rendering of xstage failures and scene warnings with miette.
//!
//! Library diagnostics carry byte spans into the `.xstage` text but know
//! nothing about miette. A [`Reportable`] pairs one of them with that text,
//! or wraps an [`XstageError`] raised before any document was read (missing
//! file, bad configuration). A parse failure expands to one reportable per
//! collected diagnostic.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, Severity, SourceCode, SourceSpan};

use xstage::XstageError;
use xstage_parser::{
    Span,
    error::{Diagnostic, Severity as DiagnosticSeverity},
};

const CONFIG_HELP: &str =
    "configuration is read from --config, ./xstage/config.toml or the user config directory";

/// One report for the graphical handler.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A scene diagnostic, located in the document text `src`.
    Located {
        diagnostic: &'a Diagnostic,
        src: &'a str,
    },
    /// An I/O or configuration failure with no document position.
    Unlocated(&'a XstageError),
}

impl<'a> Reportable<'a> {
    pub fn located(diagnostic: &'a Diagnostic, src: &'a str) -> Self {
        Reportable::Located { diagnostic, src }
    }

    /// Stable code of the report: `E0xx`..`E2xx` for scene diagnostics,
    /// `xstage::<kind>` for the rest.
    pub fn code_str(&self) -> Option<String> {
        match self {
            Reportable::Located { diagnostic, .. } => {
                diagnostic.code().map(|code| code.to_string())
            }
            Reportable::Unlocated(XstageError::Io(_)) => Some("xstage::io".to_string()),
            Reportable::Unlocated(XstageError::Config(_)) => Some("xstage::config".to_string()),
            Reportable::Unlocated(XstageError::Parse { .. }) => None,
        }
    }
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Located { diagnostic, .. } => f.write_str(diagnostic.message()),
            Reportable::Unlocated(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Located { .. } => None,
            Reportable::Unlocated(err) => std::error::Error::source(*err),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.code_str()
            .map(|code| Box::new(code) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<Severity> {
        let Reportable::Located { diagnostic, .. } = self else {
            return Some(Severity::Error);
        };
        Some(match diagnostic.severity() {
            DiagnosticSeverity::Error => Severity::Error,
            DiagnosticSeverity::Warning => Severity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Located { diagnostic, .. } => diagnostic
                .help()
                .map(|help| Box::new(help) as Box<dyn fmt::Display>),
            Reportable::Unlocated(XstageError::Config(_)) => Some(Box::new(CONFIG_HELP)),
            Reportable::Unlocated(_) => None,
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match self {
            Reportable::Located { src, .. } => Some(src as &dyn SourceCode),
            Reportable::Unlocated(_) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let Reportable::Located { diagnostic, .. } = self else {
            return None;
        };
        let labels = diagnostic.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = source_span(label.span());
            let text = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(text, span)
            } else {
                LabeledSpan::new_with_span(text, span)
            }
        })))
    }
}

fn source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Reports for a failed run: one per diagnostic of a parse failure, a single
/// one otherwise.
pub fn to_reportables(err: &XstageError) -> Vec<Reportable<'_>> {
    match err {
        XstageError::Parse { err, src } => err
            .diagnostics()
            .iter()
            .map(|diagnostic| Reportable::located(diagnostic, src))
            .collect(),
        _ => vec![Reportable::Unlocated(err)],
    }
}

/// Reports for the warnings of a built scene, located in `src`.
pub fn warning_reportables<'a>(warnings: &'a [Diagnostic], src: &'a str) -> Vec<Reportable<'a>> {
    warnings
        .iter()
        .map(|diagnostic| Reportable::located(diagnostic, src))
        .collect()
}
