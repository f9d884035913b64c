use crate::ast::Span;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Which step of a definition an error was raised in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepLocation {
    /// Zero-based position in the definition's `steps`
    pub index: usize,
    pub var: String,
}

/// Detailed error information with optional source location
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    pub message: String,
    /// Byte range inside `source_text`
    pub span: Option<Span>,
    /// The expression the span points into
    pub source_text: Option<Arc<str>>,
    pub step: Option<StepLocation>,
    pub suggestion: Option<String>,
}

impl ErrorDetails {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
            source_text: None,
            step: None,
            suggestion: None,
        }
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        if let Some(step) = &self.step {
            write!(f, " in step {} '{}'", step.index + 1, step.var)?;
        }
        if let Some(span) = &self.span {
            write!(f, " at column {}", span.start + 1)?;
        }
        Ok(())
    }
}

/// The four error categories callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Definition,
    Lex,
    Syntax,
    Runtime,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Definition => "definition",
            ErrorKind::Lex => "lex",
            ErrorKind::Syntax => "syntax",
            ErrorKind::Runtime => "runtime",
        };
        write!(f, "{}", name)
    }
}

/// Error types for formula loading and evaluation
#[derive(Debug, Clone, Error)]
pub enum FormulaError {
    /// Malformed or out-of-bounds definition; raised before any step runs
    #[error("Definition error: {0}")]
    Definition(Box<ErrorDetails>),

    /// Unrecognized character in an expression
    #[error("Lex error: {0}")]
    Lex(Box<ErrorDetails>),

    /// Unexpected or missing token in an expression
    #[error("Syntax error: {0}")]
    Syntax(Box<ErrorDetails>),

    /// Failure while evaluating an expression or resolving outputs
    #[error("Runtime error: {0}")]
    Runtime(Box<ErrorDetails>),
}

impl FormulaError {
    pub fn definition(message: impl Into<String>) -> Self {
        Self::Definition(Box::new(ErrorDetails::new(message)))
    }

    pub fn definition_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        let mut details = ErrorDetails::new(message);
        details.suggestion = Some(suggestion.into());
        Self::Definition(Box::new(details))
    }

    pub fn lex(message: impl Into<String>, span: Span, source_text: &str) -> Self {
        Self::Lex(Box::new(located(message, span, source_text)))
    }

    pub fn syntax(message: impl Into<String>, span: Span, source_text: &str) -> Self {
        Self::Syntax(Box::new(located(message, span, source_text)))
    }

    /// Runtime error without a source location (e.g. output resolution)
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(Box::new(ErrorDetails::new(message)))
    }

    /// Runtime error pointing at the expression node that raised it.
    /// The source text is attached later by the step runner.
    pub fn runtime_at(message: impl Into<String>, span: Span) -> Self {
        let mut details = ErrorDetails::new(message);
        details.span = Some(span);
        Self::Runtime(Box::new(details))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FormulaError::Definition(_) => ErrorKind::Definition,
            FormulaError::Lex(_) => ErrorKind::Lex,
            FormulaError::Syntax(_) => ErrorKind::Syntax,
            FormulaError::Runtime(_) => ErrorKind::Runtime,
        }
    }

    pub fn details(&self) -> &ErrorDetails {
        match self {
            FormulaError::Definition(details)
            | FormulaError::Lex(details)
            | FormulaError::Syntax(details)
            | FormulaError::Runtime(details) => details,
        }
    }

    fn details_mut(&mut self) -> &mut ErrorDetails {
        match self {
            FormulaError::Definition(details)
            | FormulaError::Lex(details)
            | FormulaError::Syntax(details)
            | FormulaError::Runtime(details) => details,
        }
    }

    /// The bare message, without category prefix or location
    pub fn message(&self) -> &str {
        &self.details().message
    }

    pub fn step(&self) -> Option<&StepLocation> {
        self.details().step.as_ref()
    }

    /// Attach the step that was executing, and its expression text if none is set yet
    pub fn in_step(mut self, index: usize, var: &str, source_text: Option<&Arc<str>>) -> Self {
        let details = self.details_mut();
        details.step = Some(StepLocation {
            index,
            var: var.to_string(),
        });
        if details.source_text.is_none() {
            details.source_text = source_text.cloned();
        }
        self
    }
}

fn located(message: impl Into<String>, span: Span, source_text: &str) -> ErrorDetails {
    let mut details = ErrorDetails::new(message);
    details.span = Some(span);
    details.source_text = Some(Arc::from(source_text));
    details
}
