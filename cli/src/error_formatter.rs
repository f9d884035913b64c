use ariadne::{Color, Label, Report, ReportKind, Source};
use karat::FormulaError;

/// Format a FormulaError with fancy terminal output using Ariadne
pub fn format_error(error: &FormulaError) -> String {
    let details = error.details();

    let error_type = match error {
        FormulaError::Definition(_) => "Definition error",
        FormulaError::Lex(_) => "Lex error",
        FormulaError::Syntax(_) => "Syntax error",
        FormulaError::Runtime(_) => "Runtime error",
    };

    let location = details
        .step
        .as_ref()
        .map(|step| format!(" (in step {} '{}')", step.index + 1, step.var))
        .unwrap_or_default();
    let enhanced_message = format!("{}: {}{}", error_type, details.message, location);

    let (Some(span), Some(source_text)) = (details.span, details.source_text.as_deref()) else {
        return match &details.suggestion {
            Some(suggestion) => format!("{}\n  help: {}", enhanced_message, suggestion),
            None => enhanced_message,
        };
    };

    // ariadne counts characters, spans count bytes
    let start = char_offset(source_text, span.start);
    let end = char_offset(source_text, span.end).max(start + 1);

    let source_id = match &details.step {
        Some(step) => format!("step {}", step.index + 1),
        None => "expression".to_string(),
    };

    let mut report = Report::build(ReportKind::Error, &source_id, start)
        .with_message(&enhanced_message)
        .with_label(
            Label::new((&source_id, start..end))
                .with_message(&details.message)
                .with_color(Color::Red),
        );

    if let Some(suggestion) = &details.suggestion {
        report = report.with_help(suggestion);
    }

    let mut output = Vec::new();
    match report
        .finish()
        .write((&source_id, Source::from(source_text)), &mut output)
    {
        Ok(_) => String::from_utf8_lossy(&output).to_string(),
        Err(_) => enhanced_message,
    }
}

fn char_offset(text: &str, byte_offset: usize) -> usize {
    let clamped = byte_offset.min(text.len());
    text.char_indices().take_while(|(i, _)| *i < clamped).count()
}
