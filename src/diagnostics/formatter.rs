//! Formatting diagnostics for different output formats

use super::diagnostic::Diagnostic;
use std::str::FromStr;

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable text with the source excerpt underlined
    #[default]
    Text,
    /// JSON object
    Json,
    /// Single line, for logs and editors
    Compact,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            "compact" => Ok(Format::Compact),
            other => Err(format!(
                "unknown diagnostic format '{other}', expected text, json or compact"
            )),
        }
    }
}

/// Formatter for diagnostics
pub struct DiagnosticFormatter {
    format: Format,
    show_code: bool,
    #[cfg(feature = "terminal")]
    use_color: bool,
}

impl DiagnosticFormatter {
    /// Create a new formatter
    pub fn new(format: Format) -> Self {
        Self {
            format,
            show_code: true,
            #[cfg(feature = "terminal")]
            use_color: true,
        }
    }

    /// Set whether to show error codes
    pub fn with_code(mut self, show: bool) -> Self {
        self.show_code = show;
        self
    }

    /// Set whether to use color (terminal feature only)
    #[cfg(feature = "terminal")]
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Format a diagnostic
    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        match self.format {
            Format::Text => self.format_text(diagnostic),
            Format::Json => Self::format_json(diagnostic),
            Format::Compact => self.format_compact(diagnostic),
        }
    }

    fn header(&self, diagnostic: &Diagnostic) -> String {
        #[cfg(feature = "terminal")]
        if self.use_color {
            use colored::Colorize;
            return format!("{}: {}", "error".red().bold(), diagnostic.message.bold());
        }

        format!("error: {}", diagnostic.message)
    }

    fn underline(&self, width: usize) -> String {
        let marks = "^".repeat(width.max(1));

        #[cfg(feature = "terminal")]
        if self.use_color {
            use colored::Colorize;
            return marks.red().to_string();
        }

        marks
    }

    fn format_text(&self, diagnostic: &Diagnostic) -> String {
        let mut result = self.header(diagnostic);

        if self.show_code {
            result.push_str(&format!(" [{}]", diagnostic.code.as_str()));
        }
        result.push('\n');

        if let Some(location) = &diagnostic.location {
            result.push_str(&format!(" --> {location}\n"));

            if let Some(source) = &location.source_text {
                let line_number = location.span.start.line + 1;
                for (i, line) in source.lines().enumerate() {
                    result.push_str(&format!("{:4} | {}\n", line_number + i, line));
                }
                if let Some((start, end)) = location.underline {
                    result.push_str("     | ");
                    result.push_str(&" ".repeat(start));
                    result.push_str(&self.underline(end.saturating_sub(start)));
                    result.push('\n');
                }
            }
        }

        if !diagnostic.context.is_empty() {
            result.push_str(&format!(" in [{}]\n", diagnostic.context.join(", ")));
        }

        result
    }

    fn format_json(diagnostic: &Diagnostic) -> String {
        serde_json::to_string_pretty(diagnostic).unwrap_or_else(|e| {
            format!("{{\"message\": \"could not serialize diagnostic: {e}\"}}")
        })
    }

    fn format_compact(&self, diagnostic: &Diagnostic) -> String {
        let mut result = String::new();

        if let Some(location) = &diagnostic.location {
            result.push_str(&format!("{}: ", location.span.start));
        } else if !diagnostic.context.is_empty() {
            result.push_str(&format!("[{}]: ", diagnostic.context.join(", ")));
        }

        result.push_str(&format!("error: {}", diagnostic.message));

        if self.show_code {
            result.push_str(&format!(" [{}]", diagnostic.code.as_str()));
        }

        result
    }
}

impl Default for DiagnosticFormatter {
    fn default() -> Self {
        Self::new(Format::default())
    }
}
