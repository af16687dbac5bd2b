use colored::*;
use pkgdef::{ErrorCode, ErrorReport, Severity};
use std::fmt::Write;

/// A rule violation rendered with its file, source line and a hint.
pub struct ReportDisplay<'a> {
    pub report: &'a ErrorReport,
    pub file: Option<String>,
    pub source: Option<&'a str>,
    pub help: Option<&'static str>,
}

impl<'a> ReportDisplay<'a> {
    pub fn new(report: &'a ErrorReport) -> Self {
        Self {
            report,
            file: None,
            source: None,
            help: help_for(report.code),
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let report = self.report;

        let label = match report.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Suggestion => "suggestion".cyan().bold(),
        };
        let _ = writeln!(
            out,
            "{}[{}]: {}",
            label,
            report.code,
            report.message.bold()
        );

        if let Some(file) = &self.file {
            let _ = writeln!(
                out,
                "  {} {}:{}:{}",
                "-->".blue().bold(),
                file,
                report.line + 1,
                report.column + 1
            );
        }

        if let Some(line) = self.source.and_then(|s| s.lines().nth(report.line)) {
            let line_num = (report.line + 1).to_string();
            let width = line_num.len();
            let carets = "^".repeat(report.span.len().max(1));

            let _ = writeln!(out, "{:>width$} {}", "", "|".blue().bold(), width = width);
            let _ = writeln!(
                out,
                "{} {} {}",
                line_num.blue().bold(),
                "|".blue().bold(),
                line
            );
            let _ = writeln!(
                out,
                "{:>width$} {} {}{}",
                "",
                "|".blue().bold(),
                " ".repeat(report.column),
                carets.red().bold(),
                width = width
            );
        }

        if let Some(help) = self.help {
            let _ = writeln!(out, "{} {}", "help:".cyan().bold(), help);
        }

        out
    }

    pub fn display(&self) {
        println!("{}", self.render());
    }
}

fn help_for(code: ErrorCode) -> Option<&'static str> {
    match code {
        ErrorCode::PL001 => Some("Lines must be a comment, a [key], a \"name\"=value pair or a #preprocessor directive"),
        ErrorCode::PL002 => Some("Close the key with ]"),
        ErrorCode::PL003 => Some("Write registry paths as [Parent\\Child]"),
        ErrorCode::PL004 => Some("Write @=\"value\""),
        ErrorCode::PL005 => Some("Write \"Name\"=\"value\""),
        ErrorCode::PL006 => Some("Run `pkgdef variables` to list the predefined variables"),
        ErrorCode::PL007 => Some("Write the variable as $Name$"),
        ErrorCode::PL008 => None,
        ErrorCode::PL009 => Some("Example: dword:0000007b"),
        ErrorCode::PL010 => Some("Example: qword:000000000000007b"),
        ErrorCode::PL011 => Some("Example: hex:01,02,ff"),
    }
}
