//! Structured JSON logger
//!
//! One log line is one event: `event` key first, then `severity`, then
//! the remaining fields sorted alphabetically. Output is synchronous and
//! unbuffered, so log order always matches event order.

use std::fmt;
use std::io::{self, Write};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Planning detail (pruning decisions, candidate registration)
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Operation failures
    Error = 2,
    /// Unrecoverable, process exits
    Fatal = 3,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Writes structured JSON log lines
pub struct Logger;

impl Logger {
    /// Logs an event with the given severity and fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        Self::log_to_writer(severity, event, fields, &mut io::stdout());
    }

    /// Logs to stderr (errors and fatal conditions)
    pub fn log_stderr(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        Self::log_to_writer(severity, event, fields, &mut io::stderr());
    }

    fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        // Hand-built JSON keeps the key order deterministic
        let mut output = String::with_capacity(256);

        output.push_str("{\"event\":\"");
        Self::escape_json_string(&mut output, event);
        output.push_str("\",\"severity\":\"");
        output.push_str(severity.as_str());
        output.push('"');

        let mut sorted_fields: Vec<_> = fields.iter().collect();
        sorted_fields.sort_by_key(|(key, _)| *key);

        for (key, value) in sorted_fields {
            output.push_str(",\"");
            Self::escape_json_string(&mut output, key);
            output.push_str("\":\"");
            Self::escape_json_string(&mut output, value);
            output.push('"');
        }

        output.push_str("}\n");

        // One write_all call, one line
        let _ = writer.write_all(output.as_bytes());
        let _ = writer.flush();
    }

    fn escape_json_string(output: &mut String, s: &str) {
        for c in s.chars() {
            match c {
                '"' => output.push_str("\\\""),
                '\\' => output.push_str("\\\\"),
                '\n' => output.push_str("\\n"),
                '\r' => output.push_str("\\r"),
                '\t' => output.push_str("\\t"),
                c if c.is_control() => {
                    output.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => output.push(c),
            }
        }
    }

    /// Logs at TRACE level
    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    /// Logs at INFO level
    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    /// Logs at ERROR level
    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log_stderr(Severity::Error, event, fields);
    }

    /// Logs at FATAL level
    pub fn fatal(event: &str, fields: &[(&str, &str)]) {
        Self::log_stderr(Severity::Fatal, event, fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut buffer = Vec::new();
        Logger::log_to_writer(severity, event, fields, &mut buffer);
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Info < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_log_is_valid_json() {
        let output = capture(Severity::Trace, "PARTITION_PRUNE", &[("table", "sales")]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["event"], "PARTITION_PRUNE");
        assert_eq!(parsed["severity"], "TRACE");
        assert_eq!(parsed["table"], "sales");
    }

    #[test]
    fn test_fields_sorted_alphabetically() {
        let shuffled = capture(
            Severity::Trace,
            "PARTITION_PRUNE",
            &[("table", "sales"), ("children", "4"), ("surviving", "2")],
        );
        let sorted = capture(
            Severity::Trace,
            "PARTITION_PRUNE",
            &[("children", "4"), ("surviving", "2"), ("table", "sales")],
        );
        assert_eq!(shuffled, sorted);

        let children = shuffled.find("children").unwrap();
        let surviving = shuffled.find("surviving").unwrap();
        let table = shuffled.find("\"table\"").unwrap();
        assert!(children < surviving && surviving < table);
    }

    #[test]
    fn test_event_key_first() {
        let output = capture(Severity::Info, "CATALOG_LOADED", &[("tables", "1")]);
        assert!(output.starts_with("{\"event\":\"CATALOG_LOADED\""));
        assert!(output.ends_with("}\n"));
        assert_eq!(output.matches('\n').count(), 1);
    }

    #[test]
    fn test_special_characters_escaped() {
        let output = capture(Severity::Error, "TEST", &[("message", "a \"b\"\nc")]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["message"], "a \"b\"\nc");
    }
}
