//! Log sanitization for patient data.
//!
//! Every formatted log line passes through [`SanitizingMakeWriter`], which
//! redacts:
//! - Clinical key/value pairs (`age=60`, `"bmi": 22.0`, `cancer_stage: StageI`)
//! - Raw or scaled feature vectors (`[60.0, 1.0, 0.0, ...]`)
//! - E-mail addresses and phone numbers
//!
//! Callers should still avoid logging attribute values; this is the backstop.
//! Inputs larger than `LUNGSURV_SANITIZE_MAX_BYTES` (default 16 KiB) are
//! truncated before scanning.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

struct Pattern {
    regex: Regex,
    replacement: &'static str,
}

struct Patterns {
    set: RegexSet,
    rules: Vec<Pattern>,
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }

    let mut end = max_bytes.min(input.len());
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn max_sanitize_bytes() -> usize {
    std::env::var("LUNGSURV_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        // Applied in order; vectors go first so their numbers are not
        // partially consumed by the key/value rule.
        let rules: Vec<(&'static str, &'static str)> = vec![
            (
                r"\[\s*-?\d+(?:\.\d+)?(?:e-?\d+)?(?:\s*,\s*-?\d+(?:\.\d+)?(?:e-?\d+)?){4,}\s*\]",
                "[REDACTED-VECTOR]",
            ),
            (
                r#"(?i)\b("?(?:age|gender|country|cancer_stage|stage|family_history|smoking(?:_status)?|bmi|cholesterol(?:_level)?|hypertension|asthma|cirrhosis|other_cancer|treatment(?:_type)?)"?)(\s*[:=]\s*)("[^"]*"|[^\s,;})\]]+)"#,
                "${1}${2}[REDACTED]",
            ),
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
            ),
            (
                r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b",
                "[REDACTED-PHONE]",
            ),
        ];

        // Patterns are compile-time constants covered by tests.
        let set = RegexSet::new(rules.iter().map(|(p, _)| *p)).expect("Valid regex set");
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| Pattern {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        Patterns { set, rules }
    })
}

/// Redact patient data from a string.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let matched: Vec<usize> = patterns.set.matches(prefix).into_iter().collect();
    let mut result = prefix.to_string();
    for idx in matched {
        let pattern = &patterns.rules[idx];
        result = pattern
            .regex
            .replace_all(&result, pattern.replacement)
            .into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// Check if a string contains anything [`sanitize`] would redact.
#[must_use]
pub fn contains_patient_data(input: &str) -> bool {
    let (prefix, _) = truncate_to_char_boundary(input, max_sanitize_bytes());
    patterns().set.is_match(prefix)
}

/// A `tracing_subscriber` writer wrapper that sanitizes each formatted log
/// line before it reaches the underlying sink.
#[derive(Debug)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<M> Clone for SanitizingMakeWriter<M>
where
    M: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
    max_bytes: usize,
}

impl<W> SanitizingWriter<W> {
    fn new(inner: W) -> Self {
        Self::with_limit(inner, max_sanitize_bytes())
    }

    fn with_limit(inner: W, max_bytes: usize) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            max_bytes,
        }
    }
}

impl<W> SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line = self.buffer.drain(..=pos).collect::<Vec<u8>>();
            let mut sanitized = sanitize_with_limit(&String::from_utf8_lossy(&line), self.max_bytes);
            // Truncation cuts the terminator; keep one event per line.
            if !sanitized.ends_with('\n') {
                sanitized.push('\n');
            }
            self.inner.write_all(sanitized.as_bytes())?;
        }
        Ok(())
    }
}

impl<W> std::io::Write for SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // Bound buffering when a formatter emits a huge line without newlines.
        let hard_cap = self.max_bytes.saturating_mul(2);
        if hard_cap > 0 && self.buffer.len() > hard_cap {
            let sanitized = sanitize_with_limit(&String::from_utf8_lossy(&self.buffer), self.max_bytes);
            self.inner.write_all(sanitized.as_bytes())?;
            self.inner.write_all(b"\n[TRUNCATED]\n")?;
            self.buffer.clear();
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;

        if !self.buffer.is_empty() {
            let sanitized = sanitize_with_limit(&String::from_utf8_lossy(&self.buffer), self.max_bytes);
            self.inner.write_all(sanitized.as_bytes())?;
            self.buffer.clear();
        }

        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sanitize_key_values() {
        let sanitized = sanitize("request age=60 bmi: 22.5 cholesterol_level=240 done");
        assert!(!sanitized.contains("60"));
        assert!(!sanitized.contains("22.5"));
        assert!(!sanitized.contains("240"));
        assert!(sanitized.contains("age=[REDACTED]"));
        assert!(sanitized.ends_with("done"));
    }

    #[test]
    fn test_sanitize_debug_struct() {
        let sanitized = sanitize("PatientAttributes { age: 71, gender: Female, cancer_stage: StageIII }");
        assert!(!sanitized.contains("71"));
        assert!(!sanitized.contains("Female"));
        assert!(!sanitized.contains("StageIII"));
    }

    #[test]
    fn test_sanitize_json_fields() {
        let sanitized = sanitize(r#"{"gender":"Male","country":"UK"}"#);
        assert!(!sanitized.contains("Male"));
        assert!(!sanitized.contains("UK"));
    }

    #[test]
    fn test_sanitize_feature_vector() {
        let sanitized =
            sanitize("scaled [0.52, -1.3, 0.0, 2.1, 1e-3, 0.44, 1.0] ready");
        assert!(sanitized.contains("[REDACTED-VECTOR]"));
        assert!(!sanitized.contains("-1.3"));
    }

    #[test]
    fn test_sanitize_email() {
        let sanitized = sanitize("Contact: patient@hospital.com");
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
    }

    #[test]
    fn test_plain_text_untouched() {
        let line = "Loaded artifacts from \"models\"";
        assert!(!contains_patient_data(line));
        assert_eq!(sanitize(line), line);
    }

    #[test]
    fn test_sanitize_truncates_large_inputs() {
        let input = "prefix with a long tail that keeps going";
        let sanitized = sanitize_with_limit(input, 16);
        assert!(sanitized.ends_with("[TRUNCATED]"));
    }

    #[test]
    fn test_writer_sanitizes_lines() {
        #[derive(Clone, Default)]
        struct Sink(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

        impl Write for Sink {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().expect("lock").extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let sink = Sink::default();
        let mut writer = SanitizingWriter::new(sink.clone());
        writer.write_all(b"age=44 ").expect("write");
        writer.write_all(b"predicted\n").expect("write");
        writer.flush().expect("flush");

        let out = String::from_utf8(sink.0.lock().expect("lock").clone()).expect("utf-8");
        assert_eq!(out, "age=[REDACTED] predicted\n");
    }

    #[test]
    fn test_writer_keeps_line_breaks_after_truncation() {
        let mut out = Vec::new();
        {
            let mut writer = SanitizingWriter::with_limit(&mut out, 24);
            writer
                .write_all(b"prefix with a long tail that keeps going\n")
                .expect("write");
            writer.write_all(b"next event\n").expect("write");
            writer.flush().expect("flush");
        }

        let out = String::from_utf8(out).expect("utf-8");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[TRUNCATED]"));
        assert_eq!(lines[1], "next event");
    }
}
