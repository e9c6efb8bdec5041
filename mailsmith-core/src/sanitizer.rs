//! Cleanup of generated email bodies.
//!
//! Generated bodies tend to start with stray blank lines and an echo of the
//! subject. Lines are trimmed, blank lines are removed, and the first remaining
//! line is dropped according to a [`LeadingLineRule`].

use std::sync::Arc;

/// Decides whether the first non-blank line of a generated body is an artifact.
pub trait LeadingLineRule: Send + Sync {
    fn is_artifact(&self, subject: &str, first_line: &str) -> bool;
}

/// Always drops the first line, whether or not it echoes the subject.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLine;

impl LeadingLineRule for FirstLine {
    fn is_artifact(&self, _subject: &str, _first_line: &str) -> bool {
        true
    }
}

/// Drops the first line only when it repeats the subject, ignoring case,
/// surrounding whitespace, a `Subject:` label and trailing periods.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubjectEcho;

impl SubjectEcho {
    fn normalize(line: &str) -> String {
        let line = line.trim();
        let line = match line.get(..8) {
            Some(label) if label.eq_ignore_ascii_case("subject:") => &line[8..],
            _ => line,
        };
        line.trim().trim_end_matches('.').trim_end().to_lowercase()
    }
}

impl LeadingLineRule for SubjectEcho {
    fn is_artifact(&self, subject: &str, first_line: &str) -> bool {
        let subject = Self::normalize(subject);
        !subject.is_empty() && subject == Self::normalize(first_line)
    }
}

#[derive(Clone)]
pub struct BodySanitizer {
    rule: Arc<dyn LeadingLineRule>,
}

impl Default for BodySanitizer {
    fn default() -> Self {
        Self::new(Arc::new(FirstLine))
    }
}

impl BodySanitizer {
    pub fn new(rule: Arc<dyn LeadingLineRule>) -> Self {
        Self { rule }
    }

    pub fn sanitize(&self, subject: &str, raw_body: &str) -> String {
        let lines: Vec<&str> = raw_body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let Some(first) = lines.first() else {
            // Nothing survived; hand back what the upstream produced
            return raw_body.to_owned();
        };

        let skip = usize::from(self.rule.is_artifact(subject, first));
        lines[skip..].join("\n")
    }
}

/// Sanitizes with the default [`FirstLine`] rule.
pub fn sanitize(subject: &str, raw_body: &str) -> String {
    BodySanitizer::default().sanitize(subject, raw_body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_returned_unchanged() {
        assert_eq!(sanitize("Subject", ""), "");
        assert_eq!(sanitize("Subject", "\n\n"), "\n\n");
        assert_eq!(sanitize("Subject", "  \n\t\n"), "  \n\t\n");
    }

    #[test]
    fn test_first_line_dropped_unconditionally() {
        assert_eq!(sanitize("X", "Echo\nReal content"), "Real content");
        assert_eq!(sanitize("X", "Hi Sam,\nThanks"), "Thanks");
    }

    #[test]
    fn test_blank_lines_collapsed_and_lines_trimmed() {
        let raw = "\n\nDeadline Extension\n\n  Hi team,  \n\nCould we move the date?\n\nRegards and thanks,\nAlex\n";
        assert_eq!(
            sanitize("Deadline Extension", raw),
            "Hi team,\nCould we move the date?\nRegards and thanks,\nAlex"
        );
    }

    #[test]
    fn test_single_line_body_becomes_empty() {
        assert_eq!(sanitize("X", "Only line"), "");
    }

    #[test]
    fn test_subject_echo_rule() {
        let sanitizer = BodySanitizer::new(Arc::new(SubjectEcho));

        assert_eq!(
            sanitizer.sanitize("Request for Deadline Extension", "Subject: request for deadline extension.\nHi team,"),
            "Hi team,"
        );
        assert_eq!(
            sanitizer.sanitize("Request for Deadline Extension", "\nHi team,\nThanks"),
            "Hi team,\nThanks"
        );
    }

    #[test]
    fn test_subject_echo_ignores_empty_subject() {
        let sanitizer = BodySanitizer::new(Arc::new(SubjectEcho));
        assert_eq!(sanitizer.sanitize("", "Hi team,\nThanks"), "Hi team,\nThanks");
    }
}
