use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

lazy_static! {
    static ref EMAIL_REGEX: Regex = compile(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b");
    static ref PHONE_REGEX: Regex = compile(r"(?:\+\d{1,3}[-.\s]?)?\(?\b\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b");
    static ref RECORD_NUMBER_REGEX: Regex = compile(r"\b(?:MRN|mrn)?\d{6,}\b");
}

/// Which identifiers are masked inside an utterance
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub redact_record_numbers: bool,
    /// Log only a fingerprint instead of the (masked) text
    pub fingerprint_only: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_phones: true,
            redact_record_numbers: true,
            fingerprint_only: true,
        }
    }
}

/// Masks identifiers in free-text utterances before they reach a log line.
///
/// Users describe their symptoms in their own words and sometimes include
/// contact details or record numbers. The redactor keeps those out of logs
/// and provides a stable fingerprint so log lines about the same utterance
/// can still be correlated.
#[derive(Debug, Clone, Default)]
pub struct UtteranceRedactor {
    config: RedactionConfig,
}

impl UtteranceRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.config.redact_emails {
            result = EMAIL_REGEX.replace_all(&result, "[EMAIL]").into_owned();
        }

        if self.config.redact_phones {
            result = PHONE_REGEX.replace_all(&result, "[PHONE]").into_owned();
        }

        if self.config.redact_record_numbers {
            result = RECORD_NUMBER_REGEX.replace_all(&result, "[RECORD]").into_owned();
        }

        result
    }

    /// Short, stable hash of the utterance
    pub fn fingerprint(&self, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let digest = hasher.finalize();
        general_purpose::URL_SAFE_NO_PAD.encode(&digest[..8])
    }

    /// The representation of an utterance that is safe to put in a log line
    pub fn loggable(&self, text: &str) -> String {
        if self.config.fingerprint_only {
            format!("utt#{} ({} chars)", self.fingerprint(text), text.chars().count())
        } else {
            self.redact(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masking_redactor() -> UtteranceRedactor {
        UtteranceRedactor::new(RedactionConfig {
            fingerprint_only: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_email_redaction() {
        let text = "I have a rash, reach me at jane.doe@example.com";
        let redacted = masking_redactor().redact(text);
        assert_eq!(redacted, "I have a rash, reach me at [EMAIL]");
    }

    #[test]
    fn test_phone_redaction() {
        let text = "fever since monday, call (555) 123-4567";
        let redacted = masking_redactor().redact(text);
        assert!(redacted.contains("[PHONE]"));
        assert!(!redacted.contains("4567"));
    }

    #[test]
    fn test_record_number_redaction() {
        let redacted = masking_redactor().redact("patient MRN1234567 reports chills");
        assert_eq!(redacted, "patient [RECORD] reports chills");
    }

    #[test]
    fn test_symptom_text_untouched() {
        let text = "headache and high fever for 3 days";
        assert_eq!(masking_redactor().redact(text), text);
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let redactor = UtteranceRedactor::default();
        let a = redactor.fingerprint("joint pain");
        let b = redactor.fingerprint("joint pain");
        let c = redactor.fingerprint("muscle pain");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 11);
    }

    #[test]
    fn test_loggable_hides_text_by_default() {
        let redactor = UtteranceRedactor::default();
        let line = redactor.loggable("I feel very tired");
        assert!(line.starts_with("utt#"));
        assert!(line.ends_with("(17 chars)"));
        assert!(!line.contains("tired"));
    }
}
