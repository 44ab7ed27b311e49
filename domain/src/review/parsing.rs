//! Assessment response parsing.
//!
//! Service-backed evaluators ask a model for a JSON verdict. Models wrap
//! JSON in prose or fenced code blocks, so the object is located first and
//! then deserialized. A response without a usable decision is rejected
//! rather than guessed at; the evaluator then falls back to its rules.

use super::decision::ReviewDecision;
use serde::Deserialize;

/// Structured verdict returned by a service-backed assessment
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceAssessment {
    pub decision: ReviewDecision,
    pub feedback: String,
    pub confidence: Option<f64>,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Deserialize)]
struct RawAssessment {
    decision: String,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default, alias = "issues_found")]
    issues: Vec<String>,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Extract the outermost JSON object from a free-form response
pub fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response[start..].rfind('}')?;
    Some(&response[start..start + end + 1])
}

/// Parse a model's assessment response.
///
/// # Examples
///
/// ```
/// use review_domain::review::{ReviewDecision, parse_assessment};
///
/// let parsed = parse_assessment(
///     r#"Verdict: {"decision": "minor_issue", "feedback": "Add a CTA", "confidence": 0.7}"#,
/// )
/// .unwrap();
/// assert_eq!(parsed.decision, ReviewDecision::MinorIssue);
/// assert!(parse_assessment("looks fine to me").is_err());
/// ```
pub fn parse_assessment(response: &str) -> Result<ServiceAssessment, String> {
    let json = extract_json_object(response)
        .ok_or_else(|| "assessment response contains no JSON object".to_string())?;
    let raw: RawAssessment =
        serde_json::from_str(json).map_err(|e| format!("malformed assessment JSON: {}", e))?;
    let decision: ReviewDecision = raw.decision.parse()?;

    Ok(ServiceAssessment {
        decision,
        feedback: raw.feedback,
        confidence: raw.confidence,
        issues: raw.issues,
        suggestions: raw.suggestions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fenced_json() {
        let response = r#"
Here is my assessment:
```json
{"decision": "major_issue", "feedback": "Unsupported claims", "confidence": 0.9,
 "issues": ["'guaranteed' without disclaimer"], "suggestions": ["Add a disclaimer"]}
```
"#;
        let parsed = parse_assessment(response).unwrap();
        assert_eq!(parsed.decision, ReviewDecision::MajorIssue);
        assert_eq!(parsed.confidence, Some(0.9));
        assert_eq!(parsed.issues.len(), 1);
        assert_eq!(parsed.suggestions, vec!["Add a disclaimer".to_string()]);
    }

    #[test]
    fn test_parse_accepts_issues_found_alias() {
        let parsed =
            parse_assessment(r#"{"decision": "approved", "issues_found": ["none really"]}"#)
                .unwrap();
        assert_eq!(parsed.decision, ReviewDecision::Approved);
        assert_eq!(parsed.issues, vec!["none really".to_string()]);
        assert_eq!(parsed.feedback, "");
    }

    #[test]
    fn test_parse_rejects_unknown_decision() {
        let err = parse_assessment(r#"{"decision": "perhaps"}"#).unwrap_err();
        assert!(err.contains("unknown review decision"));
    }

    #[test]
    fn test_parse_rejects_missing_json() {
        assert!(parse_assessment("APPROVE").is_err());
        assert!(parse_assessment("{not json}").is_err());
    }
}
