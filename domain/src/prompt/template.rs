//! Prompt templates for assessments and drafting

use crate::draft::{ContentDraft, DraftRequest};
use crate::review::ReviewerKind;

/// Templates for the structured assessment requested by each evaluator
pub struct AssessmentPromptTemplate;

impl AssessmentPromptTemplate {
    /// System prompt for a reviewer
    pub fn system(kind: ReviewerKind) -> String {
        let focus = match kind {
            ReviewerKind::BrandTone => {
                "You review marketing content for brand voice. Judge whether the tone, \
vocabulary and positioning match the brand guidelines you are given, and whether the \
required brand keywords are present."
            }
            ReviewerKind::MarketingSeo => {
                "You review marketing content for search and conversion. Judge the title \
length, meta description length, keyword usage and density, and whether the content ends \
with a clear call to action."
            }
            ReviewerKind::SecurityCompliance => {
                "You review marketing content for security and regulatory compliance. Look \
for leaked sensitive data, unsubstantiated claims, and regulated topics that lack the \
required disclaimers."
            }
        };
        format!(
            r#"{focus}

Respond with a single JSON object and nothing else:
{{"decision": "approved" | "minor_issue" | "major_issue",
 "feedback": "<one paragraph>",
 "confidence": <0.0-1.0>,
 "issues": ["<issue>", ...],
 "suggestions": ["<suggestion>", ...]}}

Use "major_issue" only for problems that make the content unpublishable as written."#
        )
    }

    /// User prompt presenting the draft and the reviewer's guidelines
    pub fn assessment(kind: ReviewerKind, draft: &ContentDraft, guidelines: &str) -> String {
        let mut prompt = format!(
            "Review the following draft as the {} reviewer.\n\nGuidelines:\n{}\n\n",
            kind.display_name(),
            guidelines.trim()
        );
        prompt.push_str(&format!("Title: {}\n", draft.title()));
        if let Some(meta) = draft.meta_description() {
            prompt.push_str(&format!("Meta description: {}\n", meta));
        }
        if !draft.keywords().is_empty() {
            prompt.push_str(&format!("Target keywords: {}\n", draft.keywords().join(", ")));
        }
        if let Some(category) = draft.category() {
            prompt.push_str(&format!("Category: {}\n", category));
        }
        prompt.push_str(&format!(
            "Word count: {}\n\n--- BODY ---\n{}\n--- END ---",
            draft.word_count(),
            draft.body()
        ));
        prompt
    }
}

/// Templates for generating and regenerating drafts
pub struct DraftPromptTemplate;

impl DraftPromptTemplate {
    pub fn system() -> &'static str {
        r#"You are a senior copywriter for a premium brand.
Write polished, accurate marketing content. Never include personal data or unverifiable claims.
Respond with a single JSON object and nothing else:
{"title": "<at most 60 characters>", "meta_description": "<120-160 characters>", "body": "<the full article>"}"#
    }

    pub fn initial(request: &DraftRequest) -> String {
        let mut prompt = format!(
            "Write an article about: {}\n\nTone: {}\nTarget length: about {} words\n",
            request.topic, request.tone, request.target_length
        );
        if !request.keywords.is_empty() {
            prompt.push_str(&format!("Keywords to include: {}\n", request.keywords.join(", ")));
        }
        for (key, value) in &request.metadata {
            prompt.push_str(&format!("{}: {}\n", key, value));
        }
        prompt
    }

    pub fn redraft(request: &DraftRequest, previous: &ContentDraft, feedback: &str) -> String {
        format!(
            r#"Rewrite the draft below so that it addresses every point of the reviewer feedback.
Keep the topic ({topic}), the tone ({tone}) and the keywords ({keywords}).

Reviewer feedback:
{feedback}

Previous draft (version {version}):
Title: {title}
Meta description: {meta}

{body}"#,
            topic = request.topic,
            tone = request.tone,
            keywords = previous.keywords().join(", "),
            feedback = feedback.trim(),
            version = previous.version(),
            title = previous.title(),
            meta = previous.meta_description().unwrap_or("(none)"),
            body = previous.body(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::DraftContent;
    use chrono::Utc;

    fn draft() -> ContentDraft {
        let request = DraftRequest::new("Silk care", vec!["silk".into()])
            .unwrap()
            .with_category("fashion");
        ContentDraft::initial(
            &request,
            DraftContent::new("Caring for silk", "Gentle washing keeps silk bright."),
            "writer",
            Utc::now(),
        )
    }

    #[test]
    fn test_system_prompt_demands_json() {
        for kind in ReviewerKind::ALL {
            let prompt = AssessmentPromptTemplate::system(kind);
            assert!(prompt.contains("\"decision\""));
            assert!(prompt.contains("major_issue"));
        }
    }

    #[test]
    fn test_assessment_prompt_includes_draft() {
        let prompt = AssessmentPromptTemplate::assessment(
            ReviewerKind::MarketingSeo,
            &draft(),
            "Titles under 60 characters.",
        );
        assert!(prompt.contains("SEO Marketing"));
        assert!(prompt.contains("Title: Caring for silk"));
        assert!(prompt.contains("Target keywords: silk"));
        assert!(prompt.contains("Category: fashion"));
        assert!(prompt.contains("Gentle washing"));
    }

    #[test]
    fn test_redraft_prompt_carries_feedback() {
        let d = draft();
        let request = DraftRequest::new("Silk care", vec!["silk".into()]).unwrap();
        let prompt = DraftPromptTemplate::redraft(&request, &d, "brand_tone: too casual");
        assert!(prompt.contains("brand_tone: too casual"));
        assert!(prompt.contains("version 1"));
        assert!(prompt.contains("Meta description: (none)"));
    }
}
