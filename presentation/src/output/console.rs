//! Console output formatter for workflow results

use colored::Colorize;
use review_domain::{
    AgentReview, ConsensusRound, ContentDraft, ReviewDecision, ReviewRecord, WorkflowState,
    WorkflowStatus,
};

/// Formats workflow results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete workflow: every round, every review, the final draft
    pub fn format(state: &WorkflowState) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Content Review Results"));
        output.push('\n');
        output.push_str(&Self::overview(state));

        for round in state.rounds() {
            output.push_str(&Self::section_header(&format!(
                "Round {} (draft v{})",
                round.round, round.draft_version
            )));
            for review in Self::reviews_of(state, round.round) {
                output.push_str(&Self::review_block(review));
            }
            output.push_str(&format!("\n{}\n", Self::round_line(round)));
        }

        output.push_str(&Self::human_decisions(state));

        if let Some(draft) = state.current_draft() {
            output.push_str(&Self::section_header("Final Draft"));
            output.push_str(&Self::draft_block(draft));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(state: &WorkflowState) -> String {
        serde_json::to_string_pretty(state).unwrap_or_else(|_| "{}".to_string())
    }

    /// Status, vote history and the final draft
    pub fn format_summary(state: &WorkflowState) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n\n", "=== Content Review ===".cyan().bold()));
        output.push_str(&Self::overview(state));
        for round in state.rounds() {
            output.push_str(&format!("  {}\n", Self::round_line(round)));
        }
        output.push_str(&Self::human_decisions(state));
        output.push('\n');

        if let Some(draft) = state.current_draft() {
            output.push_str(&Self::draft_block(draft));
        }
        output
    }

    fn overview(state: &WorkflowState) -> String {
        let mut output = format!(
            "{} {}\n{} {}\n{} {}\n{} {}/{}\n",
            "Workflow:".cyan().bold(),
            state.workflow_id(),
            "Topic:".cyan().bold(),
            state.request().topic,
            "Status:".cyan().bold(),
            Self::status_label(state.status()),
            "Iterations:".cyan().bold(),
            state.iteration_count(),
            state.max_iterations()
        );
        if state.status() == WorkflowStatus::AwaitingHumanApproval
            && let Some(expires_at) = state.token_expires_at()
        {
            output.push_str(&format!(
                "{} {}\n",
                "Approval expires:".yellow().bold(),
                expires_at.to_rfc3339()
            ));
        }
        output.push('\n');
        output
    }

    fn reviews_of(state: &WorkflowState, round: u32) -> impl Iterator<Item = &AgentReview> {
        state.review_history().iter().filter_map(move |record| match record {
            ReviewRecord::Agent {
                round: r, review, ..
            } if *r == round => Some(review),
            _ => None,
        })
    }

    fn human_decisions(state: &WorkflowState) -> String {
        let mut output = String::new();
        for record in state.review_history() {
            if let ReviewRecord::Human {
                decision,
                rationale,
                decided_at,
            } = record
            {
                output.push_str(&format!(
                    "{} {} at {}",
                    "Human decision:".cyan().bold(),
                    decision,
                    decided_at.to_rfc3339()
                ));
                if let Some(rationale) = rationale {
                    output.push_str(&format!(" ({})", rationale));
                }
                output.push('\n');
            }
        }
        output
    }

    fn round_line(round: &ConsensusRound) -> String {
        let outcome = if round.outcome.is_accepted() {
            round.outcome.to_string().green()
        } else {
            round.outcome.to_string().red()
        };
        format!(
            "Round {}: {} {} approved, {} minor, {} major -> {}",
            round.round,
            round.vote.vote_summary(),
            round.vote.approved_count,
            round.vote.minor_issue_count,
            round.vote.major_issue_count,
            outcome
        )
    }

    fn review_block(review: &AgentReview) -> String {
        let mut output = format!(
            "\n{} {} ({}, confidence {:.2})\n{}\n",
            format!("── {} ──", review.reviewer_name).yellow().bold(),
            Self::decision_label(review.decision),
            review.source,
            review.confidence,
            Self::indent(review.feedback.trim(), "  ")
        );
        for issue in &review.issues_found {
            output.push_str(&format!("  {} {}\n", "!".red(), issue));
        }
        for suggestion in &review.suggestions {
            output.push_str(&format!("  {} {}\n", "*".cyan(), suggestion));
        }
        output
    }

    fn draft_block(draft: &ContentDraft) -> String {
        let mut output = format!(
            "{} {}\n",
            format!("v{}", draft.version()).dimmed(),
            draft.title().bold()
        );
        if let Some(meta) = draft.meta_description() {
            output.push_str(&format!("{}\n", meta.italic()));
        }
        output.push_str(&format!(
            "{}\n\n{}\n",
            format!("{} words", draft.word_count()).dimmed(),
            draft.body()
        ));
        output
    }

    fn decision_label(decision: ReviewDecision) -> colored::ColoredString {
        match decision {
            ReviewDecision::Approved => decision.as_str().green(),
            ReviewDecision::MinorIssue => decision.as_str().yellow(),
            ReviewDecision::MajorIssue => decision.as_str().red(),
        }
    }

    fn status_label(status: WorkflowStatus) -> colored::ColoredString {
        match status {
            WorkflowStatus::Approved => status.as_str().green().bold(),
            WorkflowStatus::Rejected | WorkflowStatus::Expired => status.as_str().red().bold(),
            WorkflowStatus::AwaitingHumanApproval => status.as_str().yellow().bold(),
            _ => status.as_str().normal(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
