//! Progress reporting for review workflows

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use review_application::{ApprovalTicket, ReviewProgressNotifier};
use review_domain::{AgentReview, ConsensusRound, ContentDraft, ReviewDecision, WorkflowState};
use std::sync::Mutex;

/// Reports progress with a bar per review round
pub struct ProgressReporter {
    multi: MultiProgress,
    round_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            round_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn println(&self, line: String) {
        let _ = self.multi.println(line);
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn verdict_mark(review: &AgentReview) -> String {
    let mark = match review.decision {
        ReviewDecision::Approved => "v".green(),
        ReviewDecision::MinorIssue => "~".yellow(),
        ReviewDecision::MajorIssue => "x".red(),
    };
    let fallback = if review.is_fallback() {
        " (rules)".dimmed().to_string()
    } else {
        String::new()
    };
    format!("{} {}{}", mark, review.reviewer_name, fallback)
}

fn escalation_lines(ticket: &ApprovalTicket) -> [String; 2] {
    [
        format!(
            "{} Human approval required for {}",
            "!".yellow().bold(),
            ticket.workflow_id
        ),
        format!(
            "  {} (expires {})",
            ticket.approval_url.underline(),
            ticket.expires_at.to_rfc3339()
        ),
    ]
}

impl ReviewProgressNotifier for ProgressReporter {
    fn on_draft_ready(&self, draft: &ContentDraft) {
        self.println(format!(
            "{} Draft v{}: {} ({} words)",
            "->".cyan(),
            draft.version(),
            draft.title().bold(),
            draft.word_count()
        ));
    }

    fn on_review_start(&self, round: u32, reviewers: usize) {
        let pb = self.multi.add(ProgressBar::new(reviewers as u64));
        pb.set_style(Self::round_style());
        pb.set_prefix(format!("Round {}", round));
        pb.set_message("Reviewing...");
        if let Ok(mut bar) = self.round_bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_review_complete(&self, review: &AgentReview) {
        if let Ok(bar) = self.round_bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            pb.set_message(verdict_mark(review));
            pb.inc(1);
        }
    }

    fn on_round_complete(&self, round: &ConsensusRound) {
        let message = if round.outcome.is_accepted() {
            format!("{} {}", round.vote.vote_summary(), round.outcome.to_string().green())
        } else {
            format!("{} {}", round.vote.vote_summary(), round.outcome.to_string().red())
        };
        if let Ok(mut bar) = self.round_bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_with_message(message);
        }
    }

    fn on_redraft(&self, next_iteration: u32, _feedback: &str) {
        self.println(format!(
            "{} Redrafting (iteration {})",
            "<-".yellow(),
            next_iteration
        ));
    }

    fn on_escalation(&self, ticket: &ApprovalTicket) {
        for line in escalation_lines(ticket) {
            self.println(line);
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ReviewProgressNotifier for SimpleProgress {
    fn on_draft_ready(&self, draft: &ContentDraft) {
        println!("{} Draft v{}: {}", "->".cyan(), draft.version(), draft.title().bold());
    }

    fn on_review_start(&self, round: u32, reviewers: usize) {
        println!("{} Round {} ({} reviewers)", "->".cyan(), round, reviewers);
    }

    fn on_review_complete(&self, review: &AgentReview) {
        println!("  {}", verdict_mark(review));
    }

    fn on_round_complete(&self, round: &ConsensusRound) {
        println!("  {} {}", round.vote.vote_summary(), round.outcome);
    }

    fn on_redraft(&self, next_iteration: u32, _feedback: &str) {
        println!("{} Redrafting (iteration {})", "<-".yellow(), next_iteration);
    }

    fn on_escalation(&self, ticket: &ApprovalTicket) {
        for line in escalation_lines(ticket) {
            println!("{}", line);
        }
    }

    fn on_workflow_settled(&self, state: &WorkflowState) {
        println!("{} {}", "=>".cyan(), state.status());
    }
}
