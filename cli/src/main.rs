//! CLI entrypoint for Content Quorum
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod logging;

use anyhow::{Context, Result, bail};
use clap::Parser;
use review_application::{
    AuditLogger, CircuitBreakerRegistry, Clock, HumanApprovalGateway, NoAuditLogger, NoProgress,
    ProviderInvoker, ResilienceExecutor, ReviewProgressNotifier, RunReviewWorkflowUseCase,
    StartWorkflowInput, SystemClock, WorkflowEventSink, WorkflowStore, review_panel,
};
use review_domain::{DraftRequest, WorkflowState, WorkflowStatus};
use review_infrastructure::{
    ConfigLoader, FileConfig, JsonlAuditLogger, LlmDraftGenerator, LoggingApprovalNotifier,
    LoggingEventSink, WebhookEventSink, build_providers, serve_approvals,
};
use review_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")?
    };
    config.validate().context("invalid configuration")?;

    let _logging = logging::init_tracing(cli.verbose, config.logging.dir.as_deref())?;
    info!("Starting Content Quorum");

    let Some(topic) = cli.topic.clone() else {
        bail!("A topic is required. Run with --help for usage.");
    };
    if config.providers.is_empty() {
        bail!(
            "No providers configured. Add a [[providers]] entry to content-quorum.toml \
             (see --show-config for the files that are read)."
        );
    }

    // === Dependency Injection ===
    let settings = config.resilience.to_settings();
    let breakers = Arc::new(CircuitBreakerRegistry::new(settings.breaker.clone()));
    let executor = ResilienceExecutor::new(breakers);
    let invoker = Arc::new(ProviderInvoker::new(
        build_providers(&config.providers),
        executor.clone(),
        &settings,
    ));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let policy = config.workflow.to_policy();

    let events: Arc<dyn WorkflowEventSink> = match &config.events.webhook_url {
        Some(url) => Arc::new(WebhookEventSink::new(url, executor.clone())),
        None => Arc::new(LoggingEventSink),
    };
    let audit = audit_logger(&config);

    let gateway = Arc::new(
        HumanApprovalGateway::new(
            Arc::new(WorkflowStore::new()),
            policy.clone(),
            Arc::clone(&clock),
        )
        .with_notifier(Arc::new(LoggingApprovalNotifier))
        .with_event_sink(events)
        .with_audit_logger(audit),
    );
    let panel = review_panel(&config.guidelines(), Some(Arc::clone(&invoker)), clock);
    let use_case = RunReviewWorkflowUseCase::new(
        Arc::new(LlmDraftGenerator::new(invoker)),
        panel,
        Arc::clone(&gateway),
    );

    let mut request = DraftRequest::new(topic, cli.keywords.clone())?;
    if let Some(tone) = &cli.tone {
        request = request.with_tone(tone);
    }
    if let Some(category) = &cli.category {
        request = request.with_category(category);
    }
    let mut input = StartWorkflowInput::new(request);
    if !cli.reviewers.is_empty() {
        input = input.with_reviewers(cli.reviewers.clone());
    }
    if let Some(max_iterations) = cli.max_iterations {
        input = input.with_max_iterations(max_iterations);
    }

    let progress: Box<dyn ReviewProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressReporter::new())
    };
    let workflow_id = use_case
        .start_workflow_with_progress(input, progress.as_ref())
        .await?;
    let mut state = use_case.get_workflow_state(&workflow_id).await?;

    if state.status() == WorkflowStatus::AwaitingHumanApproval && cli.wait {
        state = wait_for_decision(&use_case, &config, state).await?;
    }

    let output = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format(&state),
        OutputFormat::Summary => ConsoleFormatter::format_summary(&state),
        OutputFormat::Json => ConsoleFormatter::format_json(&state),
    };
    println!("{}", output);

    if state.status() == WorkflowStatus::AwaitingHumanApproval && !cli.quiet {
        eprintln!(
            "Workflow {} is awaiting human approval. Re-run with --wait to serve the approval link.",
            state.workflow_id()
        );
    }

    Ok(())
}

fn audit_logger(config: &FileConfig) -> Arc<dyn AuditLogger> {
    let Some(path) = &config.logging.audit_log else {
        return Arc::new(NoAuditLogger);
    };
    match JsonlAuditLogger::new(path) {
        Some(logger) => Arc::new(logger),
        None => {
            warn!(path = %path.display(), "Audit log unavailable; continuing without it");
            Arc::new(NoAuditLogger)
        }
    }
}

/// Serve the approval channel and block until the workflow settles
async fn wait_for_decision(
    use_case: &RunReviewWorkflowUseCase,
    config: &FileConfig,
    state: WorkflowState,
) -> Result<WorkflowState> {
    let gateway = Arc::clone(use_case.gateway());
    let listener = TcpListener::bind(&config.approval_server.bind)
        .await
        .with_context(|| format!("failed to bind approval server to {}", config.approval_server.bind))?;

    let shutdown = CancellationToken::new();
    let server = tokio::spawn(serve_approvals(
        listener,
        Arc::clone(&gateway),
        shutdown.clone(),
    ));
    let sweeper = Arc::clone(&gateway)
        .spawn_expiry_sweeper(gateway.policy().sweep_interval, shutdown.clone());

    eprintln!("Waiting for a human decision on {} (Ctrl-C to stop)...", state.workflow_id());
    let settled = tokio::select! {
        settled = use_case.store().wait_for_terminal(state.workflow_id()) => settled,
        _ = tokio::signal::ctrl_c() => {
            warn!(workflow_id = %state.workflow_id(), "Interrupted while awaiting approval");
            None
        }
    };

    shutdown.cancel();
    if let Ok(Err(e)) = server.await {
        warn!("Approval server stopped with an error: {}", e);
    }
    let _ = sweeper.await;

    match settled {
        Some(settled) => Ok(settled),
        None => Ok(use_case.get_workflow_state(state.workflow_id()).await?),
    }
}
