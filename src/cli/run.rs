use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use agent_core::RunReport;
use browser_host::PlaybackHost;
use tabpilot_core_types::{cues, Message};

use super::context::CliContext;
use super::output::OutputFormat;
use crate::assembly::Assembly;
use crate::hosts::{ConsolePlayback, FilePageHost, PageSource};

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Instruction for the agent
    #[arg(short, long)]
    pub prompt: String,

    /// Markdown file standing in for the active page, re-read on every capture
    #[arg(long, value_name = "FILE")]
    pub page: Option<PathBuf>,

    /// URL reported for the active tab
    #[arg(long)]
    pub url: Option<String>,

    /// Use the offline mock reasoning client
    #[arg(long)]
    pub mock: bool,

    /// Skip step pacing and tab retry backoff
    #[arg(long)]
    pub fast: bool,
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext) -> Result<()> {
    let mut config = ctx.config().clone();
    if args.mock {
        config.reasoning.mock = true;
    }
    if args.fast {
        config.agent.step_pacing_ms = 0;
        config.agent.tab_retry_backoff_ms = 0;
    }
    config.validate()?;

    let source = match &args.page {
        Some(path) => {
            if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                anyhow::bail!("page file {} does not exist", path.display());
            }
            PageSource::File(path.clone())
        }
        None => PageSource::Inline(String::new()),
    };
    let host = FilePageHost::new(source, args.url.clone());

    let quiet = ctx.output() == OutputFormat::Json;
    let mut assembly = Assembly::build(&config, host, |handle| {
        ConsolePlayback::new(handle, quiet) as Arc<dyn PlaybackHost>
    })
    .context("building agent")?;
    let router = assembly.start();
    let printer = (!quiet).then(|| spawn_notify_printer(&assembly));
    let settled = assembly.handle.once(is_closing_cue);

    info!(prompt = %args.prompt, "starting dry run");
    let report = assembly.runner.run(&args.prompt).await;

    // The closing notice and its cue are routed after the run returns.
    if let Err(err) = settled.wait_for(Some(SETTLE_LIMIT)).await {
        debug!(%err, "closing cue not routed before shutdown");
    }
    if let Some(printer) = printer {
        if tokio::time::timeout(SETTLE_LIMIT, printer).await.is_err() {
            debug!("notification printer did not finish before shutdown");
        }
    }
    if let Some(router) = router {
        router.abort();
    }

    print_report(&report, ctx.output())
}

const SETTLE_LIMIT: Duration = Duration::from_secs(2);

fn is_closing_cue(message: &Message) -> bool {
    matches!(message, Message::Audio { audio } if audio == cues::FINISH || audio == cues::ERROR)
}

fn is_closing_notice(message: &Message) -> bool {
    matches!(
        message,
        Message::Notify { audio: Some(audio), .. } if audio == cues::FINISH || audio == cues::ERROR
    )
}

/// Prints notifications to stderr up to the run's closing notice.
fn spawn_notify_printer(assembly: &Assembly) -> tokio::task::JoinHandle<()> {
    let mut bus = assembly.handle.subscribe();
    tokio::spawn(async move {
        loop {
            match bus.recv().await {
                Ok(message) => {
                    if let Message::Notify { message: text, .. } = &message {
                        eprintln!("> {text}");
                    }
                    if is_closing_notice(&message) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "notification printer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn print_report(report: &RunReport, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Human => {
            println!("Outcome:         {:?}", report.outcome);
            println!("Steps:           {}", report.steps);
            if let Some(message) = &report.final_message {
                println!("Final message:   {message}");
            }
            println!("Reasoning calls: {}", report.reasoning_calls);
            println!("Executions:      {}", report.executions);
            println!("Total tokens:    {}", report.total_tokens);
        }
    }
    Ok(())
}
