use anyhow::{Context, Result};
use chrono::Utc;
use futures::{Stream, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::commands::{FetchCommand, LoggingConfig, PlanCommand},
    config::Settings,
    events::TracingSink,
    query::{ReplayExecutor, Window, WindowPlanner},
    retrieval::{RecordDecoder, RetrievalOrchestrator, RetrievalParams, RetrievalSummary},
};

/// Install the global tracing subscriber, writing to stderr
pub fn init_logging(logging: &LoggingConfig) {
    let level = logging.get_effective_level();
    let filter = logging.filter_directives();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.parse().unwrap_or(Level::INFO).into())
                .parse_lossy(&filter),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}

/// Windows the plan command would print
pub fn plan_windows(cmd: &PlanCommand, settings: &Settings) -> Result<Vec<Window>> {
    let mut params = RetrievalParams::from_settings(&settings.retrieval);
    cmd.range.apply(&mut params);
    let plan = params.resolve(Utc::now());
    let planner = WindowPlanner::new(plan.options.interval)?;
    Ok(planner.plan(plan.range).collect())
}

pub async fn handle_plan(cmd: PlanCommand, settings: Settings) -> Result<()> {
    let windows = plan_windows(&cmd, &settings)?;
    let mut out = BufWriter::new(tokio::io::stdout());
    for window in &windows {
        let line = serde_json::to_string(window)?;
        out.write_all(line.as_bytes()).await?;
        out.write_all(b"\n").await?;
    }
    out.flush().await?;
    info!("Planned {} windows", windows.len());
    Ok(())
}

/// What a fetch run produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchSummary {
    pub retrieval: RetrievalSummary,
    pub records_written: u64,
    pub payloads_skipped: u64,
    pub interrupted: bool,
}

pub async fn handle_fetch(cmd: FetchCommand, settings: Settings) -> Result<FetchSummary> {
    let mut params = RetrievalParams::from_settings(&settings.retrieval);
    cmd.apply(&mut params);
    let plan = params.resolve(Utc::now());

    let executor = ReplayExecutor::from_ndjson_file(&cmd.source)
        .await
        .with_context(|| format!("Failed to load replay source {}", cmd.source.display()))?;
    info!(
        "Serving {} records from {}",
        executor.len(),
        cmd.source.display()
    );

    let sink = Arc::new(TracingSink);
    let orchestrator = RetrievalOrchestrator::new(Arc::new(executor), plan.options, sink.clone())
        .context("Invalid retrieval options")?;
    let decoder = RecordDecoder::new(sink);

    let out: Box<dyn AsyncWrite + Unpin + Send> = match &cmd.output {
        Some(path) => Box::new(
            tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Failed to create output file {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdout()),
    };
    let mut out = BufWriter::new(out);

    let records = orchestrator.run(plan.range);
    let mut written = 0u64;
    let interrupted = if cmd.decode {
        let payloads = decoder.decode_stream(records);
        write_until_interrupted(payloads, &mut out, &mut written).await?
    } else {
        write_until_interrupted(records, &mut out, &mut written).await?
    };
    out.flush().await.context("Failed to flush output")?;

    let summary = FetchSummary {
        retrieval: orchestrator.stats().summary(),
        records_written: written,
        payloads_skipped: decoder.skipped(),
        interrupted,
    };
    if summary.retrieval.windows_exhausted > 0 {
        warn!(
            "{} of {} windows gave up before their declared total was reached",
            summary.retrieval.windows_exhausted, summary.retrieval.windows_planned
        );
    }
    info!(
        "Wrote {} records ({} windows, {} retrieved, {} payloads skipped)",
        summary.records_written,
        summary.retrieval.windows_completed,
        summary.retrieval.total_records,
        summary.payloads_skipped
    );
    Ok(summary)
}

/// Write items as NDJSON; returns true if interrupted by Ctrl-C
async fn write_until_interrupted<S, T, W>(items: S, out: &mut W, written: &mut u64) -> Result<bool>
where
    S: Stream<Item = T>,
    T: Serialize,
    W: AsyncWrite + Unpin,
{
    let write_all = async {
        futures::pin_mut!(items);
        while let Some(item) = items.next().await {
            let line = serde_json::to_string(&item)?;
            out.write_all(line.as_bytes()).await?;
            out.write_all(b"\n").await?;
            *written += 1;
        }
        Ok::<_, anyhow::Error>(())
    };

    tokio::select! {
        res = write_all => {
            res?;
            Ok(false)
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; remaining windows were not retrieved");
            Ok(true)
        }
    }
}
