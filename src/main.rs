use anyhow::{Context, Result};
use kwbench::{
    config::BenchConfig,
    driver::run_benchmark,
    llm::build_client,
    output::{print_table, write_records, Summary},
};
use std::env;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let mut config = match env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "loading config");
            BenchConfig::load(&path)?
        }
        None => BenchConfig::default(),
    };
    config.apply_env()?;

    let settings = config.client_settings()?;
    let plan = config.run_plan()?;
    let validator = config.validator();
    let out_path = config.output_path();
    info!(
        provider = %settings.provider,
        model = %settings.model,
        iterations = plan.iterations,
        delay = ?plan.delay,
        required = ?validator.required_keys(),
        "benchmark configured"
    );

    // ─── 3) run calls ────────────────────────────────────────────────
    let client = build_client(&settings)?;
    let records = run_benchmark(client.as_ref(), &validator, &plan).await?;

    // ─── 4) persist + report ─────────────────────────────────────────
    write_records(&records, &out_path)
        .with_context(|| format!("saving results to {}", out_path.display()))?;
    info!(path = %out_path.display(), rows = records.len(), "results written");

    print_table(&records);
    let summary = Summary::from_records(&records);
    info!(
        ok = summary.ok,
        ng = summary.ng,
        mean_time = summary.mean_time,
        "all done"
    );
    Ok(())
}
