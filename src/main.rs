use job_dispatch::{
    drain, launch_and_wait, logging, submit, Doubler, PoolConfig, WorkerPool,
};
use std::time::Instant;
use tokio::runtime::Builder;
use tracing::{error, info};


fn main() {
    logging::init(logging::LogFormat::from_env());

    let rt = match Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(err) => {
            error!(error = %err, "failed to build runtime");
            std::process::exit(1);
        }
    };

    if let Err(err) = rt.block_on(run()) {
        error!(error = ?err, "fatal error");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = PoolConfig::demo().with_env_overrides()?;
    info!(?config, "starting dispatcher");

    let now = Instant::now();
    let pool = WorkerPool::with_config(&config, Doubler::new(config.work_delay))?;

    let jobs: Vec<i64> = (1..=5).collect();
    let expected = submit(pool.jobs(), jobs).await?;
    let outcomes = drain(pool.results(), expected).await?;

    let mut values = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        values.push(outcome?.value);
    }
    values.sort_unstable();

    let metrics = pool.metrics();
    pool.join().await?;
    info!(?values, completed = metrics.completed_jobs, elapsed = ?now.elapsed(), "all results drained");

    launch_and_wait(3, |id| async move {
        info!(task = id, "task finished");
    })
    .await;

    Ok(())
}
