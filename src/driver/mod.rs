// src/driver/mod.rs

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

use crate::llm::LlmClient;
use crate::validate::{ResponseValidator, ResultRecord};

/// How many calls to make and how long to wait between them.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub iterations: usize,
    pub delay: Duration,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            iterations: 100,
            delay: Duration::from_secs(2),
        }
    }
}

/// Call `client` `plan.iterations` times in sequence, validating each reply.
/// A failed call aborts the whole run; nothing collected so far is returned.
pub async fn run_benchmark(
    client: &dyn LlmClient,
    validator: &ResponseValidator,
    plan: &RunPlan,
) -> Result<Vec<ResultRecord>> {
    let mut records = Vec::with_capacity(plan.iterations);

    for i in 0..plan.iterations {
        let completion = client
            .call()
            .await
            .with_context(|| format!("{} call {} of {}", client.name(), i + 1, plan.iterations))?;

        let record = ResultRecord::new(validator.validate(&completion.text), completion.elapsed);
        info!(
            iteration = i + 1,
            status = %record.validation.status,
            time = record.time,
            data = %record.validation.data.render(),
            error = %record.validation.render_errors(),
            "call finished"
        );
        records.push(record);

        if i + 1 < plan.iterations && !plan.delay.is_zero() {
            sleep(plan.delay).await;
        }
    }

    Ok(records)
}
