use crate::pipeline::Agent;
use std::future::Future;
use std::time::Duration;

/// Post a full thread every `every`, starting immediately, until `shutdown`
/// resolves. Returns how many cycles ran to completion.
///
/// Shutdown interrupts both an in-flight cycle and the wait between cycles.
pub async fn run_schedule<F>(agent: &Agent, every: Duration, shutdown: F) -> usize
where
    F: Future<Output = ()>,
{
    tracing::info!(every_secs = every.as_secs(), "starting scheduled posting");
    tokio::pin!(shutdown);
    let mut completed = 0;

    loop {
        tokio::select! {
            report = agent.post_with_comments(None) => {
                completed += 1;
                match &report.failure {
                    None => tracing::info!(
                        cycle = completed,
                        tweet_id = ?report.primary_id,
                        replies = report.follow_up_ids.len(),
                        "scheduled cycle posted"
                    ),
                    Some(failure) => tracing::warn!(
                        cycle = completed,
                        error = %failure.message,
                        "scheduled cycle failed"
                    ),
                }
            }
            _ = &mut shutdown => break,
        }

        tokio::select! {
            _ = tokio::time::sleep(every) => {}
            _ = &mut shutdown => break,
        }
    }

    tracing::info!(completed, "scheduled posting stopped");
    completed
}

/// Hours to a [`Duration`]; zero is bumped to one hour.
pub fn interval_from_hours(hours: u64) -> Duration {
    Duration::from_secs(hours.max(1).saturating_mul(3600))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_convert_with_a_floor() {
        assert_eq!(interval_from_hours(24), Duration::from_secs(86_400));
        assert_eq!(interval_from_hours(0), Duration::from_secs(3_600));
    }
}
