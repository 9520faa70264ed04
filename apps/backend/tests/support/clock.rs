use std::time::Duration;

/// Let paused time run forward by `d`, then give spawned tasks a chance to
/// finish whatever became ready.
pub async fn advance(d: Duration) {
    tokio::time::sleep(d).await;
    settle().await;
}

pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}
