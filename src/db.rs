use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::warn;

const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_DELAY: Duration = Duration::from_secs(1);

/// Build the connection pool, waiting out a database that is still booting.
pub async fn connect_with_retry(database_url: &str) -> anyhow::Result<PgPool> {
    wait_for(CONNECT_ATTEMPTS, CONNECT_DELAY, || async move {
        PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
    })
    .await
    .context("connect to database")
}

/// Run `probe` until it succeeds, sleeping `delay` between attempts.
/// Gives up after `attempts` tries, returning the last error.
async fn wait_for<T, E, F, Fut>(attempts: u32, delay: Duration, mut probe: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut tried = 0u32;
    loop {
        tried += 1;
        match probe().await {
            Ok(v) => return Ok(v),
            Err(e) if tried < attempts => {
                warn!(attempt = tried, error = %e, "database unavailable, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn wait_for_returns_on_first_success() {
        let calls = Cell::new(0u32);
        let result = wait_for(6, Duration::from_millis(1), || {
            calls.set(calls.get() + 1);
            async { Ok::<_, String>("ready") }
        })
        .await;
        assert_eq!(result, Ok("ready"));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn wait_for_retries_until_probe_succeeds() {
        let calls = Cell::new(0u32);
        let result = wait_for(10, Duration::from_millis(1), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n <= 5 {
                    Err("connection refused".to_string())
                } else {
                    Ok("ready")
                }
            }
        })
        .await;
        assert_eq!(result, Ok("ready"));
        assert_eq!(calls.get(), 6);
    }

    #[tokio::test]
    async fn wait_for_gives_up_after_final_attempt() {
        let calls = Cell::new(0u32);
        let result: Result<(), String> = wait_for(3, Duration::from_millis(1), || {
            calls.set(calls.get() + 1);
            async { Err("connection refused".to_string()) }
        })
        .await;
        assert_eq!(result, Err("connection refused".to_string()));
        assert_eq!(calls.get(), 3);
    }
}
