pub mod builders;
pub mod fake_task;
pub mod fixture;

use std::sync::Once;

use assetflow::logging::{LOG_ENV, build_filter};
use tracing_subscriber::fmt;

static INIT: Once = Once::new();

/// Install a test-captured subscriber using the same filter rules as the
/// binary, so `ASSETFLOW_LOG=assetflow::watch=trace cargo test` works.
///
/// A malformed `ASSETFLOW_LOG` falls back to the default filter.
pub fn init_tracing() {
    INIT.call_once(|| {
        let env = std::env::var(LOG_ENV).ok();
        let filter = build_filter(None, env.as_deref())
            .or_else(|_| build_filter(None, None))
            .expect("default log filter");

        let _ = fmt()
            .compact()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}
