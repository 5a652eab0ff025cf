//! Structured logging setup.

/// Install the env-filtered tracing subscriber the server logs through.
/// No-op when the embedding process already installed one, so tests and
/// library consumers can bring their own.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
