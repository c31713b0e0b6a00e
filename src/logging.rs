use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber. `RUST_LOG` overrides `default_directive`
/// (e.g. "chordmux=debug"). Returns false when a subscriber was already set.
pub fn init(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Subscriber for tests; output is captured per test by the harness
pub fn init_for_tests() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chordmux=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_existing_subscriber() {
        init_for_tests();
        assert!(!init("chordmux=info"));
    }
}
