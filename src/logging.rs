use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so they never interleave with workflow commands on stdout.
pub fn init(debug: bool) {
    let fallback = if debug { "changed_files=debug" } else { "changed_files=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if installed.is_err() {
        tracing::debug!("a global subscriber is already installed, keeping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_keeps_the_first_subscriber() {
        init(false);
        init(true);
        assert!(tracing::dispatcher::has_been_set());
    }
}
