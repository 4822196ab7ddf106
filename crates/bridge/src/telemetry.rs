use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber for test harnesses and simulations. `RUST_LOG` directives
/// are layered over `info` for the bridge crates. Calling it again is a no-op.
pub fn init_tracing() {
    let mut filter = EnvFilter::new("exit_bridge=info,storage=info");
    if let Ok(env_filter) = std::env::var("RUST_LOG") {
        for directive in env_filter.split(',') {
            if let Ok(parsed) = directive.parse() {
                filter = filter.add_directive(parsed);
            }
        }
    }
    // a subscriber may already be installed by another test in the same binary
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}
