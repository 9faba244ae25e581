use serde::Serialize;

/// Outcome of one lookup, as printed with `--json`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Resolution {
    pub directory: String,
    pub savepoint: Option<String>,
}

impl Resolution {
    /// Plain-text form: the savepoint path, or an empty line when none was found.
    pub fn to_line(&self) -> &str {
        self.savepoint.as_deref().unwrap_or("")
    }
}

/// Initialize tracing for CLI binaries.
///
/// Logs go to stderr so stdout carries only the resolved savepoint.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
