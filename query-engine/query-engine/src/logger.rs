use crate::LogFormat;
use tracing::{dispatcher::SetGlobalDefaultError, subscriber};
use tracing_subscriber::{EnvFilter, Layer, filter::Directive, layer::SubscriberExt};

type LoggerResult<T> = Result<T, SetGlobalDefaultError>;

/// Crates whose level follows `QE_LOG_LEVEL`.
const ENGINE_CRATES: &[&str] = &["query_engine", "query_core", "schema_core", "graph_schema", "arango_client"];

/// An installer for a global logger.
#[derive(Debug, Clone)]
pub struct Logger {
    service_name: &'static str,
    log_format: LogFormat,
    log_queries: bool,
}

impl Logger {
    /// Initialize a new global logger installer.
    pub fn new(service_name: &'static str) -> Self {
        Self {
            service_name,
            log_format: LogFormat::Json,
            log_queries: false,
        }
    }

    /// Sets the STDERR log output format. Default: Json.
    pub fn log_format(&mut self, log_format: LogFormat) {
        self.log_format = log_format;
    }

    /// Enable query logging. Default: false.
    pub fn log_queries(&mut self, log_queries: bool) {
        self.log_queries = log_queries;
    }

    /// Install logger as a global. Can be called only once per application
    /// instance.
    pub fn install(&self) -> LoggerResult<()> {
        let filter = create_env_filter(self.log_queries);

        let fmt_layer = match self.log_format {
            LogFormat::Text => tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter)
                .boxed(),
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_filter(filter)
                .boxed(),
        };

        let subscriber = tracing_subscriber::registry().with(fmt_layer);
        subscriber::set_global_default(subscriber)?;

        tracing::debug!(service = self.service_name, "Logger installed.");

        Ok(())
    }
}

fn create_env_filter(log_queries: bool) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();

    for directive in ["hyper=error", "reqwest=error", "h2=error"] {
        filter = add_directive(filter, directive);
    }

    if let Ok(level) = std::env::var("QE_LOG_LEVEL") {
        for krate in ENGINE_CRATES {
            filter = add_directive(filter, &format!("{krate}={level}"));
        }
    }

    if log_queries {
        filter = add_directive(filter, "query_core::query=debug");
    }

    filter
}

fn add_directive(filter: EnvFilter, directive: &str) -> EnvFilter {
    match directive.parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}
