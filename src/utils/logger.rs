use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Compact,
    Json,
}

/// Logs go to stderr in every format; stdout carries records only.
fn init(format: LogFormat, default_directives: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let layer = match format {
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    };

    tracing_subscriber::registry().with(filter).with(layer).init();
}

pub fn init_cli_logger(verbose: bool) {
    let directives = if verbose { "wrapfield=debug,info" } else { "wrapfield=info" };
    init(LogFormat::Compact, directives);
}

/// Structured output for log collectors.
pub fn init_json_logger() {
    init(LogFormat::Json, "wrapfield=info");
}
