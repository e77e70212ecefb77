//! Log output and the quiz metrics served on `/metrics`.

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Used when `LOG_LEVEL` is unset or holds directives that do not parse.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug,sqlx=warn";

lazy_static! {
    pub static ref QUIZ_QUESTIONS_SERVED: IntCounterVec = register_int_counter_vec!(
        "quiz_questions_served_total",
        "Number of questions handed out by the quiz endpoint",
        &["category"]
    )
    .expect("metric can be registered");
}

fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// `INCLUDE_SPAN_EVENTS`: `true` logs span enter and exit, `close` logs span
/// timings on close, `full` logs everything.
fn span_events(value: Option<&str>) -> FmtSpan {
    match value.map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("true") => FmtSpan::ENTER | FmtSpan::EXIT,
        Some(v) if v.eq_ignore_ascii_case("close") => FmtSpan::CLOSE,
        Some(v) if v.eq_ignore_ascii_case("full") => FmtSpan::FULL,
        _ => FmtSpan::NONE,
    }
}

pub fn init_tracing() {
    let directives = std::env::var("LOG_LEVEL").ok();
    let fmt_layer = fmt::layer().with_span_events(span_events(
        std::env::var("INCLUDE_SPAN_EVENTS").ok().as_deref(),
    ));

    tracing_subscriber::registry()
        .with(log_filter(directives.as_deref()))
        .with(fmt_layer)
        .init();

    if let Some(directives) = directives {
        if EnvFilter::try_new(&directives).is_err() {
            tracing::warn!(%directives, "Invalid LOG_LEVEL, using {DEFAULT_LOG_FILTER}");
        }
    }
}
