//! Structured logging
//!
//! Thin helpers over `tracing` so reflection and registry events share the
//! same field names (`event`, `model`, `field`, ...). Call [`init_tracing`]
//! once from a binary; the library itself only emits events.

use {
    crate::kind::SchemaKind,
    std::time::Duration,
    tracing::{debug, info, span, trace, warn, Level, Span},
    tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter},
};

/// Initialize the tracing subscriber with appropriate configuration
pub fn init_tracing() {
    // Try to get log level from environment, default to info
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("model_schema=info"));

    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true);

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_level(true)
            .with_ansi(true);

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    }

    info!("Tracing initialized");
}

/// Span covering one top-level reflection pass
pub fn reflect_span(model: &str) -> Span {
    span!(Level::DEBUG, "reflect", model = %model)
}

pub fn log_cache_hit(model: &str) {
    trace!(model = %model, event = "cache_hit", "Metadata already registered");
}

pub fn log_reflected(model: &str, fields: usize, inner_fields: usize, duration: Duration) {
    debug!(
        model = %model,
        fields = fields,
        inner_fields = inner_fields,
        duration_us = duration.as_micros() as u64,
        event = "reflected",
        "Reflected model"
    );
}

pub fn log_field_skipped(model: &str, field: &str, reason: &str) {
    trace!(
        model = %model,
        field = %field,
        reason = %reason,
        event = "field_skipped",
        "Skipped member"
    );
}

pub fn log_cycle_detected(model: &str, field: &str, target: &str) {
    debug!(
        model = %model,
        field = %field,
        target = %target,
        event = "cycle_detected",
        "Self-referential member recorded as reference"
    );
}

pub fn log_depth_limit(model: &str, field: &str, depth: usize) {
    warn!(
        model = %model,
        field = %field,
        depth = depth,
        event = "depth_limit",
        "Nesting limit reached, members not expanded"
    );
}

pub fn log_registry_upsert(model: &str, replaced: bool, total: usize) {
    debug!(
        model = %model,
        replaced = replaced,
        total = total,
        event = "registry_upsert",
        "Saved metadata"
    );
}

pub fn log_default_coercion_failed(field: &str, raw: &str, kind: SchemaKind) {
    warn!(
        field = %field,
        raw = %raw,
        kind = %kind,
        event = "default_coercion_failed",
        "Default value does not match field kind, ignoring it"
    );
}

pub fn log_duplicate_property(model: &str, field: &str, property: &str) {
    warn!(
        model = %model,
        field = %field,
        property = %property,
        event = "duplicate_property",
        "Property name already taken by an earlier member, ignoring it"
    );
}

pub fn log_unknown_model(model: &str) {
    warn!(model = %model, event = "unknown_model", "Render requested for unregistered model");
}
