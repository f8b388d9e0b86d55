//! Metrics and tracing helpers.
//!
//! With the `metrics` feature, statement and transaction outcomes are counted
//! through OpenTelemetry instruments exported to a Prometheus registry; the
//! text exposition is available from [`RelqMetrics::gather_text`]. With the
//! `tracing` feature, [`tracing_helpers`] provides the spans wrapped around
//! statements and transaction boundaries.

#[cfg(feature = "metrics")]
pub use self::prometheus_metrics::{RelqMetrics, METRICS};

#[cfg(feature = "metrics")]
mod prometheus_metrics {
    use once_cell::sync::Lazy;
    use opentelemetry::metrics::{Counter, Histogram, MeterProvider as _};
    use opentelemetry_sdk::metrics::SdkMeterProvider;
    use prometheus::{Encoder, Registry, TextEncoder};
    use std::time::Duration;

    pub static METRICS: Lazy<RelqMetrics> = Lazy::new(RelqMetrics::init);

    pub struct RelqMetrics {
        registry: Registry,
        _provider: SdkMeterProvider,
        pub queries_total: Counter<u64>,
        pub query_duration: Histogram<f64>,
        pub query_errors: Counter<u64>,
        pub transactions_committed: Counter<u64>,
        pub transactions_rolled_back: Counter<u64>,
    }

    impl RelqMetrics {
        pub fn init() -> Self {
            let registry = Registry::new();
            let mut builder = SdkMeterProvider::builder();
            match opentelemetry_prometheus::exporter()
                .with_registry(registry.clone())
                .build()
            {
                Ok(exporter) => builder = builder.with_reader(exporter),
                Err(err) => log::warn!("prometheus exporter unavailable, metrics are not exported: {err:?}"),
            }
            let provider = builder.build();
            let meter = provider.meter("relq");

            let queries_total = meter
                .u64_counter("relq_queries_total")
                .with_description("Total statements executed")
                .build();

            let query_duration = meter
                .f64_histogram("relq_query_duration_seconds")
                .with_description("Duration of statements")
                .build();

            let query_errors = meter
                .u64_counter("relq_query_errors_total")
                .with_description("Statements that returned an error")
                .build();

            let transactions_committed = meter
                .u64_counter("relq_transactions_committed_total")
                .with_description("Transactions committed")
                .build();

            let transactions_rolled_back = meter
                .u64_counter("relq_transactions_rolled_back_total")
                .with_description("Transactions rolled back")
                .build();

            Self {
                registry,
                _provider: provider,
                queries_total,
                query_duration,
                query_errors,
                transactions_committed,
                transactions_rolled_back,
            }
        }

        pub fn record_query(&self, elapsed: Duration) {
            self.queries_total.add(1, &[]);
            self.query_duration.record(elapsed.as_secs_f64(), &[]);
        }

        pub fn record_query_error(&self) {
            self.query_errors.add(1, &[]);
        }

        pub fn record_commit(&self) {
            self.transactions_committed.add(1, &[]);
        }

        pub fn record_rollback(&self) {
            self.transactions_rolled_back.add(1, &[]);
        }

        /// Prometheus text exposition of everything recorded so far
        pub fn gather_text(&self) -> String {
            let mut buffer = Vec::new();
            if let Err(err) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
                log::warn!("failed to encode metrics: {err}");
            }
            String::from_utf8_lossy(&buffer).into_owned()
        }
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::{debug_span, info_span, Span};

    pub fn execute_query_span(sql: &str) -> Span {
        debug_span!("relq.query", sql = %sql)
    }

    pub fn begin_transaction_span(isolation: &str) -> Span {
        info_span!("relq.transaction.begin", isolation = %isolation)
    }

    pub fn commit_transaction_span() -> Span {
        info_span!("relq.transaction.commit")
    }

    pub fn rollback_transaction_span() -> Span {
        info_span!("relq.transaction.rollback")
    }

    pub fn acquire_connection_span() -> Span {
        info_span!("relq.connect")
    }
}
