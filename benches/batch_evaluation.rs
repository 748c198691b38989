//! Batch Evaluation Benchmark (Criterion)
//!
//! Measures evaluation of receipt batches of increasing size, and the cost of
//! decoding an event from JSON before evaluation.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mail_disposition_engine::api::ReceiptEvent;
use mail_disposition_engine::telemetry::MemoryAuditSink;
use mail_disposition_engine::{Config, DispositionEngine, MessageRecord};
use std::sync::Arc;

/// Sample configuration with a mid-sized blocklist.
fn sample_config() -> Config {
    let block: Vec<String> = (0..200)
        .map(|i| {
            let mode = if i % 2 == 0 { "BLOCK" } else { "MONITOR" };
            format!("domain-{}.example:{}", i, mode)
        })
        .collect();

    Config::from_vars([
        ("BLOCK", block.join(",")),
        ("DMARC_BLOCK_MODE", "BLOCK".to_string()),
        ("SPAM_BLOCK_MODE", "MONITOR".to_string()),
        ("VIRUS_BLOCK_MODE", "BLOCK".to_string()),
    ])
    .expect("valid benchmark configuration")
}

/// Sample records with a mix of senders and verdicts.
fn sample_records(count: usize) -> Vec<MessageRecord> {
    (0..count)
        .map(|i| {
            MessageRecord::builder(format!("message-{}", i))
                .from(format!("Sender {} <user{}@domain-{}.example>", i, i, i % 400))
                .spam(if i % 7 == 0 { "FAIL" } else { "PASS" })
                .virus("PASS")
                .dmarc(if i % 11 == 0 { "FAIL" } else { "PASS" })
                .spf("PASS")
                .dkim("PASS")
                .build()
        })
        .collect()
}

fn benchmark_batch_evaluation(c: &mut Criterion) {
    let engine = DispositionEngine::builder()
        .with_config(sample_config())
        .with_audit_sink(Arc::new(NullSink))
        .build()
        .expect("engine builds");

    let mut group = c.benchmark_group("batch_evaluation");

    for record_count in [1, 10, 100, 1000].iter() {
        let records = sample_records(*record_count);

        group.bench_with_input(
            BenchmarkId::new("records", record_count),
            &records,
            |b, records| {
                b.iter(|| std::hint::black_box(engine.evaluate(records)));
            },
        );
    }

    group.finish();
}

fn benchmark_event_handling(c: &mut Criterion) {
    let sink = Arc::new(MemoryAuditSink::new());
    let engine = DispositionEngine::builder()
        .with_config(sample_config())
        .with_audit_sink(sink.clone())
        .build()
        .expect("engine builds");

    let event = ReceiptEvent::from_records(sample_records(10));
    let json = serde_json::to_string(&event).expect("event serializes");

    c.bench_function("handle_json/10", |b| {
        b.iter(|| {
            let response = engine.handle_json(&json).expect("valid event");
            sink.clear();
            std::hint::black_box(response)
        });
    });
}

/// Discards audit lines so the benchmark measures evaluation only.
struct NullSink;

impl mail_disposition_engine::telemetry::AuditSink for NullSink {
    fn record(&self, _outcome: &mail_disposition_engine::CheckOutcome) {}
}

criterion_group!(benches, benchmark_batch_evaluation, benchmark_event_handling);

criterion_main!(benches);
