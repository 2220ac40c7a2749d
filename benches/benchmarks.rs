//! Performance benchmarks for Ideaboard.
//!
//! This module contains benchmarks for:
//! - JSON extraction from prose-wrapped model output
//! - Fallback task synthesis
//! - Board mutation (clone + apply)
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ideaboard::ai::{fallback_features, fallback_tasks};
use ideaboard::{apply_mutation, extract_json, JsonShape, Locale, Mutation, Project, TaskStatus};

// ============================================================================
// Mock Data Fixtures
// ============================================================================

mod fixtures {
    /// A model reply burying a JSON array in chatty prose, scaled to
    /// `num_items` array elements.
    pub fn prose_wrapped_array(num_items: usize) -> String {
        let mut items = Vec::with_capacity(num_items);
        for i in 1..=num_items {
            items.push(format!(
                r#"{{"id": {i}, "title": "Feature {i}", "description": "Handles part {i} of the workflow with validation and error states"}}"#
            ));
        }
        format!(
            "Sure! Here is the feature list you asked for. I analyzed the idea and \
             broke it into independently shippable pieces:\n\n```json\n[{}]\n```\n\n\
             Let me know if you'd like me to adjust the granularity.",
            items.join(", ")
        )
    }
}

// ============================================================================
// Extraction Benchmarks
// ============================================================================

fn bench_extract_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_json");

    for num_items in [3, 20, 100] {
        let raw = fixtures::prose_wrapped_array(num_items);
        group.throughput(Throughput::Bytes(raw.len() as u64));
        group.bench_with_input(BenchmarkId::new("array", num_items), &raw, |b, raw| {
            b.iter(|| extract_json(black_box(raw), JsonShape::Array));
        });
    }

    group.finish();
}

// ============================================================================
// Fallback Synthesis Benchmarks
// ============================================================================

fn bench_fallback_tasks(c: &mut Criterion) {
    let features = fallback_features(Locale::En);
    c.bench_function("fallback_tasks", |b| {
        b.iter(|| fallback_tasks(black_box(Locale::En), black_box(&features)));
    });
}

// ============================================================================
// Board Mutation Benchmarks
// ============================================================================

fn bench_apply_mutation(c: &mut Criterion) {
    let project = Project::demo();
    let mutation =
        Mutation::MoveStatus { task_id: "task-1-1".to_string(), status: TaskStatus::Doing };
    c.bench_function("apply_mutation/move_status", |b| {
        b.iter(|| apply_mutation(black_box(&project), black_box(&mutation)));
    });
}

criterion_group!(benches, bench_extract_json, bench_fallback_tasks, bench_apply_mutation);
criterion_main!(benches);
