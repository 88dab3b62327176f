use std::hint::black_box;

use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use timeline_pager::{ChatMessage, Pagination, PaginationTracker};

fn page(first: u64, count: u64) -> Vec<ChatMessage> {
    (first..first + count)
        .map(|id| {
            let created_at = Utc
                .timestamp_opt(id as i64, 0)
                .single()
                .unwrap_or_default();
            ChatMessage::new(id, created_at, "")
        })
        .collect()
}

fn bench_complete(c: &mut Criterion) {
    let mut group = c.benchmark_group("complete");
    for size in [25_u64, 100, 1000] {
        let messages = page(1, size);
        // Anchor at the end of the page so the second-half search scans it all
        let anchor = size;

        group.bench_function(format!("older/{size}"), |b| {
            b.iter(|| {
                let mut tracker = PaginationTracker::new();
                let pagination = Pagination::older_than(size + 1, size as usize);
                tracker.begin(pagination.clone());
                tracker.complete(pagination, Ok(black_box(messages.clone())));
                black_box(tracker.state().has_loaded_all_older())
            })
        });

        group.bench_function(format!("jump/{size}"), |b| {
            b.iter(|| {
                let mut tracker = PaginationTracker::new();
                let pagination = Pagination::jump_to(anchor, size as usize);
                tracker.begin(pagination.clone());
                tracker.complete(pagination, Ok(black_box(messages.clone())));
                black_box(tracker.state().is_jumping_to_anchor())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_complete);
criterion_main!(benches);
