use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use pqueue::{Item, PriorityQueue};
use sync::LockedQueue;

fn push_pop(c: &mut Criterion) {
    let queue = LockedQueue::<u64>::new(50_000);

    c.bench_function("sync_locks push_pop", |b| {
        b.iter(|| {
            queue.push(Item::new(0, black_box(100))).unwrap();
            let popped = queue.pop().unwrap();
            assert_eq!(popped.priority, 100);
        })
    });
}

fn push_top_priority_on_large_queue(c: &mut Criterion) {
    let queue = LockedQueue::<u64>::new(500_000);
    // -- Prepare large queue
    let mut priority = 50_000;
    for i in 0..50_000 {
        queue.push(Item::new(i, black_box(priority))).unwrap();
        priority -= 1;
    }

    c.bench_function("sync_locks push_top_priority_on_large_queue", |b| {
        b.iter(|| {
            queue.push(Item::new(0, black_box(0))).unwrap();
            let popped = queue.pop().unwrap();
            assert_eq!(popped.priority, 0); //<-- the item just added has the lowest priority value
        });
    });
}

fn update_on_large_queue(c: &mut Criterion) {
    let queue = LockedQueue::<u64>::new(50_000);
    let keys: Vec<_> = (0..50_000)
        .map(|i| queue.push(Item::new(i, i as i64)).unwrap())
        .collect();
    let mut round = 0usize;

    c.bench_function("sync_locks update_on_large_queue", |b| {
        b.iter(|| {
            let key = keys[round % keys.len()];
            round += 1;
            queue
                .update(key, 0, black_box((round % 100_000) as i64))
                .unwrap();
        });
    });
}

criterion_group!(
    benches,
    push_pop,
    push_top_priority_on_large_queue,
    update_on_large_queue
);
criterion_main!(benches);
