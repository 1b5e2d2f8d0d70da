use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use pqueue::{Item, PriorityQueue};
use sync::ChanneledQueue;

fn push_pop(c: &mut Criterion) {
    let queue = ChanneledQueue::<u64>::new(50_000).unwrap();

    c.bench_function("sync_channels push_pop", |b| {
        b.iter(|| {
            queue.push(Item::new(0, black_box(1))).unwrap();
            let drained = queue.drain(black_box(1)).unwrap();
            assert_eq!(drained.len(), 1);
        })
    });
}

fn push_top_priority_on_large_queue(c: &mut Criterion) {
    let queue = ChanneledQueue::<u64>::new(500_000).unwrap();
    // -- Prepare large queue
    let mut priority = 50_000;
    for i in 0..50_000 {
        queue.push(Item::new(i, black_box(priority))).unwrap();
        priority -= 1;
    }

    c.bench_function("sync_channels push_top_priority_on_large_queue", |b| {
        b.iter(|| {
            queue.push(Item::new(0, black_box(0))).unwrap();
            queue.pop().unwrap();
        });
    });
}

criterion_group!(benches, push_pop, push_top_priority_on_large_queue);
criterion_main!(benches);
