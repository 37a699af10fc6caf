//! S6 — MPSC with duplicates: 10 producers push 100,000 items total, drawn
//! from 100 distinct keys (1,000 duplicates each) paired with unique
//! values; one consumer drains. Every `(key, value)` pair must appear
//! exactly once in the output (P1, P3).

use std::collections::HashSet;

use cslpq::KVQueue;
use rand::prelude::*;

const DISTINCT_KEYS: u64 = 100;
const DUPLICATES_PER_KEY: u64 = 1_000;
const TOTAL: u64 = DISTINCT_KEYS * DUPLICATES_PER_KEY;
const PRODUCERS: u64 = 10;
const PER_PRODUCER: u64 = TOTAL / PRODUCERS;

#[test]
fn s6_mpsc_with_duplicates() {
    let _ = env_logger::try_init();
    let queue: KVQueue<u64, u64> = KVQueue::new(6);

    // `value` is a globally unique counter; `key` cycles over the 100
    // distinct priorities, giving exactly 1,000 duplicates of each.
    let mut all_pairs: Vec<(u64, u64)> = (0..TOTAL).map(|value| (value % DISTINCT_KEYS, value)).collect();
    all_pairs.shuffle(&mut rand::thread_rng());

    let chunks: Vec<Vec<(u64, u64)>> = all_pairs
        .chunks(PER_PRODUCER as usize)
        .map(|c| c.to_vec())
        .collect();

    let popped = crossbeam_utils::thread::scope(|scope| {
        for chunk in chunks {
            let queue = &queue;
            scope.spawn(move |_| {
                for (key, value) in chunk {
                    queue.push(key, value);
                }
            });
        }

        let mut popped = Vec::with_capacity(TOTAL as usize);
        while (popped.len() as u64) < TOTAL {
            if let Some(pair) = queue.try_pop() {
                popped.push(pair);
            }
        }
        popped
    })
    .unwrap();

    assert_eq!(popped.len(), TOTAL as usize);
    let unique: HashSet<(u64, u64)> = popped.iter().copied().collect();
    assert_eq!(unique.len(), TOTAL as usize, "no (key, value) pair may repeat");
    assert_eq!(unique, all_pairs.into_iter().collect());
}
