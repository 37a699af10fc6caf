//! Literal scenarios S1, S2, S3 from the spec: small, deterministic,
//! single-threaded drains.

use cslpq::{KVQueue, Queue};

/// S1 — empty pop, single push, pop, empty pop again.
#[test]
fn s1_empty_pop() {
    let q: KVQueue<u64, u64> = KVQueue::new(8);
    assert_eq!(q.try_pop(), None);
    q.push(112, 5);
    assert_eq!(q.try_pop(), Some((112, 5)));
    assert_eq!(q.try_pop(), None);
}

/// The 24 `(priority, value)` pairs common to S1/S2/S3, value `None`
/// standing in for the literal scenario's `queue.Push(101)` (no value).
fn s2_pairs() -> Vec<(u64, Option<u64>)> {
    vec![
        (112, Some(5)),
        (102, Some(1)),
        (121, Some(8)),
        (133, Some(15)),
        (124, Some(11)),
        (141, Some(16)),
        (123, Some(10)),
        (113, Some(6)),
        (103, Some(2)),
        (154, Some(23)),
        (142, Some(17)),
        (111, Some(4)),
        (153, Some(22)),
        (143, Some(18)),
        (125, Some(12)),
        (101, None),
        (152, Some(21)),
        (151, Some(20)),
        (122, Some(9)),
        (114, Some(7)),
        (131, Some(13)),
        (104, Some(3)),
        (101, Some(0x10000)),
        (132, Some(14)),
        (144, Some(19)),
    ]
}

/// S2 — ordered drain of the 24-pair set: non-decreasing keys, exactly 24
/// pops, multiset-equal to the input, both `101` entries present.
#[test]
fn s2_ordered_drain() {
    let q: KVQueue<u64, Option<u64>> = KVQueue::new(8);
    let pairs = s2_pairs();
    for &(priority, value) in &pairs {
        q.push(priority, value);
    }

    let mut popped = Vec::new();
    while let Some(pair) = q.try_pop() {
        popped.push(pair);
    }

    assert_eq!(popped.len(), 24);

    let keys: Vec<u64> = popped.iter().map(|(k, _)| *k).collect();
    let mut sorted_keys = keys.clone();
    sorted_keys.sort_unstable();
    assert_eq!(keys, sorted_keys, "S2 popped keys must be non-decreasing");

    let mut expected = pairs.clone();
    let mut actual = popped;
    expected.sort();
    actual.sort();
    assert_eq!(actual, expected, "S2 multiset must equal input");

    assert_eq!(
        actual.iter().filter(|(k, _)| *k == 101).count(),
        2,
        "both key-101 entries must survive"
    );
}

/// S3 — composite `(u64, u64)` lexicographic keys built from the same
/// 24-pair setup; verifies lexicographic, non-decreasing order on drain.
#[test]
fn s3_composite_key_ordering() {
    let q: Queue<(u64, u64)> = Queue::new(8);
    for (priority, value) in s2_pairs() {
        let value = value.unwrap_or(0);
        q.push((priority, value));
    }

    let mut popped = Vec::new();
    while let Some(key) = q.try_pop() {
        popped.push(key);
    }

    assert_eq!(popped.len(), 24);
    let mut sorted = popped.clone();
    sorted.sort_unstable();
    assert_eq!(popped, sorted, "S3 composite keys must be non-decreasing");
}
