//! Client Tests
//!
//! Tests verify, against the in-memory store:
//! - Single-key round trips, deletion and increments
//! - Anchored scans and interval aggregates
//! - Rank, offset range and pop behavior
//! - Batch operations and set listing

use std::sync::Arc;
use std::thread;

use zset_client::{Bound, Member, MemStore, StatusKind, ZSetClient};

fn client() -> ZSetClient<MemStore> {
    ZSetClient::new(MemStore::new())
}

/// `{a:10, b:10, c:20}`
fn seeded() -> ZSetClient<MemStore> {
    let client = client();
    client.zset("board", "a", 10).unwrap();
    client.zset("board", "b", 10).unwrap();
    client.zset("board", "c", 20).unwrap();
    client
}

// =============================================================================
// Single-key Tests
// =============================================================================

#[test]
fn test_set_then_get() {
    let client = client();
    for score in [0, 1, -1, i64::MAX, i64::MIN] {
        client.zset("board", "k", score).unwrap();
        assert_eq!(client.zget("board", "k").unwrap(), score);
    }
}

#[test]
fn test_get_missing_is_not_found() {
    let client = client();
    let err = client.zget("board", "ghost").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status_kind(), Some(StatusKind::NotFound));
}

#[test]
fn test_del_then_exists() {
    let client = seeded();
    assert!(client.zexists("board", "a").unwrap());
    client.zdel("board", "a").unwrap();
    assert!(!client.zexists("board", "a").unwrap());
    assert_eq!(client.zsize("board").unwrap(), 2);
}

#[test]
fn test_del_missing_key_succeeds() {
    let client = client();
    client.zdel("board", "ghost").unwrap();
}

#[test]
fn test_incr_creates_and_accumulates() {
    let client = client();
    assert_eq!(client.zincr("board", "k", 5).unwrap(), 5);
    assert_eq!(client.zincr("board", "k", -8).unwrap(), -3);
    assert_eq!(client.zget("board", "k").unwrap(), -3);
}

// =============================================================================
// Whole-set Tests
// =============================================================================

#[test]
fn test_clear_is_idempotent() {
    let client = seeded();
    client.zclear("board").unwrap();
    client.zclear("board").unwrap();
    assert_eq!(client.zsize("board").unwrap(), 0);
}

#[test]
fn test_size_of_missing_set_is_zero() {
    assert_eq!(client().zsize("nothing").unwrap(), 0);
}

#[test]
fn test_list_set_names() {
    let client = client();
    for name in ["alpha", "beta", "gamma", "delta"] {
        client.zset(name, "k", 1).unwrap();
    }

    assert_eq!(
        client.zlist("", "", 10).unwrap(),
        vec!["alpha", "beta", "delta", "gamma"]
    );
    // Start is exclusive, end inclusive
    assert_eq!(client.zlist("alpha", "delta", 10).unwrap(), vec!["beta", "delta"]);
    assert_eq!(client.zlist("", "", 2).unwrap(), vec!["alpha", "beta"]);
}

#[test]
fn test_emptied_set_disappears_from_list() {
    let client = client();
    client.zset("temp", "k", 1).unwrap();
    client.zdel("temp", "k").unwrap();
    assert!(client.zlist("", "", 10).unwrap().is_empty());
}

// =============================================================================
// Scan Tests
// =============================================================================

#[test]
fn test_scan_anchor_excludes_tie_and_includes_end() {
    let client = seeded();
    let page = client.zscan("board", "a", 10, 20, 10).unwrap();
    assert_eq!(page, vec![Member::new("b", 10), Member::new("c", 20)]);
}

#[test]
fn test_scan_unbounded_returns_everything_in_order() {
    let client = seeded();
    let page = client
        .zscan("board", "", Bound::Unbounded, Bound::Unbounded, 10)
        .unwrap();
    assert_eq!(
        page,
        vec![Member::new("a", 10), Member::new("b", 10), Member::new("c", 20)]
    );
}

#[test]
fn test_scan_respects_limit() {
    let client = seeded();
    let page = client
        .zscan("board", "", Bound::Unbounded, Bound::Unbounded, 2)
        .unwrap();
    assert_eq!(page.len(), 2);
}

#[test]
fn test_scan_pages_with_last_member_as_anchor() {
    let client = client();
    for (i, key) in ["a", "b", "c", "d", "e", "f", "g"].iter().enumerate() {
        client.zset("board", key, (i / 3) as i64).unwrap();
    }

    let mut seen = Vec::new();
    let mut key_start = String::new();
    let mut start = Bound::Unbounded;
    loop {
        let page = client
            .zscan("board", &key_start, start, Bound::Unbounded, 2)
            .unwrap();
        let Some(last) = page.last() else { break };
        key_start = last.key.clone();
        start = Bound::Value(last.score);
        seen.extend(page.into_iter().map(|m| m.key));
    }

    assert_eq!(seen, vec!["a", "b", "c", "d", "e", "f", "g"]);
}

#[test]
fn test_rscan_mirrors_scan() {
    let client = seeded();
    let page = client
        .zrscan("board", "", Bound::Unbounded, Bound::Unbounded, 10)
        .unwrap();
    assert_eq!(
        page,
        vec![Member::new("c", 20), Member::new("b", 10), Member::new("a", 10)]
    );

    let page = client.zrscan("board", "b", 10, Bound::Unbounded, 10).unwrap();
    assert_eq!(page, vec![Member::new("a", 10)]);
}

#[test]
fn test_keys_follow_scan_rule() {
    let client = seeded();
    assert_eq!(
        client.zkeys("board", "a", 10, 20, 10).unwrap(),
        vec!["b", "c"]
    );
}

#[test]
fn test_scan_missing_set_is_empty() {
    let client = client();
    assert!(client
        .zscan("nothing", "", Bound::Unbounded, Bound::Unbounded, 10)
        .unwrap()
        .is_empty());
}

// =============================================================================
// Aggregate Tests
// =============================================================================

#[test]
fn test_count_sum_avg() {
    let client = seeded();
    assert_eq!(client.zcount("board", Bound::Unbounded, 15).unwrap(), 2);
    assert_eq!(client.zcount("board", 10, 20).unwrap(), 3);
    assert_eq!(client.zsum("board", Bound::Unbounded, Bound::Unbounded).unwrap(), 40);
    assert_eq!(client.zsum("board", 11, Bound::Unbounded).unwrap(), 20);

    let avg = client.zavg("board", Bound::Unbounded, Bound::Unbounded).unwrap();
    assert!((avg - 40.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_avg_of_empty_interval() {
    let client = seeded();
    assert_eq!(client.zavg("board", 100, 200).unwrap(), 0.0);
}

// =============================================================================
// Rank and Range Tests
// =============================================================================

#[test]
fn test_rank_and_reverse_rank() {
    let client = seeded();
    assert_eq!(client.zrank("board", "a").unwrap(), 0);
    assert_eq!(client.zrank("board", "b").unwrap(), 1);
    assert_eq!(client.zrrank("board", "b").unwrap(), 1);
    assert_eq!(client.zrrank("board", "c").unwrap(), 0);
    assert!(client.zrank("board", "ghost").unwrap_err().is_not_found());
}

#[test]
fn test_range_by_offset() {
    let client = seeded();
    assert_eq!(
        client.zrange_slice("board", 1, 5).unwrap(),
        vec![Member::new("b", 10), Member::new("c", 20)]
    );
    assert_eq!(
        client.zrrange_slice("board", 0, 1).unwrap(),
        vec![Member::new("c", 20)]
    );

    let map = client.zrange("board", 0, 2).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["a"], 10);
    assert_eq!(map["b"], 10);

    let map = client.zrrange("board", 0, 10).unwrap();
    assert_eq!(map.len(), 3);
}

#[test]
fn test_remove_range_by_rank() {
    let client = seeded();
    client.zremrangebyrank("board", 0, 1).unwrap();
    assert_eq!(client.zrange_slice("board", 0, 10).unwrap(), vec![Member::new("c", 20)]);
}

#[test]
fn test_remove_range_by_score() {
    let client = seeded();
    client.zremrangebyscore("board", 10, 10).unwrap();
    assert_eq!(client.zsize("board").unwrap(), 1);
    assert!(client.zexists("board", "c").unwrap());
}

#[test]
fn test_pop_front_removes_lowest() {
    let client = seeded();
    let before = client.zsize("board").unwrap();
    assert_eq!(client.zpop_front("board", 1).unwrap(), vec![Member::new("a", 10)]);
    assert_eq!(client.zsize("board").unwrap(), before - 1);
}

#[test]
fn test_pop_back_returns_highest_first() {
    let client = seeded();
    assert_eq!(
        client.zpop_back("board", 2).unwrap(),
        vec![Member::new("c", 20), Member::new("b", 10)]
    );
    assert_eq!(client.zsize("board").unwrap(), 1);
}

// =============================================================================
// Batch Tests
// =============================================================================

#[test]
fn test_multi_set_get_del() {
    let client = client();
    client
        .multi_zset("board", vec![("a", 1), ("b", 2), ("c", 3)])
        .unwrap();

    let found = client.multi_zget("board", &["a", "c", "ghost"]).unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found["a"], 1);
    assert_eq!(found["c"], 3);

    let (keys, scores) = client.multi_zget_slice("board", &["c", "a"]).unwrap();
    assert_eq!(keys, vec!["c", "a"]);
    assert_eq!(scores, vec![3, 1]);

    client.multi_zdel("board", &["a", "b"]).unwrap();
    assert_eq!(client.zsize("board").unwrap(), 1);
}

#[test]
fn test_multi_set_accepts_owned_keys() {
    let client = client();
    let entries: Vec<(String, i64)> = (0..5).map(|i| (format!("k{}", i), i)).collect();
    client.multi_zset("board", entries).unwrap();
    assert_eq!(client.zsize("board").unwrap(), 5);
}

#[test]
fn test_empty_batches_succeed() {
    let client = client();
    let none: [&str; 0] = [];
    assert!(client.multi_zget("board", &none).unwrap().is_empty());
    client.multi_zdel("board", &none).unwrap();
    client
        .multi_zset("board", Vec::<(&str, i64)>::new())
        .unwrap();
    assert_eq!(client.zsize("board").unwrap(), 0);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_shared_store_across_threads() {
    let store = Arc::new(MemStore::new());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let client = ZSetClient::new(Arc::clone(&store));
            thread::spawn(move || {
                for i in 0..50 {
                    client
                        .zset("shared", &format!("t{}-{}", t, i), i)
                        .unwrap();
                    client.zincr("shared", "counter", 1).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let client = ZSetClient::new(store);
    assert_eq!(client.zsize("shared").unwrap(), 201);
    assert_eq!(client.zget("shared", "counter").unwrap(), 200);
}
