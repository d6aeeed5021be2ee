//! Concurrency tests for the cached session slot.

use std::sync::{Arc, Barrier};
use std::thread;

use ordnance::{ConnectionManager, InMemoryConnector, InMemoryStore, LookupConfig, LookupGateway};
use serde_json::json;

fn shared_gateway(store: &Arc<InMemoryStore>) -> Arc<LookupGateway> {
    let connector = InMemoryConnector::new(Arc::clone(store), "reader", "secret");
    Arc::new(LookupGateway::new(
        ConnectionManager::new(Box::new(connector)),
        LookupConfig::default(),
    ))
}

#[test]
fn concurrent_first_fetches_open_exactly_one_session() {
    let store = Arc::new(InMemoryStore::new());
    store
        .insert("BLPU", json!({ "POSTCODE_LOCATOR": "EX4 4QJ" }))
        .unwrap();
    let gateway = shared_gateway(&store);
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let gateway = Arc::clone(&gateway);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                gateway
                    .find_by_postcode("EX4 4QJ", None)
                    .expect("lookup should succeed")
            })
        })
        .collect();

    let responses: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let fresh = responses.iter().filter(|r| r.new_connection).count();
    assert_eq!(fresh, 1, "exactly one request should open the session");
    assert_eq!(store.authentications(), 1);
    assert!(responses.iter().all(|r| r.size == 1));
}

#[test]
fn concurrent_requests_get_distinct_response_ids() {
    let store = Arc::new(InMemoryStore::new());
    let gateway = shared_gateway(&store);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let gateway = Arc::clone(&gateway);
            thread::spawn(move || {
                (0..10)
                    .map(|_| gateway.fetch_test_data(None).unwrap().response_id)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), 80);
    assert_eq!(ids.first(), Some(&1));
    assert_eq!(ids.last(), Some(&80));
}

#[test]
fn revocation_under_load_replaces_session_once() {
    let store = Arc::new(InMemoryStore::new());
    let gateway = shared_gateway(&store);

    gateway.fetch_test_data(None).unwrap();
    store.revoke_sessions();

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let gateway = Arc::clone(&gateway);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                gateway.fetch_test_data(None).unwrap().new_connection
            })
        })
        .collect();

    let fresh = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|is_new| *is_new)
        .count();

    assert_eq!(fresh, 1);
    assert_eq!(store.authentications(), 2);
}
