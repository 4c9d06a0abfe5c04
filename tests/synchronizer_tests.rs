mod common;

use common::{GatedGateway, ScriptedGateway, account, transport_error};
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::Arc;
use telewallet::application::synchronizer::StateSynchronizer;
use telewallet::domain::account::Balance;
use telewallet::domain::transaction::{Direction, TransactionRecord};

fn record(id: &str, timestamp: i64) -> TransactionRecord {
    TransactionRecord {
        id: id.to_string(),
        counterparty: "dave".to_string(),
        amount: dec!(1),
        direction: Direction::Inbound,
        timestamp,
    }
}

#[tokio::test]
async fn a_fetch_that_completes_late_never_overwrites_a_newer_one() {
    let gateway = Arc::new(GatedGateway::new());
    let sync = StateSynchronizer::new(gateway.clone(), account("42", "carol", "0 ETH"));

    // First refresh issues its balance fetch and blocks on the gate.
    let early = {
        let sync = sync.clone();
        tokio::spawn(async move { sync.refresh().await })
    };
    gateway.wait_for_pending_lookups(1).await;

    // Second refresh issues a newer fetch for the same slice.
    let late = {
        let sync = sync.clone();
        tokio::spawn(async move { sync.refresh().await })
    };
    gateway.wait_for_pending_lookups(2).await;

    // The newer fetch completes first.
    gateway.release_lookup(1, Ok(account("42", "carol", "9 ETH")));
    let view = late.await.unwrap();
    assert_eq!(view.account.unwrap().balance, Balance("9 ETH".to_string()));

    // The older fetch completes afterwards; its result must be discarded.
    gateway.release_lookup(0, Ok(account("42", "carol", "0 ETH")));
    early.await.unwrap();

    let view = sync.current_view().await;
    assert_eq!(view.account.unwrap().balance, Balance("9 ETH".to_string()));
    assert!(!view.balance_stale);
}

#[tokio::test]
async fn balance_and_history_slices_fail_independently() {
    let gateway = Arc::new(ScriptedGateway::new());
    let sync = StateSynchronizer::new(gateway.clone(), account("42", "carol", "0 ETH"));

    // Balance fetch fails, history fetch succeeds.
    gateway.push_lookup(Err(transport_error()));
    gateway.push_transactions(Ok(vec![record("a", 1)]));

    let view = sync.refresh().await;
    assert!(view.balance_stale);
    assert_eq!(view.account.unwrap().balance, Balance("0 ETH".to_string()));
    assert!(!view.history_stale);
    assert_eq!(view.transactions.len(), 1);

    // Now the other way around.
    gateway.push_lookup(Ok(account("42", "carol", "7 ETH")));
    gateway.push_transactions(Err(transport_error()));

    let view = sync.refresh().await;
    assert!(!view.balance_stale);
    assert_eq!(view.account.unwrap().balance, Balance("7 ETH".to_string()));
    assert!(view.history_stale);
    assert_eq!(view.transactions.len(), 1);
}

#[tokio::test]
async fn transient_failures_never_blank_out_known_data() {
    let gateway = Arc::new(ScriptedGateway::new());
    let sync = StateSynchronizer::new(gateway.clone(), account("42", "carol", "3 ETH"));

    gateway.push_lookup(Err(transport_error()));
    gateway.push_transactions(Err(transport_error()));
    gateway.push_directory(Err(transport_error()));

    let view = sync.refresh().await;
    assert_eq!(view.account.unwrap().balance, Balance("3 ETH".to_string()));
    assert!(view.balance_stale);
    assert!(view.history_stale);
}

#[tokio::test]
async fn repeated_and_overlapping_pages_keep_the_cache_consistent() {
    let gateway = Arc::new(ScriptedGateway::new());
    let sync = StateSynchronizer::new(gateway.clone(), account("42", "carol", "0 ETH"));

    let pages = vec![
        vec![record("a", 1), record("b", 5)],
        vec![record("b", 5), record("c", 3)],
        vec![record("c", 3), record("a", 1)],
    ];

    let mut last_len = 0;
    for page in pages {
        gateway.push_lookup(Ok(account("42", "carol", "0 ETH")));
        gateway.push_transactions(Ok(page));

        let view = sync.refresh().await;
        assert!(view.transactions.len() >= last_len);
        last_len = view.transactions.len();

        let mut ids = HashSet::new();
        for tx in &view.transactions {
            assert!(ids.insert(tx.id.clone()), "duplicate id {}", tx.id);
        }
        for pair in view.transactions.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp, "view not newest-first");
        }
    }
    assert_eq!(last_len, 3);
}

#[tokio::test]
async fn fresh_ids_are_the_page_minus_the_cache() {
    let gateway = Arc::new(ScriptedGateway::new());
    let sync = StateSynchronizer::new(gateway.clone(), account("42", "carol", "0 ETH"));

    gateway.push_lookup(Ok(account("42", "carol", "0 ETH")));
    gateway.push_transactions(Ok(vec![record("a", 1), record("b", 2)]));
    let view = sync.refresh().await;
    assert_eq!(view.fresh_ids, vec!["a".to_string(), "b".to_string()]);

    gateway.push_lookup(Ok(account("42", "carol", "0 ETH")));
    gateway.push_transactions(Ok(vec![record("b", 2), record("c", 3)]));
    let view = sync.refresh().await;
    assert_eq!(view.fresh_ids, vec!["c".to_string()]);
}

#[tokio::test]
async fn directory_is_replaced_wholesale() {
    let gateway = Arc::new(ScriptedGateway::new());
    let sync = StateSynchronizer::new(gateway.clone(), account("42", "carol", "0 ETH"));

    gateway.push_lookup(Ok(account("42", "carol", "0 ETH")));
    gateway.push_directory(Ok(vec!["alice".to_string(), "bob".to_string()]));
    let view = sync.refresh().await;
    assert_eq!(view.directory.handles(), ["alice", "bob"]);

    // A later snapshot fully replaces the earlier one, dropped names included.
    gateway.push_lookup(Ok(account("42", "carol", "0 ETH")));
    gateway.push_directory(Ok(vec!["dave".to_string()]));
    let view = sync.refresh().await;
    assert_eq!(view.directory.handles(), ["dave"]);

    // A failed directory fetch keeps the previous snapshot.
    gateway.push_lookup(Ok(account("42", "carol", "0 ETH")));
    gateway.push_directory(Err(transport_error()));
    let view = sync.refresh().await;
    assert_eq!(view.directory.handles(), ["dave"]);
}
