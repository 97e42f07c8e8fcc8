use super::{Override, OverrideCache};
use crate::types::TransactionId;

fn id(value: &str) -> TransactionId {
    TransactionId::new(value)
}

#[test]
fn test_marking_moves_id_between_pending_sets() {
    let cache = OverrideCache::new();

    cache.mark_approved(&id("tx-1"));

    assert!(cache.is_pending_approve(&id("tx-1")));
    assert!(!cache.is_pending_unapprove(&id("tx-1")));

    cache.mark_unapproved(&id("tx-1"));

    assert!(!cache.is_pending_approve(&id("tx-1")));
    assert!(cache.is_pending_unapprove(&id("tx-1")));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_random_mark_sequences_keep_sets_disjoint() {
    let cache = OverrideCache::new();
    let ids: Vec<TransactionId> = (0..8).map(|index| id(&format!("tx-{index}"))).collect();

    for _ in 0..500 {
        let target = &ids[rand::random::<u8>() as usize % ids.len()];

        if rand::random::<bool>() {
            cache.mark_approved(target);
        } else {
            cache.mark_unapproved(target);
        }

        let approve = cache.pending_approve();
        let unapprove = cache.pending_unapprove();

        assert!(approve.iter().all(|item| !unapprove.contains(item)));
        assert_eq!(approve.len() + unapprove.len(), cache.len());
    }
}

#[test]
fn test_marking_twice_is_idempotent() {
    let once = OverrideCache::new();
    once.mark_approved(&id("tx-1"));

    let twice = OverrideCache::new();
    twice.mark_approved(&id("tx-1"));
    twice.mark_approved(&id("tx-1"));

    assert_eq!(once.get(&id("tx-1")), twice.get(&id("tx-1")));
    assert_eq!(once.pending_approve(), twice.pending_approve());
    assert_eq!(twice.len(), 1);
}

#[test]
fn test_unedited_transaction_has_no_override() {
    let cache = OverrideCache::new();

    assert!(cache.is_empty());
    assert_eq!(cache.lookup(&id("tx-1")), None);
    assert!(!cache.is_pending_approve(&id("tx-1")));
    assert!(!cache.is_pending_unapprove(&id("tx-1")));
}

#[test]
fn test_confirm_promotes_matching_optimistic_value() {
    let cache = OverrideCache::new();
    cache.mark_approved(&id("tx-1"));

    assert_eq!(cache.get(&id("tx-1")), Some(Override { optimistic: true, confirmed: None }));

    cache.confirm(&id("tx-1"), true);

    let entry = cache.get(&id("tx-1"));
    assert_eq!(entry, Some(Override { optimistic: true, confirmed: Some(true) }));
    assert!(entry.is_some_and(|entry| entry.is_confirmed()));
}

#[test]
fn test_confirm_ignores_superseded_value() {
    let cache = OverrideCache::new();
    cache.mark_approved(&id("tx-1"));
    cache.mark_unapproved(&id("tx-1"));

    cache.confirm(&id("tx-1"), true);

    assert_eq!(cache.get(&id("tx-1")), Some(Override { optimistic: false, confirmed: None }));
    assert!(cache.is_pending_unapprove(&id("tx-1")));
}

#[test]
fn test_confirm_without_override_does_not_create_entry() {
    let cache = OverrideCache::new();

    cache.confirm(&id("tx-1"), true);

    assert!(cache.is_empty());
}

#[test]
fn test_remarking_same_value_keeps_confirmation() {
    let cache = OverrideCache::new();
    cache.mark_unapproved(&id("tx-1"));
    cache.confirm(&id("tx-1"), false);
    cache.mark_unapproved(&id("tx-1"));

    assert_eq!(cache.get(&id("tx-1")), Some(Override { optimistic: false, confirmed: Some(false) }));
}

#[test]
fn test_unconfirmed_lists_edits_awaiting_acknowledgment() {
    let cache = OverrideCache::new();
    cache.mark_approved(&id("tx-2"));
    cache.mark_unapproved(&id("tx-1"));
    cache.mark_approved(&id("tx-3"));
    cache.confirm(&id("tx-3"), true);

    assert_eq!(cache.unconfirmed(), vec![id("tx-1"), id("tx-2")]);

    cache.mark_unapproved(&id("tx-3"));

    assert_eq!(cache.unconfirmed(), vec![id("tx-1"), id("tx-2"), id("tx-3")]);
}
