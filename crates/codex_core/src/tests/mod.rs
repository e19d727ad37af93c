
use std::{sync::atomic::Ordering, time::Duration};

use fixtures::{
    APPROVED, FailingCommitStore, METADATA_ID, NEW_OWNER, OWNER, address, all_provenance,
    candidate, get_metadata, get_record, hashes, linked_provenance, metadata, put_metadata,
};
use tower::{Service, ServiceBuilder, timeout::TimeoutLayer};

use crate::{
    chain::memory::InMemoryChain,
    registry::{
        api::{Commit, RecordRequest, StoreRequest, StoreResponse},
        config::RegistryConfig,
        error::RegistryError,
        infrastructure::naming::{Address, ZERO_ADDRESS},
        init_in_memory_registry, init_registry,
        model::{ProvenanceEventType, Record},
    },
};

#[tokio::test]
async fn integration_create_record() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    chain.mint("42", hashes("genesis", &["f1", "f2"]));

    let record = record!(create!(lifecycle, "42", OWNER));
    assert_eq!(record.token_id, "42");
    assert_eq!(record.owner_address, address(OWNER));
    assert_eq!(record.hashes(), hashes("genesis", &["f1", "f2"]));
    assert!(record.is_private);
    assert!(!record.is_ignored);
    assert_eq!(record.approved_address, None);
    assert!(record.whitelisted_addresses.is_empty());
    assert_eq!(record.version, 1);

    let events = linked_provenance(&mut store, &record).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, ProvenanceEventType::Create);
    assert!(events[0].old_owner_address.is_zero());
    assert_eq!(events[0].new_owner_address, address(OWNER));
    assert_eq!(events[0].transaction_hash, "0xcreate42");
    assert_eq!(get_record(&mut store, "42").await.unwrap().version, 1);
}

#[tokio::test]
async fn integration_create_lowercases_addresses() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    chain.mint("42", hashes("genesis", &[]));

    let record = record!(create!(lifecycle, "42", "0x00000000000000000000000000000000000000A1"));
    assert_eq!(record.owner_address.as_str(), OWNER);
    assert_eq!(linked_provenance(&mut store, &record).await[0].new_owner_address.as_str(), OWNER);
}

#[tokio::test]
async fn integration_create_twice() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    chain.mint("42", hashes("genesis", &[]));

    record!(create!(lifecycle, "42", OWNER));
    assert_eq!(
        create!(lifecycle, "42", NEW_OWNER).unwrap_err(),
        RegistryError::RecordAlreadyExists("42".to_string())
    );
    assert_eq!(all_provenance(&mut store, "42").await.len(), 1);
    assert_eq!(get_record(&mut store, "42").await.unwrap().owner_address, address(OWNER));
}

#[tokio::test]
async fn integration_create_unreadable_token() {
    crate::codex_tracing::init();
    let (mut lifecycle, _chain, mut store) = init_in_memory_registry(RegistryConfig::default());

    assert_eq!(
        create!(lifecycle, "7", OWNER).unwrap_err(),
        RegistryError::ChainReadFailed("7".to_string())
    );
    assert!(get_record(&mut store, "7").await.is_none());
    assert!(all_provenance(&mut store, "7").await.is_empty());
}

#[tokio::test]
async fn integration_transfer_clears_approvals() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    chain.mint("42", hashes("genesis", &[]));
    record!(create!(lifecycle, "42", OWNER));
    let mut record = record!(approve_address!(lifecycle, "42", APPROVED));

    // whitelists are managed outside of chain events
    record.whitelisted_addresses.insert(address(APPROVED));
    record.is_ignored = true;
    record.is_private = false;
    match store.call(StoreRequest::Commit(Box::new(Commit::record(*record)))).await.unwrap() {
        StoreResponse::Committed(_) => {}
        other => panic!("Expected StoreResponse::Committed, got {other:?}"),
    }

    let record = record!(transfer!(lifecycle, "42", OWNER, NEW_OWNER));
    assert_eq!(record.owner_address, address(NEW_OWNER));
    assert!(record.whitelisted_addresses.is_empty());
    assert_eq!(record.approved_address, None);
    assert!(!record.is_ignored);
    assert!(record.is_private);
    assert_provenance_types!(store, record, [Create, Transfer]);

    let transfer = linked_provenance(&mut store, &record).await.pop().unwrap();
    assert_eq!(transfer.old_owner_address, address(OWNER));
    assert_eq!(transfer.new_owner_address, address(NEW_OWNER));
    assert_eq!(transfer.codex_record_token_id, "42");
}

#[tokio::test]
async fn integration_transfer_from_unexpected_owner() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    chain.mint("42", hashes("genesis", &[]));
    record!(create!(lifecycle, "42", OWNER));

    // the chain is authoritative, the mismatch is only logged
    let record = record!(transfer!(lifecycle, "42", APPROVED, NEW_OWNER));
    assert_eq!(record.owner_address, address(NEW_OWNER));
    let transfer = linked_provenance(&mut store, &record).await.pop().unwrap();
    assert_eq!(transfer.old_owner_address, address(APPROVED));
}

#[tokio::test]
async fn integration_destroy_keeps_record() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    chain.mint("42", hashes("genesis", &[]));
    record!(create!(lifecycle, "42", OWNER));

    let record = record!(destroy!(lifecycle, "42", OWNER));
    assert!(record.owner_address.is_zero());
    assert_eq!(record.hashes(), hashes("genesis", &[]));

    let stored = get_record(&mut store, "42").await.unwrap();
    assert!(stored.owner_address.is_zero());

    let destroy = linked_provenance(&mut store, &stored).await.pop().unwrap();
    assert_eq!(destroy.event_type, ProvenanceEventType::Destroy);
    assert_eq!(destroy.old_owner_address, address(OWNER));
    assert!(destroy.new_owner_address.is_zero());
}

#[tokio::test]
async fn integration_record_history() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    chain.mint("42", hashes("genesis", &[]));

    record!(create!(lifecycle, "42", OWNER));
    record!(transfer!(lifecycle, "42", OWNER, NEW_OWNER));
    let record = record!(destroy!(lifecycle, "42", NEW_OWNER));

    assert_provenance_types!(store, record, [Create, Transfer, Destroy]);
    assert_eq!(record.version, 3);
    assert_eq!(
        all_provenance(&mut store, "42").await.iter().map(|e| e.id).collect::<Vec<_>>(),
        record.provenance
    );
}

#[tokio::test]
async fn integration_confirm_mint_links_metadata() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    let genesis = hashes("genesis", &[]);
    chain.mint("42", genesis.clone());
    put_metadata(&mut store, metadata(&genesis, vec![])).await;
    record!(create!(lifecycle, "42", OWNER));

    let record = record!(confirm_mint!(lifecycle, "42", "1"));
    assert_eq!(record.provider_id.as_deref(), Some("1"));
    assert_eq!(record.provider_metadata_id.as_deref(), Some(METADATA_ID));
    assert_eq!(record.metadata.as_ref().unwrap().codex_record_token_id.as_deref(), Some("42"));
    assert_provenance_types!(store, record, [Create]);

    let metadata = get_metadata(&mut store, METADATA_ID).await.unwrap();
    assert_eq!(metadata.codex_record_token_id.as_deref(), Some("42"));
    assert_eq!(metadata.version, 2);
}

#[tokio::test]
async fn integration_confirm_mint_missing_metadata() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    chain.mint("42", hashes("genesis", &[]));
    record!(create!(lifecycle, "42", OWNER));

    assert_eq!(
        confirm_mint!(lifecycle, "42", "1").unwrap_err(),
        RegistryError::MetadataNotFound("42".to_string(), METADATA_ID.to_string())
    );
    assert_eq!(get_record(&mut store, "42").await.unwrap().provider_id, None);

    // hash-only providers have no document to link
    let record = record!(confirm_mint!(lifecycle, "42", "2"));
    assert_eq!(record.provider_id.as_deref(), Some("2"));
    assert!(record.metadata.is_none());
}

/// Token 42 minted with provider "1" and two pending candidates.
async fn setup_rich_record(
    lifecycle: &mut crate::registry::RecordLifecycleDefaultStack<
        crate::chain::memory::InMemoryChain,
        crate::store::memory::InMemoryStore,
    >,
    chain: &crate::chain::memory::InMemoryChain,
    store: &mut crate::store::memory::InMemoryStore,
) -> Box<Record> {
    let genesis = hashes("genesis", &[]);
    chain.mint("42", genesis.clone());
    put_metadata(
        store,
        metadata(&genesis, vec![candidate("first", &["a", "b"]), candidate("second", &["c"])]),
    )
    .await;
    record!(create!(lifecycle, "42", OWNER));
    record!(confirm_mint!(lifecycle, "42", "1"))
}

#[tokio::test]
async fn integration_modify_commits_matching_candidate() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    setup_rich_record(&mut lifecycle, &chain, &mut store).await;

    // asserted file order differs from the candidate's
    let record = record!(modify!(lifecycle, "42", "1", hashes("first", &["b", "a"])));
    assert_eq!(record.name_hash, "first-hash");
    assert_eq!(record.description_hash, "first-desc-hash");
    assert_eq!(record.file_hashes, vec!["b".to_string(), "a".to_string()]);

    let metadata = record.metadata.as_ref().unwrap();
    assert_eq!(metadata.name, "first");
    assert_eq!(metadata.description.as_deref(), Some("first description"));
    assert_eq!(metadata.name_hash, record.name_hash);
    assert_eq!(metadata.description_hash, record.description_hash);
    assert_eq!(metadata.pending_updates.len(), 1);
    assert_eq!(metadata.pending_updates[0].name, "second");
    assert_eq!(get_metadata(&mut store, METADATA_ID).await.unwrap(), *metadata);

    assert_provenance_types!(store, record, [Create, Modified]);
    let modified = linked_provenance(&mut store, &record).await.pop().unwrap();
    assert_eq!(modified.old_owner_address, address(OWNER));
    assert_eq!(modified.new_owner_address, address(OWNER));

    let detail_id = modified.codex_record_modified_event.unwrap();
    let detail = match store.call(StoreRequest::GetModificationDetail(detail_id)).await.unwrap() {
        StoreResponse::ModificationDetail(Some(detail)) => detail,
        other => panic!("Expected persisted modification detail, got {other:?}"),
    };
    assert_eq!(detail.modifier_address, address(OWNER));
    assert_eq!(detail.old_name_hash, "genesis-hash");
    assert_eq!(detail.new_name_hash, "first-hash");
    assert_eq!(detail.new_file_hashes, vec!["b".to_string(), "a".to_string()]);
    let content = detail.content.unwrap();
    assert_eq!(content.old_name, "initial");
    assert_eq!(content.new_name, "first");
    assert_eq!(
        content.new_files,
        vec!["https://files/a".to_string(), "https://files/b".to_string()]
    );
}

#[tokio::test]
async fn integration_modify_without_matching_candidate() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    let before = setup_rich_record(&mut lifecycle, &chain, &mut store).await;

    assert_eq!(
        modify!(lifecycle, "42", "1", hashes("third", &["a", "b"])).unwrap_err(),
        RegistryError::NoMatchingPendingUpdate("42".to_string(), METADATA_ID.to_string())
    );
    // same name and description, different files
    assert_eq!(
        modify!(lifecycle, "42", "1", hashes("first", &["a"])).unwrap_err(),
        RegistryError::NoMatchingPendingUpdate("42".to_string(), METADATA_ID.to_string())
    );

    let metadata = get_metadata(&mut store, METADATA_ID).await.unwrap();
    assert_eq!(metadata.pending_updates.len(), 2);
    assert_eq!(metadata.name, "initial");
    let record = get_record(&mut store, "42").await.unwrap();
    assert_eq!(record.hashes(), before.hashes());
    assert_eq!(record.version, before.version);
    assert_eq!(all_provenance(&mut store, "42").await.len(), 1);
}

#[tokio::test]
async fn integration_modify_first_candidate_wins() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    let genesis = hashes("genesis", &[]);
    chain.mint("42", genesis.clone());
    let first = candidate("dup", &["x"]);
    let second = candidate("dup", &["x"]);
    let second_id = second.id;
    put_metadata(&mut store, metadata(&genesis, vec![first, second])).await;
    record!(create!(lifecycle, "42", OWNER));
    record!(confirm_mint!(lifecycle, "42", "1"));

    let record = record!(modify!(lifecycle, "42", "1", hashes("dup", &["x"])));
    let pending = &record.metadata.as_ref().unwrap().pending_updates;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second_id);
}

#[tokio::test]
async fn integration_modify_hashes_only_provider() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    chain.mint("42", hashes("genesis", &[]));
    record!(create!(lifecycle, "42", OWNER));
    record!(confirm_mint!(lifecycle, "42", "2"));

    let record = record!(modify!(lifecycle, "42", "2", hashes("renamed", &["z"])));
    assert_eq!(record.hashes(), hashes("renamed", &["z"]));
    assert!(record.metadata.is_none());
    assert!(get_metadata(&mut store, METADATA_ID).await.is_none());
    assert_provenance_types!(store, record, [Create, Modified]);

    let modified = linked_provenance(&mut store, &record).await.pop().unwrap();
    let detail_id = modified.codex_record_modified_event.unwrap();
    match store.call(StoreRequest::GetModificationDetail(detail_id)).await.unwrap() {
        StoreResponse::ModificationDetail(Some(detail)) => assert!(detail.content.is_none()),
        other => panic!("Expected persisted modification detail, got {other:?}"),
    }
}

#[tokio::test]
async fn integration_modify_unknown_provider() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) =
        init_in_memory_registry(RegistryConfig::default().with_strict_providers(true));
    chain.mint("42", hashes("genesis", &[]));
    record!(create!(lifecycle, "42", OWNER));

    assert_eq!(
        confirm_mint!(lifecycle, "42", "9").unwrap_err(),
        RegistryError::InvalidProvider("42".to_string(), "9".to_string())
    );
    assert_eq!(
        modify!(lifecycle, "42", "9", hashes("renamed", &[])).unwrap_err(),
        RegistryError::InvalidProvider("42".to_string(), "9".to_string())
    );
    assert_eq!(all_provenance(&mut store, "42").await.len(), 1);
}

#[tokio::test]
async fn integration_modify_unlinked_record() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    setup_rich_record(&mut lifecycle, &chain, &mut store).await;

    // provider link does not match the Record's
    assert_eq!(
        modify!(lifecycle, "42", "2", hashes("first", &["a", "b"])).unwrap_err(),
        RegistryError::RecordNotFound("42".to_string())
    );
    assert_eq!(
        modify!(lifecycle, "43", "1", hashes("first", &["a", "b"])).unwrap_err(),
        RegistryError::RecordNotFound("43".to_string())
    );
    assert_eq!(all_provenance(&mut store, "42").await.len(), 1);
}

#[tokio::test]
async fn integration_modify_missing_metadata() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    setup_rich_record(&mut lifecycle, &chain, &mut store).await;
    assert_eq!(
        store.call(StoreRequest::RemoveMetadata(METADATA_ID.to_string())).await.unwrap(),
        StoreResponse::Ack
    );

    assert_eq!(
        modify!(lifecycle, "42", "1", hashes("first", &["a", "b"])).unwrap_err(),
        RegistryError::MetadataNotFound("42".to_string(), METADATA_ID.to_string())
    );
    assert_eq!(all_provenance(&mut store, "42").await.len(), 1);
}

#[tokio::test]
async fn integration_stale_metadata_write_rejected() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    setup_rich_record(&mut lifecycle, &chain, &mut store).await;

    // copy read by a candidate submitter before the modify lands
    let mut stale = get_metadata(&mut store, METADATA_ID).await.unwrap();
    let record = record!(modify!(lifecycle, "42", "1", hashes("first", &["a", "b"])));
    let committed = record.metadata.clone().unwrap();

    stale.propose(candidate("third", &["d"]));
    assert_eq!(
        store.call(StoreRequest::PutMetadata(*stale)).await.unwrap_err(),
        RegistryError::VersionConflict(METADATA_ID.to_string(), 2, 3)
    );

    // the consumed candidate stays consumed
    let stored = get_metadata(&mut store, METADATA_ID).await.unwrap();
    assert_eq!(stored, committed);
    assert_eq!(stored.name_hash, record.name_hash);
    assert_eq!(stored.description_hash, record.description_hash);
    assert_eq!(
        stored.pending_updates.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["second"]
    );

    // a submitter working from the current copy still gets through
    let mut current = stored;
    current.propose(candidate("third", &["d"]));
    put_metadata(&mut store, *current).await;
    assert_eq!(get_metadata(&mut store, METADATA_ID).await.unwrap().pending_updates.len(), 2);
}

#[tokio::test]
async fn integration_failed_commit_leaves_unlinked_provenance() {
    crate::codex_tracing::init();
    let store = FailingCommitStore::default();
    let chain = InMemoryChain::default();
    chain.mint("42", hashes("genesis", &[]));
    let mut lifecycle = init_registry(RegistryConfig::default(), chain, store.clone());
    let before = record!(create!(lifecycle, "42", OWNER));

    store.fail_commits.store(true, Ordering::SeqCst);
    assert_eq!(
        transfer!(lifecycle, "42", OWNER, NEW_OWNER).unwrap_err(),
        RegistryError::VersionConflict("42".to_string(), 1, 2)
    );

    let mut inner = store.inner.clone();
    let persisted = all_provenance(&mut inner, "42").await;
    assert_eq!(persisted.len(), 2);
    assert_eq!(persisted[1].event_type, ProvenanceEventType::Transfer);
    let stored = get_record(&mut inner, "42").await.unwrap();
    assert_eq!(stored.provenance, before.provenance);
    assert!(!stored.provenance.contains(&persisted[1].id));
    assert_eq!(stored.owner_address, address(OWNER));
    assert_eq!(stored.version, before.version);

    // the token was released, the redelivered event applies
    store.fail_commits.store(false, Ordering::SeqCst);
    let record = record!(transfer!(lifecycle, "42", OWNER, NEW_OWNER));
    assert_provenance_types!(inner, record, [Create, Transfer]);
    assert_eq!(all_provenance(&mut inner, "42").await.len(), 3);
}

#[tokio::test]
async fn integration_approve_address() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    chain.mint("42", hashes("genesis", &[]));
    record!(create!(lifecycle, "42", OWNER));

    let record = record!(approve_address!(lifecycle, "42", APPROVED));
    assert_eq!(record.approved_address, Some(address(APPROVED)));
    assert_provenance_types!(store, record, [Create]);

    // the zero address is stored as emitted
    let record = record!(approve_address!(lifecycle, "42", ZERO_ADDRESS));
    assert_eq!(record.approved_address, Some(Address::zero()));
    assert_eq!(get_record(&mut store, "42").await.unwrap().approved_address, Some(Address::zero()));
    assert_eq!(all_provenance(&mut store, "42").await.len(), 1);
}

#[tokio::test]
async fn integration_approve_address_missing_record() {
    crate::codex_tracing::init();
    let (mut lifecycle, _chain, mut store) = init_in_memory_registry(RegistryConfig::default());

    assert_eq!(
        approve_address!(lifecycle, "42", APPROVED).unwrap_err(),
        RegistryError::RecordNotFound("42".to_string())
    );
    assert!(get_record(&mut store, "42").await.is_none());
    assert!(all_provenance(&mut store, "42").await.is_empty());
}

#[tokio::test]
async fn integration_approve_operator_unsupported() {
    crate::codex_tracing::init();
    let (mut lifecycle, _chain, _store) = init_in_memory_registry(RegistryConfig::default());

    assert_eq!(
        lifecycle
            .call(RecordRequest::ApproveOperator {
                owner_address: address(OWNER),
                operator_address: address(APPROVED),
                is_approved: true,
                transaction_hash: "0xoperator".to_string(),
            })
            .await
            .unwrap_err(),
        RegistryError::OperationNotSupported("approve_operator")
    );
}

#[tokio::test]
async fn integration_address_validation() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) =
        init_in_memory_registry(RegistryConfig::default().with_address_validation(true));
    chain.mint("42", hashes("genesis", &[]));

    assert_eq!(
        create!(lifecycle, "42", "0x1234").unwrap_err(),
        RegistryError::InvalidAddress("0x1234".to_string())
    );
    assert!(get_record(&mut store, "42").await.is_none());
    assert!(all_provenance(&mut store, "42").await.is_empty());

    record!(create!(lifecycle, "42", OWNER));
}

#[tokio::test]
async fn integration_stale_commit_rejected() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    chain.mint("42", hashes("genesis", &[]));
    let stale = record!(create!(lifecycle, "42", OWNER));
    record!(transfer!(lifecycle, "42", OWNER, NEW_OWNER));

    assert_eq!(
        store.call(StoreRequest::Commit(Box::new(Commit::record(*stale)))).await.unwrap_err(),
        RegistryError::VersionConflict("42".to_string(), 1, 2)
    );
    assert_eq!(get_record(&mut store, "42").await.unwrap().owner_address, address(NEW_OWNER));
}

#[tokio::test]
async fn integration_concurrent_operations_same_token() {
    crate::codex_tracing::init();
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    chain.mint("42", hashes("genesis", &[]));
    record!(create!(lifecycle, "42", OWNER));

    let mut lifecycle = ServiceBuilder::new()
        .layer(TimeoutLayer::new(Duration::from_secs(5)))
        .service(lifecycle);
    let owners = (0..16).map(|i| Address::new(format!("0x{i:040x}"))).collect::<Vec<_>>();
    let transfers = owners.iter().map(|owner| {
        lifecycle.call(RecordRequest::Transfer {
            old_owner_address: address(OWNER),
            new_owner_address: owner.clone(),
            token_id: "42".to_string(),
            transaction_hash: format!("0x{owner}"),
        })
    });

    for result in futures::future::join_all(transfers).await {
        assert!(result.is_ok(), "transfer failed: {result:?}");
    }

    // no operation overwrote another one
    let record = get_record(&mut store, "42").await.unwrap();
    assert_eq!(record.version, 17);
    assert_eq!(record.provenance.len(), 17);
    assert_eq!(all_provenance(&mut store, "42").await.len(), 17);
    assert!(owners.contains(&record.owner_address));
}

#[tokio::test]
async fn integration_concurrent_operations_distinct_tokens() {
    crate::codex_tracing::init();
    let (lifecycle, chain, mut store) = init_in_memory_registry(RegistryConfig::default());
    let creates = (0..8).map(|i| {
        chain.mint(i.to_string(), hashes("genesis", &[]));
        let mut lifecycle = lifecycle.clone();
        async move { create!(lifecycle, i, OWNER) }
    });

    for result in futures::future::join_all(creates.collect::<Vec<_>>()).await {
        assert!(result.is_ok());
    }
    for i in 0..8 {
        assert_eq!(all_provenance(&mut store, &i.to_string()).await.len(), 1);
    }
}
