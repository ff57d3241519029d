use grove_sdk::testing::{
    CREATOR, MockChain, MockContentStore, MockWallet, TEST_NOW, ended_quest, metadata, open_quest,
    test_config, test_node,
};
use grove_sdk::{LoadState, Network, QuestIndexing, QuestNode, QuestStatus};

// ---------------------------------------------------------------------------
// Detail view
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_positive_ids_are_rejected_without_calls() {
    let chain = MockChain::new().with_quest(open_quest(1));
    let node = test_node(chain.clone(), MockContentStore::new(), None);

    for id in [0, -1, i64::MIN] {
        match node.load_quest(id).await {
            LoadState::Invalid(msg) => assert!(msg.contains("positive"), "{msg}"),
            other => panic!("expected Invalid for {id}, got {other:?}"),
        }
    }
    assert_eq!(chain.calls(), 0);
}

#[tokio::test]
async fn quest_with_metadata_is_ready() {
    let chain = MockChain::new().with_quest(open_quest(1));
    let store = MockContentStore::new()
        .with_metadata("bafymeta1", &metadata("Write a haiku", "About the chain"));
    let node = test_node(chain, store.clone(), None);

    let view = node.load_quest(1).await.into_ready().expect("ready");
    assert_eq!(view.title(), "Write a haiku");
    assert_eq!(view.description(), Some("About the chain"));
    assert_eq!(view.status(TEST_NOW), QuestStatus::Open);
    assert_eq!(store.fetches(), 1);
}

#[tokio::test]
async fn empty_cid_skips_the_content_store() {
    let mut quest = open_quest(2);
    quest.metadata_cid = String::new();
    let store = MockContentStore::new();
    let node = test_node(MockChain::new().with_quest(quest), store.clone(), None);

    let view = node.load_quest(2).await.into_ready().expect("ready");
    assert_eq!(view.metadata, None);
    assert_eq!(view.title(), "Quest #2");
    assert_eq!(store.fetches(), 0);
}

#[tokio::test]
async fn metadata_failure_leaves_record_fields() {
    // No document pinned under bafymeta3: the gateway answers 404.
    let store = MockContentStore::new();
    let node = test_node(MockChain::new().with_quest(open_quest(3)), store.clone(), None);

    let view = node.load_quest(3).await.into_ready().expect("ready");
    assert_eq!(view.metadata, None);
    assert_eq!(view.record.prize, open_quest(3).prize);
    assert_eq!(store.fetches(), 1);
}

#[tokio::test]
async fn non_json_metadata_is_ignored() {
    let store = MockContentStore::new().with_document("bafymeta4", serde_json::json!([1, 2, 3]));
    let node = test_node(MockChain::new().with_quest(open_quest(4)), store, None);

    let view = node.load_quest(4).await.into_ready().expect("ready");
    assert_eq!(view.metadata, None);
}

#[tokio::test]
async fn unknown_quest_is_not_found() {
    let node = test_node(MockChain::new(), MockContentStore::new(), None);
    assert_eq!(
        node.load_quest(9).await,
        LoadState::Failed("quest #9 not found".into())
    );
}

#[tokio::test]
async fn read_failure_is_a_page_level_error() {
    let chain = MockChain::new().with_quest(open_quest(1));
    chain.fail_quest(1);
    let node = test_node(chain, MockContentStore::new(), None);

    match node.load_quest(1).await {
        LoadState::Failed(msg) => assert!(msg.contains("getQuest(1) reverted"), "{msg}"),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_contract_address_fails_on_first_call() {
    let mut config = test_config();
    config.contract_address = "not-an-address".into();
    let node = QuestNode::new(config, MockChain::new(), MockContentStore::new(), None::<MockWallet>);

    match node.load_quest(1).await {
        LoadState::Failed(msg) => assert!(msg.contains("not-an-address"), "{msg}"),
        other => panic!("expected Failed, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// List view
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancelled_quests_are_never_listed() {
    let mut cancelled = open_quest(2);
    cancelled.cancelled = true;
    let mut finalized = ended_quest(3);
    finalized.finalized = true;

    let chain = MockChain::new()
        .with_quest(open_quest(1))
        .with_quest(cancelled)
        .with_quest(finalized)
        .with_quest(ended_quest(4));
    let node = test_node(chain, MockContentStore::new(), None);

    let quests = node.load_quests().await.into_ready().expect("ready");
    let ids: Vec<u64> = quests.iter().map(|q| q.id()).collect();
    assert_eq!(ids, vec![1, 3, 4]);
    assert!(quests.iter().all(|q| !q.record.cancelled));
}

#[tokio::test]
async fn list_fetches_every_record_and_its_metadata() {
    let chain = MockChain::new().with_quest(open_quest(1)).with_quest(open_quest(2));
    let store = MockContentStore::new().with_metadata("bafymeta2", &metadata("Second", "Second quest"));
    let node = test_node(chain.clone(), store.clone(), None);

    let quests = node.load_quests().await.into_ready().expect("ready");
    assert_eq!(quests[0].title(), "Quest #1");
    assert_eq!(quests[1].title(), "Second");
    // questCount + one getQuest per id
    assert_eq!(chain.calls(), 3);
    assert_eq!(store.fetches(), 2);
}

#[tokio::test]
async fn one_failing_record_fails_the_listing() {
    let chain = MockChain::new().with_quest(open_quest(1)).with_quest(open_quest(2));
    chain.fail_quest(2);
    let node = test_node(chain, MockContentStore::new(), None);

    assert!(matches!(node.load_quests().await, LoadState::Failed(_)));
}

#[tokio::test]
async fn zero_based_indexing_skips_the_empty_slot() {
    let chain = MockChain::new().with_quest(open_quest(1));
    chain.set_count(2);
    let node = test_node(chain.clone(), MockContentStore::new(), None)
        .with_indexing(QuestIndexing::ZeroBased);

    let quests = node.load_quests().await.into_ready().expect("ready");
    assert_eq!(quests.iter().map(|q| q.id()).collect::<Vec<_>>(), vec![1]);
    assert_eq!(chain.calls(), 3);
}

#[tokio::test]
async fn empty_board_lists_nothing() {
    let chain = MockChain::new();
    let node = test_node(chain.clone(), MockContentStore::new(), None);
    assert_eq!(node.load_quests().await, LoadState::Ready(vec![]));
    assert_eq!(chain.calls(), 1);
}

// ---------------------------------------------------------------------------
// Mounting and wallet status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mounted_views_settle() {
    let chain = MockChain::new().with_quest(open_quest(1));
    let node = test_node(chain, MockContentStore::new(), None);

    let mut detail = node.mount_quest(1);
    assert_eq!(detail.settled().await.into_ready().map(|v| v.id()), Some(1));

    let mut list = node.mount_quests();
    assert_eq!(list.settled().await.into_ready().map(|v| v.len()), Some(1));

    let mut invalid = node.mount_quest(0);
    assert!(matches!(invalid.settled().await, LoadState::Invalid(_)));
}

#[tokio::test]
async fn unmounted_view_is_dropped_quietly() {
    let chain = MockChain::new().with_quest(open_quest(1));
    let node = test_node(chain.clone(), MockContentStore::new(), None);

    drop(node.mount_quest(1));
    // The loader still runs to completion; its result goes nowhere.
    tokio::task::yield_now().await;
    let mut again = node.mount_quest(1);
    assert!(again.settled().await.ready().is_some());
}

#[tokio::test]
async fn wallet_status_reflects_the_capability() {
    let read_only = test_node(MockChain::new(), MockContentStore::new(), None);
    let status = read_only.wallet_status();
    assert!(!status.connected);
    assert_eq!(status.network, Network::BaseSepolia);
    assert_eq!(status.chain_id, 84532);

    let node = test_node(
        MockChain::new(),
        MockContentStore::new(),
        Some(MockWallet::new(CREATOR)),
    );
    let status = node.wallet_status();
    assert!(status.connected);
    assert_eq!(status.address.as_deref(), Some(CREATOR));
}
