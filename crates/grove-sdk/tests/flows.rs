use std::str::FromStr;

use grove_sdk::contract::decode_call;
use grove_sdk::ethers::types::{Address, U256};
use grove_sdk::testing::{
    CREATOR, MockChain, MockContentStore, MockWallet, RecordingComposer, STRANGER, TEST_CONTRACT,
    TEST_NOW, ended_quest, metadata, open_quest, test_node,
};
use grove_sdk::{
    CreateQuestForm, DRY_RUN_CID, Error, FormError, QuestCall, QuestNode, QuestStatus, QuestView,
    SubmissionForm, format_eth,
};

type TestNode = QuestNode<MockChain, MockContentStore, MockWallet>;

fn node_with(wallet: &MockWallet, store: &MockContentStore) -> TestNode {
    test_node(MockChain::new(), store.clone(), Some(wallet.clone()))
}

fn view(record: grove_sdk::QuestRecord) -> QuestView {
    QuestView {
        record,
        metadata: Some(metadata("Design a logo", "Something green")),
    }
}

fn create_form() -> CreateQuestForm {
    CreateQuestForm {
        title: "  Design a logo ".into(),
        description: "Something green and leafy".into(),
        prize: "0.12345".into(),
        deadline: (TEST_NOW + 7 * 86_400).to_string(),
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_pins_then_sends_funded_call() {
    let wallet = MockWallet::new(CREATOR);
    let store = MockContentStore::new();
    let composer = RecordingComposer::default();
    let node = node_with(&wallet, &store).with_composer(composer.clone());

    let done = node.create_quest(&create_form()).await.unwrap();
    assert_eq!(done.cid.as_deref(), Some("bafypinned0"));
    assert_eq!(done.share_link.as_deref(), Some("share://1"));
    assert!(done.tx_hash.starts_with("0x"));

    assert_eq!(
        store.pinned(),
        vec![serde_json::json!({"title": "Design a logo", "description": "Something green and leafy"})]
    );

    let sent = wallet.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, Address::from_str(TEST_CONTRACT).unwrap());
    let value = sent[0].value.expect("funded");
    assert_eq!(format_eth(value), "0.12345");
    assert_eq!(
        decode_call(&sent[0].data).unwrap(),
        QuestCall::CreateQuest {
            cid: "bafypinned0".into(),
            deadline: TEST_NOW + 7 * 86_400,
        }
    );

    let casts = composer.casts();
    assert_eq!(casts.len(), 1);
    assert!(casts[0].text.contains("Design a logo"));
    assert!(casts[0].text.contains("0.12345 ETH"));
    assert!(!node.is_busy());
}

#[tokio::test]
async fn invalid_form_never_touches_the_network() {
    let wallet = MockWallet::new(CREATOR);
    let store = MockContentStore::new();
    let node = node_with(&wallet, &store);

    let mut form = create_form();
    form.deadline = (TEST_NOW + 30).to_string();
    match node.create_quest(&form).await {
        Err(Error::Validation(errors)) => assert_eq!(errors, vec![FormError::DeadlineTooSoon]),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(store.pinned().is_empty());
    assert!(wallet.sent().is_empty());
}

#[tokio::test]
async fn create_without_wallet_fails_before_pinning() {
    let store = MockContentStore::new();
    let node = test_node(MockChain::new(), store.clone(), None);

    assert!(matches!(
        node.create_quest(&create_form()).await,
        Err(Error::NoWallet)
    ));
    assert!(store.pinned().is_empty());
}

#[tokio::test]
async fn pin_failure_aborts_and_releases_busy() {
    let wallet = MockWallet::new(CREATOR);
    let store = MockContentStore::new();
    store.fail_pins("pinning is not configured");
    let node = node_with(&wallet, &store);

    match node.create_quest(&create_form()).await {
        Err(Error::Pin(msg)) => assert_eq!(msg, "pinning is not configured"),
        other => panic!("expected pin error, got {other:?}"),
    }
    assert!(wallet.sent().is_empty());
    assert!(!node.is_busy());
}

#[tokio::test]
async fn wallet_rejection_is_reported_and_not_retried() {
    let wallet = MockWallet::new(CREATOR);
    wallet.reject_with("user rejected the request");
    let store = MockContentStore::new();
    let composer = RecordingComposer::default();
    let node = node_with(&wallet, &store).with_composer(composer.clone());

    assert!(matches!(
        node.create_quest(&create_form()).await,
        Err(Error::Wallet(_))
    ));
    assert_eq!(wallet.sent().len(), 1);
    assert!(composer.casts().is_empty());
    assert!(!node.is_busy());

    // The flow is usable again straight away.
    assert!(node.preview_create(&create_form()).is_ok());
}

#[tokio::test]
async fn dry_run_encodes_a_placeholder_without_pinning() {
    let wallet = MockWallet::new(CREATOR);
    let store = MockContentStore::new();
    let node = node_with(&wallet, &store);

    let preview = node.preview_create(&create_form()).unwrap();
    assert_eq!(preview.request.value, Some(U256::from(123_450_000_000_000_000u64)));
    match decode_call(&preview.request.data).unwrap() {
        QuestCall::CreateQuest { cid, .. } => assert_eq!(cid, DRY_RUN_CID),
        other => panic!("unexpected call {other:?}"),
    }
    assert!(store.pinned().is_empty());
    assert!(wallet.sent().is_empty());
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn submission_counts_down_then_clears_the_form() {
    let wallet = MockWallet::new(STRANGER);
    let store = MockContentStore::new();
    let node = node_with(&wallet, &store);
    let quest = view(open_quest(5));

    let mut form = SubmissionForm::new(" https://example.org/my-logo.png ");
    let mut ticks = Vec::new();
    let done = node
        .submit_entry(&quest, &mut form, |remaining| ticks.push(remaining))
        .await
        .unwrap();

    assert_eq!(ticks, vec![3, 2, 1]);
    assert_eq!(form.link, "");
    assert_eq!(done.share_link, None);
    assert_eq!(
        store.pinned(),
        vec![serde_json::json!({"link": "https://example.org/my-logo.png"})]
    );
    let sent = wallet.sent();
    assert_eq!(sent[0].value, None);
    assert_eq!(
        decode_call(&sent[0].data).unwrap(),
        QuestCall::Submit {
            id: 5,
            cid: "bafypinned0".into(),
        }
    );
}

#[tokio::test]
async fn submission_is_refused_once_the_quest_closes() {
    let wallet = MockWallet::new(STRANGER);
    let store = MockContentStore::new();
    let node = node_with(&wallet, &store);

    let mut finalized = open_quest(1);
    finalized.finalized = true;
    let mut cancelled = open_quest(2);
    cancelled.cancelled = true;

    for (record, status) in [
        (ended_quest(3), QuestStatus::Ended),
        (finalized, QuestStatus::Finalized),
        (cancelled, QuestStatus::Cancelled),
    ] {
        let mut form = SubmissionForm::new("https://example.org/entry");
        let result = node.submit_entry(&view(record), &mut form, |_| {}).await;
        assert!(matches!(result, Err(Error::NotAllowed(s)) if s == status));
        assert_eq!(form.link, "https://example.org/entry");
    }
    assert!(store.pinned().is_empty());
    assert!(wallet.sent().is_empty());
}

#[tokio::test]
async fn blank_link_is_a_validation_error() {
    let wallet = MockWallet::new(STRANGER);
    let node = node_with(&wallet, &MockContentStore::new());

    let mut form = SubmissionForm::new("   ");
    assert!(matches!(
        node.submit_entry(&view(open_quest(1)), &mut form, |_| {}).await,
        Err(Error::Validation(errors)) if errors == vec![FormError::EmptyLink]
    ));
    assert!(wallet.sent().is_empty());
}

#[tokio::test]
async fn failed_submission_keeps_the_input() {
    let wallet = MockWallet::new(STRANGER);
    wallet.reject_with("insufficient funds");
    let node = node_with(&wallet, &MockContentStore::new());

    let mut form = SubmissionForm::new("https://example.org/entry");
    let mut ticked = false;
    let result = node
        .submit_entry(&view(open_quest(1)), &mut form, |_| ticked = true)
        .await;
    assert!(result.is_err());
    assert!(!ticked);
    assert_eq!(form.link, "https://example.org/entry");
    assert!(!node.is_busy());
}

// ---------------------------------------------------------------------------
// Winners
// ---------------------------------------------------------------------------

const WINNER_A: &str = "0x000000000000000000000000000000000000aaaa";
const WINNER_B: &str = "0x000000000000000000000000000000000000bbbb";

#[tokio::test]
async fn creator_selects_winners_after_the_deadline() {
    let wallet = MockWallet::new(CREATOR);
    let composer = RecordingComposer::default();
    let node = node_with(&wallet, &MockContentStore::new()).with_composer(composer.clone());

    let input = format!(" {WINNER_A} , ,{WINNER_B},");
    let done = node.select_winners(&view(ended_quest(7)), &input).await.unwrap();
    assert_eq!(done.cid, None);
    assert_eq!(done.share_link.as_deref(), Some("share://1"));

    let sent = wallet.sent();
    assert_eq!(
        decode_call(&sent[0].data).unwrap(),
        QuestCall::SelectWinners {
            id: 7,
            winners: vec![WINNER_A.to_string(), WINNER_B.to_string()],
        }
    );
    let casts = composer.casts();
    assert!(casts[0].text.contains("2 winners"));
    assert_eq!(casts[0].embeds, vec!["https://grove.test/quest/7".to_string()]);
}

#[tokio::test]
async fn non_creator_cannot_select_winners() {
    let wallet = MockWallet::new(STRANGER);
    let node = node_with(&wallet, &MockContentStore::new());

    assert!(!node.can_select_winners(&ended_quest(1)));
    assert!(matches!(
        node.select_winners(&view(ended_quest(1)), WINNER_A).await,
        Err(Error::NotCreator)
    ));
    assert!(wallet.sent().is_empty());
}

#[tokio::test]
async fn winner_selection_waits_for_the_deadline_and_stops_at_finalization() {
    let wallet = MockWallet::new(CREATOR);
    let node = node_with(&wallet, &MockContentStore::new());

    assert!(!node.can_select_winners(&open_quest(1)));
    assert!(matches!(
        node.select_winners(&view(open_quest(1)), WINNER_A).await,
        Err(Error::NotAllowed(QuestStatus::Open))
    ));

    let mut finalized = ended_quest(2);
    finalized.finalized = true;
    assert!(!node.can_select_winners(&finalized));
    assert!(matches!(
        node.select_winners(&view(finalized), WINNER_A).await,
        Err(Error::NotAllowed(QuestStatus::Finalized))
    ));
    assert!(wallet.sent().is_empty());
}

#[tokio::test]
async fn malformed_winner_fails_at_encoding() {
    let wallet = MockWallet::new(CREATOR);
    let node = node_with(&wallet, &MockContentStore::new());

    match node.select_winners(&view(ended_quest(1)), &format!("{WINNER_A}, alice.eth")).await {
        Err(Error::InvalidAddress(addr)) => assert_eq!(addr, "alice.eth"),
        other => panic!("expected invalid address, got {other:?}"),
    }
    assert!(wallet.sent().is_empty());

    assert!(matches!(
        node.select_winners(&view(ended_quest(1)), " , ").await,
        Err(Error::Validation(errors)) if errors == vec![FormError::NoWinners]
    ));
}

#[tokio::test]
async fn winner_control_is_never_shown_to_other_wallets() {
    let mut cancelled = ended_quest(3);
    cancelled.cancelled = true;
    let mut finalized = ended_quest(4);
    finalized.finalized = true;
    let records = [open_quest(1), ended_quest(2), cancelled, finalized];

    let stranger = node_with(&MockWallet::new(STRANGER), &MockContentStore::new());
    let read_only = test_node(MockChain::new(), MockContentStore::new(), None);
    for record in &records {
        assert!(!stranger.can_select_winners(record));
        assert!(!read_only.can_select_winners(record));
    }

    let creator = node_with(&MockWallet::new(CREATOR), &MockContentStore::new());
    assert!(creator.can_select_winners(&ended_quest(2)));
    assert!(!creator.can_select_winners(&records[2]));
    assert!(!creator.can_select_winners(&records[3]));
}

#[tokio::test]
async fn creator_cannot_pick_winners_for_a_cancelled_quest() {
    let wallet = MockWallet::new(CREATOR);
    let node = node_with(&wallet, &MockContentStore::new());
    let mut cancelled = ended_quest(5);
    cancelled.cancelled = true;

    assert!(matches!(
        node.select_winners(&view(cancelled.clone()), STRANGER).await,
        Err(Error::NotAllowed(QuestStatus::Cancelled))
    ));
    assert!(matches!(
        node.preview_winners(&cancelled, CREATOR, STRANGER),
        Err(Error::NotAllowed(QuestStatus::Cancelled))
    ));
    assert!(wallet.sent().is_empty());
    assert!(!node.is_busy());
}
