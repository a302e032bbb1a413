//! Behavioural tests of the conversation engine: lifecycle, turn
//! accounting, failure handling, concurrency and event fan-out.

mod support;

use roundtable_application::{
    BroadcastSettings, ConversationError, CreateConversation, ErrorKind, EventBroadcaster,
    LoopExit, TurnOutcome,
};
use roundtable_domain::{ConversationEvent, ConversationStatus, Message};
use std::sync::atomic::Ordering;
use std::time::Duration;
use support::{
    Reply, ScriptedGateway, chunks, fast_settings, harness, harness_with_broadcaster, ids, text,
};

fn request(participants: &[&str], turn_limit: i64) -> CreateConversation {
    CreateConversation::new("Is mathematics discovered or invented?", ids(participants))
        .with_turn_limit(turn_limit)
}

fn spoken(messages: &[Message]) -> Vec<&Message> {
    messages.iter().filter(|m| !m.is_system()).collect()
}

fn system_contents(messages: &[Message]) -> Vec<&str> {
    messages
        .iter()
        .filter(|m| m.is_system())
        .map(|m| m.content.as_str())
        .collect()
}

// ==================== create ====================

#[tokio::test]
async fn test_create_rejects_empty_roster() {
    let h = harness(ScriptedGateway::default(), fast_settings());
    let err = h.registry.create(request(&[], 3)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(h.registry.list().is_empty());
}

#[tokio::test]
async fn test_create_rejects_unknown_and_inactive_participants() {
    let h = harness(ScriptedGateway::default(), fast_settings());
    for roster in [&["ada", "nobody"][..], &["ada", "zed"][..]] {
        let err = h.registry.create(request(roster, 3)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput, "roster {:?}", roster);
    }
    assert!(h.registry.list().is_empty());
}

#[tokio::test]
async fn test_create_rejects_blank_topic() {
    let h = harness(ScriptedGateway::default(), fast_settings());
    let err = h
        .registry
        .create(CreateConversation::new("   ", ids(&["ada"])))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_create_is_idle_and_listed() {
    let h = harness(ScriptedGateway::default(), fast_settings());
    let conversation = h
        .registry
        .create(request(&["ada", "bob"], 3).with_title("Foundations"))
        .await
        .unwrap();

    assert_eq!(conversation.status(), ConversationStatus::Idle);
    assert_eq!(conversation.current_turn(), 0);
    assert!(conversation.messages().is_empty());
    assert_eq!(conversation.title(), Some("Foundations"));

    let listed = h.registry.list();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), conversation.id());
}

#[tokio::test]
async fn test_unknown_conversation_is_not_found() {
    let h = harness(ScriptedGateway::default(), fast_settings());
    assert_eq!(
        h.registry.start("missing").await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        h.registry.continue_conversation("missing").await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        h.registry.stop("missing").await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert!(h.registry.end("missing").await.is_none());
    assert!(!h.registry.delete("missing").await.unwrap());
}

// ==================== autonomous loop ====================

#[tokio::test]
async fn test_autonomous_run_stops_at_turn_limit() {
    let h = harness(ScriptedGateway::default(), fast_settings());
    let id = h.registry.create(request(&["ada", "bob"], 3)).await.unwrap().id().to_string();
    let orchestrator = h.registry.orchestrator(&id).unwrap();

    h.registry.start(&id).await.unwrap();
    assert_eq!(orchestrator.wait_for_loop().await, Some(LoopExit::LimitReached));

    let finished = orchestrator.snapshot();
    assert_eq!(finished.status(), ConversationStatus::Ended);
    assert_eq!(finished.current_turn(), 3);
    assert!(finished.ended_at().is_some());

    let turns = spoken(finished.messages());
    let speakers: Vec<_> = turns
        .iter()
        .map(|m| m.participant_id.as_deref().unwrap())
        .collect();
    assert_eq!(speakers, vec!["ada", "bob", "ada"]);
    let numbers: Vec<_> = turns.iter().map(|m| m.turn_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);

    let notices = system_contents(finished.messages());
    assert_eq!(notices.first().copied(), Some("Conversation started. Topic: Is mathematics discovered or invented?"));
    assert_eq!(notices.last().copied(), Some("Conversation ended."));

    assert!(h.registry.get(&id).is_none());
    assert_eq!(h.memory.count(&id), 3);
}

#[tokio::test]
async fn test_turn_limit_of_one_ends_after_first_message() {
    let h = harness(ScriptedGateway::default(), fast_settings());
    let id = h.registry.create(request(&["ada", "bob"], 1)).await.unwrap().id().to_string();

    let snapshot = h.registry.start(&id).await.unwrap();
    assert_eq!(snapshot.status(), ConversationStatus::Ended);
    assert_eq!(snapshot.current_turn(), 1);
    assert!(h.registry.get(&id).is_none());
}

#[tokio::test]
async fn test_loop_failure_moves_to_error() {
    let gateway = ScriptedGateway::new(vec![
        text("first"),
        text("second"),
        Reply::Fail("backend exploded".to_string()),
    ]);
    let h = harness(gateway, fast_settings());
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();
    let orchestrator = h.registry.orchestrator(&id).unwrap();

    h.registry.start(&id).await.unwrap();
    assert_eq!(orchestrator.wait_for_loop().await, Some(LoopExit::Failed));

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.status(), ConversationStatus::Error);
    assert_eq!(snapshot.current_turn(), 2);
    let failures: Vec<_> = system_contents(snapshot.messages())
        .into_iter()
        .filter(|c| c.contains("backend exploded"))
        .collect();
    assert_eq!(failures.len(), 1);
}

#[tokio::test]
async fn test_stop_interrupts_the_pause_between_turns() {
    let settings = fast_settings().with_turn_interval(Duration::from_secs(3600));
    let h = harness(ScriptedGateway::default(), settings);
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();
    let orchestrator = h.registry.orchestrator(&id).unwrap();

    h.registry.start(&id).await.unwrap();
    let stopped = h.registry.stop(&id).await.unwrap();
    assert_eq!(stopped.status(), ConversationStatus::Stopped);
    assert_eq!(
        system_contents(stopped.messages()).last().copied(),
        Some("Conversation stopped.")
    );

    let exit = tokio::time::timeout(Duration::from_secs(5), orchestrator.wait_for_loop())
        .await
        .unwrap();
    assert_eq!(exit, Some(LoopExit::Stopped));
    assert_eq!(orchestrator.snapshot().current_turn(), 1);
}

// ==================== manual turns ====================

#[tokio::test]
async fn test_unlimited_manual_conversation_never_self_ends() {
    let h = harness(ScriptedGateway::default(), fast_settings().manual());
    let id = h.registry.create(request(&["ada", "bob", "cy"], 0)).await.unwrap().id().to_string();

    h.registry.start(&id).await.unwrap();
    for _ in 0..5 {
        assert!(h.registry.continue_conversation(&id).await.unwrap());
    }

    let snapshot = h.registry.get(&id).unwrap();
    assert_eq!(snapshot.status(), ConversationStatus::Active);
    assert_eq!(snapshot.current_turn(), 6);
    let speakers: Vec<_> = spoken(snapshot.messages())
        .iter()
        .map(|m| m.participant_id.clone().unwrap())
        .collect();
    assert_eq!(speakers, ids(&["ada", "bob", "cy", "ada", "bob", "cy"]));
    assert!(h.registry.orchestrator(&id).unwrap().wait_for_loop().await.is_none());
}

#[tokio::test]
async fn test_continue_at_limit_returns_false_and_ends() {
    let h = harness(ScriptedGateway::default(), fast_settings().manual());
    let id = h.registry.create(request(&["ada", "bob"], 2)).await.unwrap().id().to_string();
    let orchestrator = h.registry.orchestrator(&id).unwrap();

    h.registry.start(&id).await.unwrap();
    assert!(h.registry.continue_conversation(&id).await.unwrap());
    assert!(!h.registry.continue_conversation(&id).await.unwrap());

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.status(), ConversationStatus::Ended);
    assert_eq!(snapshot.current_turn(), 2);
    assert!(h.registry.get(&id).is_none());
}

#[tokio::test]
async fn test_continue_rejected_unless_active() {
    let h = harness(ScriptedGateway::default(), fast_settings().manual());

    // idle
    let idle = h.registry.create(request(&["ada"], 0)).await.unwrap().id().to_string();
    let err = h.registry.continue_conversation(&idle).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert!(h.registry.get(&idle).unwrap().messages().is_empty());

    // stopped
    let stopped = h.registry.create(request(&["ada"], 0)).await.unwrap().id().to_string();
    h.registry.start(&stopped).await.unwrap();
    h.registry.stop(&stopped).await.unwrap();
    let before = h.registry.get(&stopped).unwrap();
    let err = h.registry.continue_conversation(&stopped).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(h.registry.get(&stopped).unwrap(), before);

    // ended: gone from the registry, and its orchestrator refuses turns
    let ended = h.registry.create(request(&["ada"], 0)).await.unwrap().id().to_string();
    let orchestrator = h.registry.orchestrator(&ended).unwrap();
    h.registry.start(&ended).await.unwrap();
    h.registry.end(&ended).await.unwrap();
    let len = orchestrator.snapshot().messages().len();
    assert_eq!(
        orchestrator.run_turn().await.unwrap_err().kind(),
        ErrorKind::InvalidState
    );
    assert_eq!(orchestrator.snapshot().messages().len(), len);
    assert_eq!(
        h.registry.continue_conversation(&ended).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn test_set_turn_limit_applies_to_next_continue() {
    let h = harness(ScriptedGateway::default(), fast_settings().manual());
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();
    h.registry.start(&id).await.unwrap();

    let updated = h.registry.set_turn_limit(&id, 1).await.unwrap();
    assert_eq!(updated.turn_limit(), 1);
    assert!(!h.registry.continue_conversation(&id).await.unwrap());
    assert!(h.registry.get(&id).is_none());
}

#[tokio::test]
async fn test_set_turn_limit_rejected_once_ended() {
    let h = harness(ScriptedGateway::default(), fast_settings().manual());
    let id = h.registry.create(request(&["ada"], 0)).await.unwrap().id().to_string();
    let orchestrator = h.registry.orchestrator(&id).unwrap();
    h.registry.end(&id).await.unwrap();

    let err = orchestrator.set_turn_limit(5).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

// ==================== failures ====================

#[tokio::test]
async fn test_failed_first_message_fails_start() {
    let gateway = ScriptedGateway::new(vec![Reply::Fail("quota exceeded".to_string())]);
    let h = harness(gateway, fast_settings().manual());
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();

    let err = h.registry.start(&id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::GenerationFailed);

    let snapshot = h.registry.get(&id).unwrap();
    assert_eq!(snapshot.status(), ConversationStatus::Error);
    assert_eq!(snapshot.current_turn(), 0);
    let notices = system_contents(snapshot.messages());
    assert_eq!(notices.len(), 2);
    assert!(notices[1].contains("quota exceeded"));

    let err = h.registry.continue_conversation(&id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(h.registry.get(&id).unwrap(), snapshot);
    assert_eq!(h.memory.count(&id), 0);
}

#[tokio::test]
async fn test_stream_error_is_not_partially_applied() {
    let gateway = ScriptedGateway::new(vec![text("fine"), Reply::Fail("cut off".to_string())]);
    let settings = fast_settings().manual().with_streaming(true);
    let h = harness(gateway, settings);
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();
    h.registry.start(&id).await.unwrap();

    let err = h.registry.continue_conversation(&id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::GenerationFailed);
    let snapshot = h.registry.get(&id).unwrap();
    assert_eq!(snapshot.current_turn(), 1);
    assert!(snapshot.messages().iter().all(|m| m.content != "partial"));
    assert_eq!(h.memory.count(&id), 1);
}

#[tokio::test]
async fn test_generation_timeout_is_a_generation_failure() {
    let gateway = ScriptedGateway::new(vec![Reply::Hang]);
    let settings = fast_settings()
        .manual()
        .with_generation_timeout(Duration::from_millis(50));
    let h = harness(gateway, settings);
    let id = h.registry.create(request(&["ada"], 0)).await.unwrap().id().to_string();

    let err = h.registry.start(&id).await.unwrap_err();
    assert!(matches!(err, ConversationError::GenerationFailed(_)));
    assert_eq!(h.registry.get(&id).unwrap().status(), ConversationStatus::Error);
}

#[tokio::test]
async fn test_history_read_failure_is_storage_unavailable() {
    let h = harness(ScriptedGateway::default(), fast_settings().manual());
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();
    h.registry.start(&id).await.unwrap();

    h.memory.fail_reads.store(true, Ordering::SeqCst);
    let err = h.registry.continue_conversation(&id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageUnavailable);

    let snapshot = h.registry.get(&id).unwrap();
    assert_eq!(snapshot.status(), ConversationStatus::Error);
    assert_eq!(snapshot.current_turn(), 1);
}

#[tokio::test]
async fn test_store_failure_does_not_append_the_message() {
    let h = harness(ScriptedGateway::default(), fast_settings().manual());
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();
    h.memory.fail_writes.store(true, Ordering::SeqCst);

    let err = h.registry.start(&id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
    let snapshot = h.registry.get(&id).unwrap();
    assert_eq!(snapshot.current_turn(), 0);
    assert!(spoken(snapshot.messages()).is_empty());
}

// ==================== concurrency ====================

#[tokio::test]
async fn test_concurrent_continues_run_one_at_a_time() {
    let gateway = ScriptedGateway::default().with_delay(Duration::from_millis(20));
    let h = harness(gateway, fast_settings().manual());
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();
    h.registry.start(&id).await.unwrap();

    let (a, b) = tokio::join!(
        h.registry.continue_conversation(&id),
        h.registry.continue_conversation(&id)
    );
    assert!(a.unwrap());
    assert!(b.unwrap());
    assert_eq!(h.gateway.max_in_flight(), 1);

    let snapshot = h.registry.get(&id).unwrap();
    assert_eq!(snapshot.current_turn(), 3);
    let numbers: Vec<_> = spoken(snapshot.messages()).iter().map(|m| m.turn_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(h.memory.count(&id), 3);
}

#[tokio::test]
async fn test_manual_continue_queues_behind_loop_turns() {
    let gateway = ScriptedGateway::default().with_delay(Duration::from_millis(10));
    let h = harness(gateway, fast_settings());
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();
    let orchestrator = h.registry.orchestrator(&id).unwrap();
    h.registry.start(&id).await.unwrap();

    for _ in 0..3 {
        assert!(h.registry.continue_conversation(&id).await.unwrap());
    }
    h.registry.stop(&id).await.unwrap();
    orchestrator.wait_for_loop().await;

    assert_eq!(h.gateway.max_in_flight(), 1);
    let snapshot = orchestrator.snapshot();
    let numbers: Vec<u32> = spoken(snapshot.messages()).iter().map(|m| m.turn_number).collect();
    let expected: Vec<u32> = (1..=snapshot.current_turn()).collect();
    assert_eq!(numbers, expected);
}

#[tokio::test]
async fn test_stop_during_a_turn_keeps_its_message() {
    let gateway = ScriptedGateway::default().with_delay(Duration::from_millis(50));
    let h = harness(gateway, fast_settings().manual());
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();
    h.registry.start(&id).await.unwrap();

    let registry = h.registry.clone();
    let turn_id = id.clone();
    let turn = tokio::spawn(async move { registry.continue_conversation(&turn_id).await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    h.registry.stop(&id).await.unwrap();

    assert!(turn.await.unwrap().unwrap());
    let snapshot = h.registry.get(&id).unwrap();
    assert_eq!(snapshot.status(), ConversationStatus::Stopped);
    assert_eq!(snapshot.current_turn(), 2);
    let last = snapshot.messages().last().unwrap();
    assert_eq!(last.turn_number, 2);
    assert!(!last.is_system());

    let err = h.registry.continue_conversation(&id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_delete_waits_for_turn_in_flight() {
    let gateway = ScriptedGateway::default().with_delay(Duration::from_millis(200));
    let h = harness(gateway, fast_settings().manual());
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();
    h.registry.start(&id).await.unwrap();

    let registry = h.registry.clone();
    let turn_id = id.clone();
    let turn = tokio::spawn(async move { registry.continue_conversation(&turn_id).await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.registry.delete(&id).await.unwrap());

    assert!(turn.await.unwrap().unwrap());
    assert_eq!(h.memory.count(&id), 0);
    assert!(h.registry.get(&id).is_none());
    let err = h.registry.continue_conversation(&id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_turn_queued_behind_delete_is_refused() {
    let gateway = ScriptedGateway::default().with_delay(Duration::from_millis(100));
    let h = harness(gateway, fast_settings().manual());
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();
    let orchestrator = h.registry.orchestrator(&id).unwrap();
    h.registry.start(&id).await.unwrap();

    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.run_turn().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    let deletion = {
        let registry = h.registry.clone();
        let id = id.clone();
        tokio::spawn(async move { registry.delete(&id).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    let queued = orchestrator.run_turn().await;

    assert!(first.await.unwrap().is_ok());
    assert!(deletion.await.unwrap().unwrap());
    assert_eq!(queued.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(h.gateway.requests().len(), 2);
    assert_eq!(h.memory.count(&id), 0);
}

// ==================== events ====================

#[tokio::test]
async fn test_streamed_turn_event_sequence() {
    let gateway = ScriptedGateway::new(vec![chunks(&["Numbers", "", " are", " found."])]);
    let settings = fast_settings().manual().with_streaming(true);
    let h = harness(gateway, settings);
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();
    let mut subscription = h.registry.broadcaster().subscribe_to(&id).await;

    h.registry.start(&id).await.unwrap();

    let mut events = Vec::new();
    while let Some(event) = subscription.try_recv() {
        events.push(event);
    }

    assert!(matches!(
        events[0],
        ConversationEvent::StatusChanged {
            from: ConversationStatus::Idle,
            to: ConversationStatus::Active,
            ..
        }
    ));
    assert!(events[1].message().unwrap().is_system());

    let deltas: Vec<&str> = events
        .iter()
        .filter(|e| matches!(e, ConversationEvent::StreamDelta { .. }))
        .map(|e| e.message().unwrap().content.as_str())
        .collect();
    assert_eq!(deltas, vec!["Numbers", "Numbers are", "Numbers are found."]);
    assert!(deltas.windows(2).all(|w| w[1].len() > w[0].len()));

    let last = events.last().unwrap();
    assert_eq!(last.kind(), "message_appended");
    let message = last.message().unwrap();
    assert!(!message.streaming);
    assert_eq!(message.content, "Numbers are found.");
    assert_eq!(message.turn_number, 1);
}

#[tokio::test]
async fn test_non_streaming_turn_emits_single_message_event() {
    let h = harness(ScriptedGateway::default(), fast_settings().manual());
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();
    h.registry.start(&id).await.unwrap();

    let mut subscription = h.registry.broadcaster().subscribe().await;
    h.registry.continue_conversation(&id).await.unwrap();

    let event = subscription.try_recv().unwrap();
    assert_eq!(event.kind(), "message_appended");
    assert_eq!(event.message().unwrap().turn_number, 2);
    assert!(subscription.try_recv().is_none());
}

#[tokio::test]
async fn test_end_notifies_before_removal() {
    // One slot per subscriber: the notice after `ended` waits until the
    // watcher has looked at the registry.
    let broadcaster = EventBroadcaster::new(BroadcastSettings::default().with_buffer(1));
    let h = harness_with_broadcaster(
        ScriptedGateway::default(),
        fast_settings().manual(),
        broadcaster,
    );
    let id = h.registry.create(request(&["ada"], 0)).await.unwrap().id().to_string();
    h.registry.start(&id).await.unwrap();

    let mut watch = h.registry.broadcaster().subscribe_to(&id).await;
    let watcher = {
        let registry = h.registry.clone();
        let id = id.clone();
        tokio::spawn(async move {
            let mut registered_when_ended = None;
            while let Some(event) = watch.recv().await {
                match &event {
                    ConversationEvent::StatusChanged {
                        from: ConversationStatus::Active,
                        to: ConversationStatus::Ended,
                        ..
                    } => registered_when_ended = Some(registry.get(&id).is_some()),
                    ConversationEvent::MessageAppended { message, .. } => {
                        return (registered_when_ended, message.content.clone());
                    }
                    _ => {}
                }
            }
            (registered_when_ended, String::new())
        })
    };

    let snapshot = h.registry.end(&id).await.unwrap();
    assert_eq!(snapshot.status(), ConversationStatus::Ended);
    let (registered_when_ended, notice) = watcher.await.unwrap();
    assert_eq!(registered_when_ended, Some(true));
    assert_eq!(notice, "Conversation ended.");

    assert!(h.registry.get(&id).is_none());
    assert!(h.registry.end(&id).await.is_none());
}

#[tokio::test]
async fn test_slow_subscribers_do_not_eat_generation_timeout() {
    let broadcaster = EventBroadcaster::new(
        BroadcastSettings::default()
            .with_buffer(1)
            .with_delivery_timeout(Duration::from_millis(200)),
    );
    let gateway = ScriptedGateway::new(vec![text("Opening."), chunks(&["a", "b", "c"])]);
    let settings = fast_settings()
        .manual()
        .with_streaming(true)
        .with_generation_timeout(Duration::from_millis(300));
    let h = harness_with_broadcaster(gateway, settings, broadcaster);
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();
    h.registry.start(&id).await.unwrap();

    // Never read: each stalls one delivery for the full timeout.
    let _first = h.registry.broadcaster().subscribe_to(&id).await;
    let _second = h.registry.broadcaster().subscribe_to(&id).await;

    assert!(h.registry.continue_conversation(&id).await.unwrap());
    let snapshot = h.registry.get(&id).unwrap();
    assert_eq!(snapshot.status(), ConversationStatus::Active);
    assert_eq!(snapshot.messages().last().unwrap().content, "abc");
    assert_eq!(h.memory.count(&id), 2);
}

// ==================== prompt composition ====================

#[tokio::test]
async fn test_prompt_uses_persona_and_recent_participant_messages() {
    let settings = fast_settings().manual().with_context_window(2);
    let h = harness(ScriptedGateway::default(), settings);
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();
    h.registry.start(&id).await.unwrap();
    h.registry.continue_conversation(&id).await.unwrap();
    h.registry.continue_conversation(&id).await.unwrap();

    let requests = h.gateway.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].transcript.is_empty());

    let third = &requests[2];
    assert_eq!(third.speaker, "Ada");
    assert!(third.system_prompt.contains("Is mathematics discovered or invented?"));
    assert!(third.system_prompt.contains("careful mathematician"));
    assert!(third.system_prompt.contains("Ada, Bob"));
    let lines: Vec<_> = third.transcript.iter().map(|l| l.render()).collect();
    assert_eq!(lines, vec!["Ada: reply 1", "Bob: reply 2"]);
}

#[tokio::test]
async fn test_delete_clears_memory() {
    let h = harness(ScriptedGateway::default(), fast_settings().manual());
    let id = h.registry.create(request(&["ada", "bob"], 0)).await.unwrap().id().to_string();
    h.registry.start(&id).await.unwrap();
    assert_eq!(h.memory.count(&id), 1);

    assert!(h.registry.delete(&id).await.unwrap());
    assert_eq!(h.memory.count(&id), 0);
    assert!(h.registry.get(&id).is_none());
    assert!(!h.registry.delete(&id).await.unwrap());
}

#[tokio::test]
async fn test_run_turn_reports_limit_without_generating() {
    let h = harness(ScriptedGateway::default(), fast_settings().manual());
    let id = h.registry.create(request(&["ada"], 1)).await.unwrap().id().to_string();
    let orchestrator = h.registry.orchestrator(&id).unwrap();
    orchestrator.activate().await.unwrap();

    assert_eq!(
        orchestrator.run_turn().await.unwrap(),
        TurnOutcome::Completed { turn: 1 }
    );
    assert_eq!(orchestrator.run_turn().await.unwrap(), TurnOutcome::LimitReached);
    assert_eq!(h.gateway.requests().len(), 1);
}
