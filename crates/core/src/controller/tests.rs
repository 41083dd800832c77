use std::sync::{Arc, Mutex};
use std::time::Duration;

use jdbias_service::AnalysisReply;
use jdbias_test_service::{PresetFailure, PresetReply, TestAnalysisService};
use tokio::sync::watch;
use tokio::time::timeout;

use crate::input::KeyInput;
use crate::scroll::{ScrollAnchor, ScrollBehavior};
use crate::transcript::{Message, Role};
use crate::{ChatController, ChatControllerBuilder, Snapshot};

const GREETING: &str = "Hello! Paste a job description.";

fn controller(service: &TestAnalysisService) -> ChatController {
    ChatControllerBuilder::with_service(service.clone())
        .with_greeting(GREETING)
        .build()
}

async fn wait_until(
    rx: &mut watch::Receiver<Snapshot>,
    f: impl FnMut(&Snapshot) -> bool,
) -> Snapshot {
    timeout(Duration::from_millis(500), rx.wait_for(f))
        .await
        .expect("timed out waiting for the controller")
        .expect("controller has stopped")
        .clone()
}

async fn settled(rx: &mut watch::Receiver<Snapshot>, len: usize) -> Snapshot {
    wait_until(rx, |s| !s.is_sending && s.transcript.len() == len).await
}

#[tokio::test]
async fn test_initial_state() {
    let service = TestAnalysisService::default();
    let controller = controller(&service);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.transcript, [Message::assistant(GREETING)]);
    assert_eq!(snapshot.conversation_id, None);
    assert!(!snapshot.is_sending);
    assert!(snapshot.input_enabled);
    assert!(!snapshot.can_submit);
    assert_eq!(snapshot.input_height, 1);
}

#[tokio::test]
async fn test_first_analysis() {
    let service = TestAnalysisService::default();
    service.add_reply("c1", "Detected masculine-coded language...");
    let controller = controller(&service);
    let mut rx = controller.subscribe();

    controller
        .submit_text("Software engineer wanted, he must be aggressive")
        .unwrap();
    let snapshot = settled(&mut rx, 3).await;

    assert_eq!(
        snapshot.transcript,
        [
            Message::assistant(GREETING),
            Message::user("Software engineer wanted, he must be aggressive"),
            Message::assistant("Detected masculine-coded language..."),
        ]
    );
    assert_eq!(snapshot.conversation_id.as_deref(), Some("c1"));
    assert_eq!(snapshot.last_error, None);
    assert_eq!(service.dispatched()[0].conversation_id, None);
}

#[tokio::test]
async fn test_continued_conversation() {
    let service = TestAnalysisService::default();
    service.add_reply("c1", "Detected masculine-coded language...");
    service.add_reply("c1", "Here is a more inclusive version.");
    let controller = controller(&service);
    let mut rx = controller.subscribe();

    controller
        .submit_text("Software engineer wanted, he must be aggressive")
        .unwrap();
    settled(&mut rx, 3).await;
    controller.submit_text("Rewrite it").unwrap();
    let snapshot = settled(&mut rx, 5).await;

    let dispatched = service.dispatched();
    assert_eq!(dispatched[1].message, "Rewrite it");
    assert_eq!(dispatched[1].conversation_id.as_deref(), Some("c1"));
    assert_eq!(snapshot.conversation_id.as_deref(), Some("c1"));
    assert_eq!(snapshot.transcript.len(), 5);
}

#[tokio::test]
async fn test_conversation_id_is_set_once() {
    let service = TestAnalysisService::default();
    service.add_reply("c1", "first");
    service.add_reply("c2", "second");
    service.add_reply("", "third");
    let controller = controller(&service);
    let mut rx = controller.subscribe();

    for (i, text) in ["one", "two", "three"].into_iter().enumerate() {
        controller.submit_text(text).unwrap();
        let snapshot = settled(&mut rx, 3 + 2 * i).await;
        assert_eq!(snapshot.conversation_id.as_deref(), Some("c1"));
    }

    let sent: Vec<_> = service
        .dispatched()
        .into_iter()
        .map(|req| req.conversation_id)
        .collect();
    assert_eq!(sent, [None, Some("c1".to_owned()), Some("c1".to_owned())]);
}

#[tokio::test]
async fn test_transcript_interleaves_in_submission_order() {
    let service = TestAnalysisService::default();
    let controller = controller(&service);
    let mut rx = controller.subscribe();

    for i in 0..4 {
        service.add_reply("c1", format!("reply {i}"));
        controller.submit_text(format!("  draft {i}\n")).unwrap();
        settled(&mut rx, 3 + 2 * i).await;
    }

    let snapshot = controller.current().await.unwrap();
    assert_eq!(snapshot.transcript[0], Message::assistant(GREETING));
    for (i, pair) in snapshot.transcript[1..].chunks(2).enumerate() {
        assert_eq!(pair[0], Message::user(format!("draft {i}")));
        assert_eq!(pair[1], Message::assistant(format!("reply {i}")));
    }
}

#[tokio::test]
async fn test_blank_submission_is_rejected() {
    let service = TestAnalysisService::default();
    let controller = controller(&service);

    controller.submit_text("   ").unwrap();
    controller.submit_text("").unwrap();
    controller.set_draft("\n\t").unwrap();
    controller.submit().unwrap();
    controller.press_key(KeyInput::Enter { shift: false }).unwrap();

    let snapshot = controller.current().await.unwrap();
    assert_eq!(snapshot.transcript.len(), 1);
    assert!(!snapshot.is_sending);
    assert!(!snapshot.can_submit);
    assert!(service.dispatched().is_empty());
}

#[tokio::test]
async fn test_failure_keeps_user_message() {
    let service = TestAnalysisService::default();
    service.add_failure(PresetFailure::Transport);
    let controller = controller(&service);
    let mut rx = controller.subscribe();

    controller.submit_text("Analyze this").unwrap();
    let snapshot =
        wait_until(&mut rx, |s| !s.is_sending && s.last_error.is_some()).await;

    assert_eq!(
        snapshot.transcript,
        [Message::assistant(GREETING), Message::user("Analyze this")]
    );
    assert_eq!(
        snapshot.last_error.as_deref(),
        Some(
            "Failed to send message. \
             Please check your connection and try again."
        )
    );
    assert!(snapshot.input_enabled);
    assert_eq!(snapshot.conversation_id, None);
}

#[tokio::test]
async fn test_error_cleared_on_next_attempt() {
    let service = TestAnalysisService::default();
    service.add_failure(PresetFailure::Server);
    service.add_reply("c1", "Looks neutral.");
    service.set_delay(Duration::from_millis(100));
    let controller = ChatControllerBuilder::with_service(service.clone())
        .with_failure_message("Something went wrong.")
        .build();
    let mut rx = controller.subscribe();

    controller.submit_text("Analyze this").unwrap();
    let snapshot =
        wait_until(&mut rx, |s| !s.is_sending && s.last_error.is_some()).await;
    assert_eq!(snapshot.last_error.as_deref(), Some("Something went wrong."));

    controller.submit_text("Try again").unwrap();
    let snapshot = wait_until(&mut rx, |s| s.is_sending).await;
    assert_eq!(snapshot.last_error, None);

    let snapshot = settled(&mut rx, 4).await;
    assert_eq!(snapshot.last_error, None);
    assert_eq!(
        snapshot.transcript[1..],
        [
            Message::user("Analyze this"),
            Message::user("Try again"),
            Message::assistant("Looks neutral."),
        ]
    );
}

#[tokio::test]
async fn test_single_flight() {
    let service = TestAnalysisService::default();
    service.add_reply("c1", "first reply");
    service.add_reply("c1", "never used");
    service.set_delay(Duration::from_millis(100));
    let controller = controller(&service);
    let mut rx = controller.subscribe();

    controller.submit_text("First").unwrap();
    controller.submit_text("Second").unwrap();

    let in_flight = controller.current().await.unwrap();
    assert!(in_flight.is_sending);
    assert!(!in_flight.input_enabled);
    assert_eq!(in_flight.draft, "");
    assert_eq!(in_flight.transcript.last(), Some(&Message::user("First")));

    controller.set_draft("typing ahead").unwrap();
    controller.press_key(KeyInput::Char('x')).unwrap();
    controller.submit().unwrap();
    let still_in_flight = controller.current().await.unwrap();
    assert_eq!(still_in_flight, in_flight);

    let snapshot = settled(&mut rx, 3).await;
    assert_eq!(
        snapshot.transcript[1..],
        [Message::user("First"), Message::assistant("first reply")]
    );
    assert_eq!(service.dispatched().len(), 1);
    assert_eq!(service.remaining(), 1);
}

#[tokio::test]
async fn test_user_message_appended_before_reply() {
    let service = TestAnalysisService::default();
    service.add_reply("c1", "done");
    service.set_delay(Duration::from_millis(100));
    let controller = controller(&service);
    let mut rx = controller.subscribe();

    controller.set_draft("  Needs a strong leader  ").unwrap();
    controller.press_key(KeyInput::Enter { shift: false }).unwrap();

    let snapshot = wait_until(&mut rx, |s| s.is_sending).await;
    assert_eq!(snapshot.transcript.len(), 2);
    assert_eq!(snapshot.transcript[1].role(), Role::User);
    assert_eq!(snapshot.transcript[1].content(), "Needs a strong leader");
    assert_eq!(snapshot.draft, "");

    let snapshot = settled(&mut rx, 3).await;
    assert_eq!(snapshot.transcript[2].role(), Role::Assistant);
}

#[tokio::test]
async fn test_typing_and_shift_enter() {
    let service = TestAnalysisService::default();
    service.add_reply("c1", "ok");
    let controller = controller(&service);
    let mut rx = controller.subscribe();

    for key in [
        KeyInput::Char('h'),
        KeyInput::Char('i'),
        KeyInput::Enter { shift: true },
        KeyInput::Paste("there".to_owned()),
    ] {
        controller.press_key(key).unwrap();
    }
    let snapshot = controller.current().await.unwrap();
    assert_eq!(snapshot.draft, "hi\nthere");
    assert_eq!(snapshot.input_height, 2);
    assert!(snapshot.can_submit);
    assert!(service.dispatched().is_empty());

    controller.press_key(KeyInput::Enter { shift: false }).unwrap();
    let snapshot = settled(&mut rx, 3).await;
    assert_eq!(snapshot.transcript[1], Message::user("hi\nthere"));
    assert_eq!(snapshot.input_height, 1);
}

#[tokio::test]
async fn test_clarification_flag() {
    let service = TestAnalysisService::default();
    service.add_preset(PresetReply::Reply(
        AnalysisReply::new("c1", "Which role is this for?")
            .with_clarification(true),
    ));
    service.add_reply("c1", "Thanks, here is the analysis.");
    let controller = controller(&service);
    let mut rx = controller.subscribe();

    controller.submit_text("We need a ninja").unwrap();
    let snapshot = settled(&mut rx, 3).await;
    assert!(snapshot.awaiting_clarification);

    controller.submit_text("Backend developer").unwrap();
    let snapshot = settled(&mut rx, 5).await;
    assert!(!snapshot.awaiting_clarification);
}

#[derive(Default)]
struct RecordingAnchor(Mutex<Vec<usize>>);

impl ScrollAnchor for RecordingAnchor {
    fn scroll_into_view(&self, index: usize, behavior: ScrollBehavior) {
        assert_eq!(behavior, ScrollBehavior::Smooth);
        self.0.lock().unwrap().push(index);
    }
}

#[tokio::test]
async fn test_scrolls_after_each_append() {
    let service = TestAnalysisService::default();
    service.add_reply("c1", "ok");
    service.add_failure(PresetFailure::InvalidReply);
    let anchor = Arc::new(RecordingAnchor::default());
    let controller = ChatControllerBuilder::with_service(service.clone())
        .with_scroll_anchor(Arc::clone(&anchor))
        .build();
    let mut rx = controller.subscribe();

    controller.submit_text("one").unwrap();
    settled(&mut rx, 3).await;
    controller.submit_text("two").unwrap();
    wait_until(&mut rx, |s| !s.is_sending && s.last_error.is_some()).await;

    assert_eq!(*anchor.0.lock().unwrap(), [1, 2, 3]);
}

#[tokio::test]
async fn test_shutdown() {
    let service = TestAnalysisService::default();
    service.add_reply("c1", "never delivered");
    service.set_delay(Duration::from_millis(50));
    let controller = controller(&service);

    controller.submit_text("Analyze this").unwrap();
    assert!(controller.current().await.unwrap().is_sending);

    controller.shutdown();
    let mut rx = controller.subscribe();
    timeout(Duration::from_millis(500), async {
        while rx.changed().await.is_ok() {}
    })
    .await
    .unwrap();
    assert!(controller.current().await.is_err());
}
