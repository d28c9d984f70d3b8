//! Integration tests for simplebus-bridge
//!
//! These tests drive a complete `Bridge` through the public API with the
//! mock bus, the recording notifier and a manual clock, replaying the call
//! scenarios a unit sees on a real SimpleBus line.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test integration_test
//! ```

use std::time::Duration;

use simplebus_bridge::bus::MockBusTransport;
use simplebus_bridge::notify::{Alert, Color, MockNotifier, NotifyEvent};
use simplebus_bridge::protocol::{Message, MessageCode};
use simplebus_bridge::time::{Instant, ManualClock};
use simplebus_bridge::{bus_message, Bridge, BridgeConfig, BridgeError, ScreenOffCallPolicy};

const ME: u8 = 12;
const T0: Instant = Instant::from_secs(10_000);

type TestBridge = Bridge<MockBusTransport, MockNotifier, ManualClock>;

/// Helper to build a bridge for unit 12 with the clock at `T0`
fn create_bridge(config: &BridgeConfig) -> TestBridge {
    Bridge::new(
        config,
        MockBusTransport::new(),
        MockNotifier::new(),
        ManualClock::starting_at(T0),
    )
}

/// Helper: a tap on the button at the current time
async fn tap(bridge: &mut TestBridge) {
    bridge.button_pressed();
    bridge.clock_mut().advance(Duration::from_millis(200));
    bridge.button_released().await.expect("tap transmit failed");
}

/// Helper: put `message` on the bus and let the bridge handle it
async fn deliver(bridge: &mut TestBridge, message: Message) -> Option<Message> {
    bridge.transport_mut().push_message(message);
    bridge.receive().await.expect("receive failed")
}

fn sent(bridge: &TestBridge) -> Vec<Message> {
    bridge.transport().sent_messages().collect()
}

#[tokio::test]
async fn test_same_visitor_within_window_is_let_in() {
    println!("\n=== Test: Reopen Within Window ===");
    let mut bridge = create_bridge(&BridgeConfig::default());

    tap(&mut bridge).await;
    bridge.transport_mut().clear_sent();
    let opened = bridge.state().last_open().expect("tap must record opening");

    // Visitor rings again 59 s later with the screen on
    bridge.clock_mut().set(opened + Duration::from_secs(59));
    let seen = deliver(&mut bridge, bus_message!(CallFromEntryDoorScreenOn @ 12)).await;

    assert_eq!(seen, Some(Message::new(50, ME)));
    assert_eq!(sent(&bridge), vec![bus_message!(OpenDoor @ 12)]);
    assert_eq!(bridge.clock().total_slept(), Duration::from_millis(2500));
    assert_eq!(bridge.notifier().alerts().count(), 0);
    println!("✓ OPEN_DOOR sent after settle delay, no alert");
}

#[tokio::test]
async fn test_call_after_window_alerts() {
    println!("\n=== Test: Alert After Window ===");
    let mut bridge = create_bridge(&BridgeConfig::default());

    tap(&mut bridge).await;
    bridge.transport_mut().clear_sent();
    let opened = bridge.state().last_open().expect("tap must record opening");

    bridge.clock_mut().set(opened + Duration::from_secs(61));
    deliver(&mut bridge, bus_message!(CallFromEntryDoorScreenOn @ 12)).await;

    assert!(sent(&bridge).is_empty());
    assert_eq!(bridge.clock().total_slept(), Duration::ZERO);
    let alerts: Vec<Alert> = bridge.notifier().alerts().copied().collect();
    assert_eq!(alerts, vec![Alert::new(Color::RED, false)]);
    println!("✓ Alert raised, nothing transmitted");
}

#[tokio::test]
async fn test_screen_off_call_within_window_is_quiet() {
    let mut bridge = create_bridge(&BridgeConfig::default());

    tap(&mut bridge).await;
    bridge.transport_mut().clear_sent();
    bridge.clock_mut().advance(Duration::from_secs(30));

    deliver(&mut bridge, bus_message!(CallFromEntryDoor @ 12)).await;
    deliver(&mut bridge, bus_message!(CallToSecondarySwitchboard @ 12)).await;

    assert!(sent(&bridge).is_empty());
    assert_eq!(bridge.notifier().alerts().count(), 0);
}

#[tokio::test]
async fn test_screen_off_call_auto_reopen_policy() {
    let config = BridgeConfig::parse("SCREEN_OFF_CALL=auto-reopen\nSETTLE_DELAY_MS=3000").unwrap();
    assert_eq!(config.screen_off_call, ScreenOffCallPolicy::AutoReopen);
    let mut bridge = create_bridge(&config);

    bridge.remote_command(b"open_door").await.unwrap();
    bridge.transport_mut().clear_sent();
    bridge.clock_mut().advance(Duration::from_secs(10));

    deliver(&mut bridge, bus_message!(CallFromEntryDoor @ 12)).await;

    assert_eq!(sent(&bridge), vec![bus_message!(OpenDoor @ 12)]);
    assert_eq!(bridge.clock().total_slept(), Duration::from_millis(3000));
}

#[tokio::test]
async fn test_silent_mode_suppresses_buzzer_only() {
    println!("\n=== Test: Silent Mode ===");
    let mut bridge = create_bridge(&BridgeConfig::default());

    // Long press: held past one second, polled while down
    bridge.button_pressed();
    bridge.clock_mut().advance(Duration::from_millis(600));
    bridge.button_held().await.unwrap();
    assert!(!bridge.state().is_silent());
    bridge.clock_mut().advance(Duration::from_millis(600));
    bridge.button_held().await.unwrap();
    assert!(bridge.state().is_silent());
    bridge.clock_mut().advance(Duration::from_millis(300));
    bridge.button_released().await.unwrap();

    assert!(bridge.state().is_silent());
    assert!(bridge.transport().sent().is_empty());
    assert_eq!(bridge.notifier().idle_display(), Some(Color::SILENT));

    deliver(&mut bridge, bus_message!(CallFromEntryDoor @ 12)).await;
    let alerts: Vec<Alert> = bridge.notifier().alerts().copied().collect();
    assert_eq!(
        alerts,
        vec![Alert {
            color: Color::RED,
            audible: false,
        }]
    );
    println!("✓ Visual alert only");
}

#[tokio::test]
async fn test_short_press_opens_long_press_toggles() {
    let mut bridge = create_bridge(&BridgeConfig::default());

    // 800 ms: tap
    bridge.button_pressed();
    bridge.clock_mut().advance(Duration::from_millis(400));
    bridge.button_held().await.unwrap();
    bridge.clock_mut().advance(Duration::from_millis(400));
    bridge.button_released().await.unwrap();

    assert_eq!(sent(&bridge), vec![bus_message!(OpenDoor @ 12)]);
    assert_eq!(
        bridge.state().last_open(),
        Some(T0 + Duration::from_millis(800))
    );
    assert!(!bridge.state().is_silent());

    // 1500 ms: toggle exactly once, release does not transmit
    bridge.transport_mut().clear_sent();
    bridge.button_pressed();
    for _ in 0..15 {
        bridge.clock_mut().advance(Duration::from_millis(100));
        bridge.button_held().await.unwrap();
    }
    bridge.button_released().await.unwrap();

    assert!(bridge.state().is_silent());
    assert!(!bridge.state().is_long_press_active());
    assert!(bridge.transport().sent().is_empty());
    let toggles = bridge
        .notifier()
        .events()
        .iter()
        .filter(|e| matches!(e, NotifyEvent::Idle(_)))
        .count();
    assert_eq!(toggles, 1);
}

#[tokio::test]
async fn test_open_door_echo_updates_last_open() {
    let mut bridge = create_bridge(&BridgeConfig::default());

    tap(&mut bridge).await;
    let first = bridge.state().last_open().unwrap();

    // Our own OPEN_DOOR comes back on the half-duplex line, twice
    bridge.clock_mut().advance(Duration::from_millis(50));
    deliver(&mut bridge, bus_message!(OpenDoor @ 12)).await;
    bridge.clock_mut().advance(Duration::from_millis(50));
    deliver(&mut bridge, bus_message!(OpenDoor @ 12)).await;

    assert_eq!(
        bridge.state().last_open(),
        Some(first + Duration::from_millis(100))
    );
    assert_eq!(sent(&bridge).len(), 1);
    assert_eq!(bridge.notifier().alerts().count(), 0);
}

#[tokio::test]
async fn test_corrupt_frame_does_not_desync() {
    println!("\n=== Test: Corrupt Frame ===");
    let mut bridge = create_bridge(&BridgeConfig::default());

    let mut corrupt = bus_message!(CallFromEntryDoor @ 12).encode();
    corrupt[1] ^= 0x01;
    bridge.transport_mut().push_frame(corrupt);
    bridge.transport_mut().push_frame([0x00, 0x00, 0x00]);
    bridge.transport_mut().push_message(bus_message!(CallFromFloorDoor @ 12));

    assert_eq!(bridge.receive().await.unwrap(), None);
    assert_eq!(bridge.receive().await.unwrap(), None);
    assert_eq!(
        bridge.receive().await.unwrap(),
        Some(Message::from_code(MessageCode::CallFromFloorDoor, ME))
    );

    let alerts: Vec<Alert> = bridge.notifier().alerts().copied().collect();
    assert_eq!(alerts, vec![Alert::new(Color::BLUE, false)]);

    // Drained line reads as a timeout
    assert!(matches!(bridge.receive().await, Err(BridgeError::Timeout)));
    println!("✓ Corrupt frames dropped, next frame handled");
}

#[tokio::test]
async fn test_other_units_are_observed_only() {
    let mut bridge = create_bridge(&BridgeConfig::default());

    let foreign = Message::from_code(MessageCode::CallFromEntryDoor, 7);
    assert_eq!(deliver(&mut bridge, foreign).await, Some(foreign));
    let foreign_open = Message::from_code(MessageCode::OpenDoor, 7);
    assert_eq!(deliver(&mut bridge, foreign_open).await, Some(foreign_open));

    assert!(bridge.notifier().events().is_empty());
    assert_eq!(bridge.state().last_open(), None);
}

#[tokio::test]
async fn test_remote_commands() {
    println!("\n=== Test: Remote Commands ===");
    let mut bridge = create_bridge(&BridgeConfig::default());

    let message = bridge.remote_command(b"camera_on").await.unwrap();
    assert_eq!(message, Message::new(20, ME));
    assert_eq!(bridge.state().last_open(), None);

    let message = bridge.remote_command(b" open_door\n").await.unwrap();
    assert_eq!(message, Message::new(16, ME));
    assert_eq!(bridge.state().last_open(), Some(T0));

    let rejected: [&[u8]; 3] = [b"ring_bell", b"", b"   "];
    for payload in rejected {
        let err = bridge.remote_command(payload).await.unwrap_err();
        assert!(err.as_command().is_some());
    }

    assert_eq!(sent(&bridge), vec![Message::new(20, ME), Message::new(16, ME)]);
    println!("✓ Valid commands transmitted, malformed ones rejected");
}

#[cfg(feature = "json")]
#[tokio::test]
async fn test_json_remote_commands() {
    println!("\n=== Test: JSON Remote Commands ===");
    let mut bridge = create_bridge(&BridgeConfig::default());

    let message = bridge
        .remote_command(br#"{"code": 16, "address": 12}"#)
        .await
        .unwrap();
    assert_eq!(message, Message::new(16, ME));
    assert_eq!(bridge.state().last_open(), Some(T0));

    let rejected: [&[u8]; 4] = [
        br#"{"code": "open", "address": 12}"#,
        br#"{"address": 12}"#,
        br#"{"code": 0, "address": 12}"#,
        br#"{"code": 16, "address": 999}"#,
    ];
    for payload in rejected {
        let err = bridge.remote_command(payload).await.unwrap_err();
        assert!(err.as_command().is_some());
    }

    assert_eq!(sent(&bridge), vec![Message::new(16, ME)]);
    println!("✓ JSON command transmitted, malformed ones rejected");
}

#[tokio::test]
async fn test_self_test_then_idle() {
    let mut bridge = create_bridge(&BridgeConfig::default());
    bridge.self_test().await;

    assert_eq!(
        bridge.notifier().events(),
        &[
            NotifyEvent::Alert(Alert::new(Color::RED, false)),
            NotifyEvent::Alert(Alert::new(Color::GREEN, false)),
            NotifyEvent::Alert(Alert::new(Color::BLUE, false)),
            NotifyEvent::Idle(Color::BLACK),
        ]
    );
}
