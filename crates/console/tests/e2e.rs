//! End-to-end tests over the bundled local transport.
//!
//! These drive a real `/bin/sh` through a PTY: create sessions via the
//! registry, exchange bytes, and tear down, verifying the complete flow
//! the `tabterm` binary relies on.

use std::collections::HashMap;
use std::time::Duration;

use console::{SessionId, SessionOptions, SessionRegistry, SessionState, ShellEvent};
use tokio::time::timeout;
use transport::{LocalTransport, TermSize};

fn sh_options() -> SessionOptions {
    SessionOptions {
        program: Some("/bin/sh".to_string()),
        ..SessionOptions::default()
    }
}

/// Pumps shell events until a `Data` payload for `id` contains `marker`.
async fn wait_for_output(
    registry: &mut SessionRegistry<LocalTransport>,
    id: &SessionId,
    marker: &str,
) -> bool {
    let mut seen = Vec::new();
    for _ in 0..100 {
        match timeout(Duration::from_millis(100), registry.next_event()).await {
            Ok(Some(ShellEvent::Data { id: from, bytes, .. })) if &from == id => {
                seen.extend_from_slice(&bytes);
                if String::from_utf8_lossy(&seen).contains(marker) {
                    return true;
                }
            }
            Ok(None) => break,
            _ => {}
        }
    }
    false
}

/// Drains events until the registry goes quiet, returning the closes seen.
async fn drain_closes(
    registry: &mut SessionRegistry<LocalTransport>,
) -> Vec<(SessionId, Option<String>)> {
    let mut closes = Vec::new();
    let mut quiet = 0;
    while quiet < 10 {
        match timeout(Duration::from_millis(200), registry.next_event()).await {
            Ok(Some(ShellEvent::Closed { id, reason, .. })) => {
                closes.push((id, reason));
                quiet = 0;
            }
            Ok(Some(_)) => quiet = 0,
            Ok(None) => break,
            Err(_) => quiet += 1,
        }
    }
    closes
}

#[tokio::test]
async fn test_create_send_receive_close() {
    let mut registry = SessionRegistry::new(LocalTransport);

    let id = registry.create(&sh_options()).await.unwrap();
    assert_eq!(registry.get(&id).unwrap().state(), SessionState::Active);
    assert_eq!(registry.active_id(), Some(&id));

    registry
        .get(&id)
        .unwrap()
        .send(b"echo tabterm_e2e_marker\n")
        .unwrap();
    assert!(
        wait_for_output(&mut registry, &id, "tabterm_e2e_marker").await,
        "did not receive expected output"
    );

    registry.close(&id).await;
    assert!(registry.is_empty());
    assert!(registry.active_id().is_none());

    // Exactly one terminal event for the session.
    let closes = drain_closes(&mut registry).await;
    assert_eq!(closes.len(), 1);
    assert_eq!(closes[0].0, id);
}

#[tokio::test]
async fn test_remote_exit_closes_session() {
    let mut registry = SessionRegistry::new(LocalTransport);
    let id = registry.create(&sh_options()).await.unwrap();

    registry.get(&id).unwrap().send(b"exit 0\n").unwrap();

    let closes = drain_closes(&mut registry).await;
    assert_eq!(closes.len(), 1);
    assert_eq!(closes[0].0, id);
    assert_eq!(closes[0].1, None, "a clean exit must close without a reason");
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_nonzero_exit_reports_reason() {
    let mut registry = SessionRegistry::new(LocalTransport);
    let id = registry.create(&sh_options()).await.unwrap();

    registry.get(&id).unwrap().send(b"exit 7\n").unwrap();

    let closes = drain_closes(&mut registry).await;
    assert_eq!(closes.len(), 1);
    let reason = closes[0].1.as_ref().expect("nonzero exit must carry a reason");
    assert!(reason.contains('7'), "reason should name the status: {reason}");
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_sessions_progress_independently() {
    let mut registry = SessionRegistry::new(LocalTransport);
    let a = registry.create(&sh_options()).await.unwrap();
    let b = registry.create(&sh_options()).await.unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.active_id(), Some(&b));

    registry.get(&a).unwrap().send(b"echo marker_for_a\n").unwrap();
    registry.get(&b).unwrap().send(b"echo marker_for_b\n").unwrap();

    // Both sessions must produce their own output regardless of ordering
    // across sessions.
    let mut outputs: HashMap<SessionId, Vec<u8>> = HashMap::new();
    for _ in 0..200 {
        let done = {
            let a_out = outputs.get(&a).map(|o| String::from_utf8_lossy(o).to_string());
            let b_out = outputs.get(&b).map(|o| String::from_utf8_lossy(o).to_string());
            a_out.is_some_and(|o| o.contains("marker_for_a"))
                && b_out.is_some_and(|o| o.contains("marker_for_b"))
        };
        if done {
            break;
        }
        match timeout(Duration::from_millis(100), registry.next_event()).await {
            Ok(Some(ShellEvent::Data { id, bytes, .. })) => {
                outputs.entry(id).or_default().extend_from_slice(&bytes);
            }
            Ok(None) => break,
            _ => {}
        }
    }

    let a_out = String::from_utf8_lossy(outputs.get(&a).expect("no output from first session"))
        .to_string();
    let b_out = String::from_utf8_lossy(outputs.get(&b).expect("no output from second session"))
        .to_string();
    assert!(a_out.contains("marker_for_a"));
    assert!(b_out.contains("marker_for_b"));
    assert!(!a_out.contains("marker_for_b"), "output crossed sessions");

    registry.close_all();
    let closes = drain_closes(&mut registry).await;
    assert_eq!(closes.len(), 2);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_resize_is_idempotent_end_to_end() {
    let mut registry = SessionRegistry::new(LocalTransport);
    let id = registry.create(&sh_options()).await.unwrap();

    let size = TermSize::new(100, 40);
    registry.get_mut(&id).unwrap().resize(size).unwrap();
    registry.get_mut(&id).unwrap().resize(size).unwrap();
    assert_eq!(registry.get(&id).unwrap().size(), size);

    registry.close(&id).await;
}
