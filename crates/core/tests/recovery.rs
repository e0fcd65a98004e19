mod common;

use std::time::Duration;

use common::*;
use pairlink::store::CREDS_FILE;
use pairlink::{CloseInfo, ConnectionState, DisconnectReason};

async fn connected(h: &Harness) {
	h.manager.initialize().await.unwrap();
	h.controller.open();
	wait_status(&h.manager, |s| s.state == ConnectionState::Connected).await;
}

async fn connected_with_credentials(h: &Harness) {
	connected(h).await;
	let creds = h.session_path().join(CREDS_FILE);
	h.controller.creds(paired_credentials());
	eventually(|| creds.exists()).await;
}

#[tokio::test]
async fn logged_out_clears_session_and_halts() {
	let h = harness();
	connected_with_credentials(&h).await;
	let creds = h.session_path().join(CREDS_FILE);

	h.controller.close(CloseInfo::code(401).with_message("Connection Failure"));
	let status = wait_status(&h.manager, |s| s.state == ConnectionState::Disconnected).await;

	assert_eq!(status.reconnect_attempts, 0);
	assert!(!status.reconnect_pending);
	assert_eq!(status.last_disconnect.unwrap().reason, DisconnectReason::LoggedOut);
	assert!(!creds.exists());

	tokio::time::sleep(Duration::from_millis(150)).await;
	assert_eq!(h.controller.created(), 1);
	assert_eq!(h.manager.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn restart_required_reconnects_quickly_and_keeps_session() {
	let h = harness_with(|c| c.reconnect_min_delay_ms = 5_000);
	connected_with_credentials(&h).await;
	let creds = h.session_path().join(CREDS_FILE);

	h.controller.close(CloseInfo::code(515).with_message("Stream Errored (restart required)"));
	let status = wait_status(&h.manager, |s| s.reconnect_pending).await;
	assert_eq!(status.reconnect_attempts, 1);
	assert!(creds.exists());

	// Fixed restart delay, not the 5s backoff floor.
	eventually(|| h.controller.created() == 2).await;
	assert!(creds.exists());
	assert!(h.controller.last_config().unwrap().credentials.is_paired());

	deliver(|| h.controller.open()).await;
	let status = wait_status(&h.manager, |s| s.state == ConnectionState::Connected).await;
	assert_eq!(status.reconnect_attempts, 0);
}

#[tokio::test]
async fn stream_error_after_pairing_uses_fixed_delay() {
	let h = harness_with(|c| c.reconnect_min_delay_ms = 5_000);
	connected(&h).await;

	h.controller.close(CloseInfo {
		status_code: None,
		message: Some("Stream Errored".into()),
	});
	eventually(|| h.controller.created() == 2).await;
	assert_eq!(
		h.manager.detailed_status().last_disconnect.unwrap().reason,
		DisconnectReason::StreamErrorAfterPairing
	);
}

#[tokio::test]
async fn bad_session_clears_then_retries_fresh() {
	let h = harness();
	connected_with_credentials(&h).await;
	let creds = h.session_path().join(CREDS_FILE);

	h.controller.close(CloseInfo::code(500).with_message("Bad MAC"));
	eventually(|| h.controller.created() == 2).await;

	assert!(!creds.exists());
	assert!(!h.controller.last_config().unwrap().credentials.is_paired());
}

#[tokio::test]
async fn recoverable_close_keeps_session_and_backs_off() {
	let h = harness_with(|c| c.reconnect_min_delay_ms = 300);
	connected_with_credentials(&h).await;
	let creds = h.session_path().join(CREDS_FILE);

	h.controller.close(CloseInfo::code(408).with_message("Connection Lost"));
	let status = wait_status(&h.manager, |s| s.reconnect_pending).await;
	assert_eq!(status.state, ConnectionState::Disconnected);
	assert_eq!(status.reconnect_attempts, 1);
	assert_eq!(status.last_disconnect.unwrap().reason, DisconnectReason::Lost);
	assert!(creds.exists());

	tokio::time::sleep(Duration::from_millis(100)).await;
	assert_eq!(h.controller.created(), 1, "backoff floor not respected");
	eventually(|| h.controller.created() == 2).await;
}

#[tokio::test]
async fn unknown_disconnects_clear_only_after_threshold() {
	let h = harness_with(|c| c.max_reconnect_attempts = 5);
	connected_with_credentials(&h).await;
	let creds = h.session_path().join(CREDS_FILE);
	let unknown = || CloseInfo::code(499).with_message("mystery");

	h.controller.close(unknown());
	eventually(|| h.controller.created() == 2).await;
	assert!(creds.exists());
	assert_eq!(h.manager.detailed_status().unknown_disconnect_streak, 1);

	deliver(|| h.controller.close(unknown())).await;
	eventually(|| h.controller.created() == 3).await;
	assert!(creds.exists());
	assert_eq!(h.manager.detailed_status().unknown_disconnect_streak, 2);

	deliver(|| h.controller.close(unknown())).await;
	eventually(|| h.controller.created() == 4).await;
	assert!(!creds.exists());
	assert_eq!(h.manager.detailed_status().unknown_disconnect_streak, 0);
}

#[tokio::test]
async fn exhausted_budget_stops_and_resets_counter() {
	let h = harness();
	connected(&h).await;
	h.controller.fail_next_creates(10);

	h.controller.close(CloseInfo::code(428).with_message("Connection Closed"));

	// One socket from initialize, then one failed create per budgeted attempt.
	eventually(|| h.controller.created() == 4).await;
	let status = wait_status(&h.manager, |s| s.reconnect_attempts == 0 && !s.reconnect_pending).await;
	assert_eq!(status.state, ConnectionState::Disconnected);

	tokio::time::sleep(Duration::from_millis(300)).await;
	assert_eq!(h.controller.created(), 4);
	assert_eq!(h.manager.reconnect_attempts(), 0);

	// An external initialize starts over.
	h.controller.fail_next_creates(0);
	h.manager.initialize().await.unwrap();
	assert_eq!(h.manager.connection_state(), ConnectionState::Connecting);
}

#[tokio::test]
async fn unanswered_pairing_challenge_expires_and_reconnects() {
	let h = harness_with(|c| {
		c.qr_timeout_ms = 60;
		c.reconnect_min_delay_ms = 400;
	});
	h.manager.initialize().await.unwrap();
	h.controller.qr("2@stale,challenge");
	wait_status(&h.manager, |s| s.state == ConnectionState::QrRequired).await;

	let status = wait_status(&h.manager, |s| s.state == ConnectionState::Disconnected).await;
	assert!(status.challenge.is_none());
	assert!(h.manager.current_challenge().is_none());
	assert!(status.reconnect_pending);
	assert_eq!(status.reconnect_attempts, 1);

	eventually(|| h.controller.created() == 2).await;
}

#[tokio::test]
async fn expiry_timer_is_noop_outside_pairing() {
	let h = harness_with(|c| c.qr_timeout_ms = 40);
	h.manager.initialize().await.unwrap();

	tokio::time::sleep(Duration::from_millis(120)).await;
	let status = h.manager.detailed_status();
	assert_eq!(status.state, ConnectionState::Connecting);
	assert!(!status.reconnect_pending);
	assert_eq!(h.controller.created(), 1);
}

#[tokio::test]
async fn stream_end_without_close_is_lost() {
	let h = harness_with(|c| c.reconnect_min_delay_ms = 300);
	connected(&h).await;

	h.controller.end_stream();
	let status = wait_status(&h.manager, |s| s.reconnect_pending).await;

	assert_eq!(status.state, ConnectionState::Disconnected);
	assert_eq!(status.last_disconnect.unwrap().reason, DisconnectReason::Lost);
	eventually(|| h.controller.created() == 2).await;
}
