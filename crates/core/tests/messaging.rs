mod common;

use std::time::{Duration, Instant};

use common::*;
use pairlink::store::CREDS_FILE;
use pairlink::{CloseInfo, ConnectionState, CredentialStore, Error, FileCredentialStore, SocketError};
use pairlink_protocol::{InboundMessage, Jid, OutboundPayload, STATUS_BROADCAST, UpsertKind};
use tokio::sync::mpsc;

async fn connected(h: &Harness) {
	h.manager.initialize().await.unwrap();
	h.controller.open();
	wait_status(&h.manager, |s| s.state == ConnectionState::Connected).await;
}

#[tokio::test]
async fn send_requires_connected_state() {
	let h = harness();
	for destination in ["15550002", "15550002@s.whatsapp.net"] {
		let err = h.manager.send_message(destination, "hi").await.unwrap_err();
		assert!(matches!(err, Error::NotConnected { state: ConnectionState::Disconnected }), "{err}");
	}

	h.manager.initialize().await.unwrap();
	h.controller.qr("2@challenge");
	wait_status(&h.manager, |s| s.state == ConnectionState::QrRequired).await;
	for destination in ["15550002", "15550002@s.whatsapp.net"] {
		let err = h.manager.send_message(destination, "hi").await.unwrap_err();
		assert!(matches!(err, Error::NotConnected { state: ConnectionState::QrRequired }), "{err}");
	}
	assert!(h.controller.take_sent().is_empty());
}

#[tokio::test]
async fn send_normalizes_destination() {
	let h = harness();
	connected(&h).await;

	let sent = h.manager.send_message("+1 (555) 000-2222", "hello there").await.unwrap();
	assert_eq!(sent.to.as_str(), "15550002222@s.whatsapp.net");

	h.manager.send_message("120363000@g.us", "group hello").await.unwrap();

	let sent = h.controller.take_sent();
	assert_eq!(
		sent,
		vec![
			(Jid::user("15550002222"), OutboundPayload::text("hello there")),
			(Jid::from_raw("120363000@g.us"), OutboundPayload::text("group hello")),
		]
	);
}

#[tokio::test]
async fn send_rejects_unaddressable_destination() {
	let h = harness();
	connected(&h).await;
	let err = h.manager.send_message("not a number", "hi").await.unwrap_err();
	assert!(matches!(err, Error::InvalidDestination(_)));
}

#[tokio::test]
async fn send_failures_propagate_without_retry() {
	let h = harness();
	connected(&h).await;
	h.controller.fail_sends(true);

	let err = h.manager.send_message("15550002", "hi").await.unwrap_err();
	assert!(matches!(err, Error::Socket(SocketError::Send(_))), "{err}");
	assert!(h.controller.take_sent().is_empty());
	assert_eq!(h.manager.connection_state(), ConnectionState::Connected);
}

#[tokio::test]
async fn only_external_messages_reach_handler() {
	let h = harness();
	let (tx, mut rx) = mpsc::unbounded_channel();
	h.manager.set_message_handler(move |message: InboundMessage| {
		let tx = tx.clone();
		async move {
			tx.send(message)?;
			anyhow::Ok(())
		}
	});
	connected(&h).await;

	h.controller.upsert(
		vec![
			text_message("self-1", true, Jid::user("15550001"), "note to self"),
			text_message("ext-1", false, Jid::user("15550003"), "hello agent"),
		],
		UpsertKind::Notify,
	);

	let delivered = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
	assert_eq!(delivered.key.id, "ext-1");
	assert_eq!(delivered.text(), Some("hello agent"));
	assert!(tokio::time::timeout(Duration::from_millis(100), rx.recv()).await.is_err());
}

#[tokio::test]
async fn broadcast_history_and_failures_are_isolated() {
	let h = harness();
	let (tx, mut rx) = mpsc::unbounded_channel();
	h.manager.set_message_handler(move |message: InboundMessage| {
		let tx = tx.clone();
		async move {
			if message.key.id == "poison" {
				anyhow::bail!("cannot handle {}", message.key.id);
			}
			tx.send(message.key.id)?;
			anyhow::Ok(())
		}
	});
	connected(&h).await;

	h.controller.upsert(
		vec![text_message("history", false, Jid::user("15550003"), "old")],
		UpsertKind::Append,
	);
	h.controller.upsert(
		vec![
			text_message("story", false, Jid::from_raw(STATUS_BROADCAST), "status"),
			text_message("poison", false, Jid::user("15550004"), "bad"),
			text_message("after", false, Jid::user("15550005"), "good"),
		],
		UpsertKind::Notify,
	);

	let first = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
	assert_eq!(first, "after");
	assert!(tokio::time::timeout(Duration::from_millis(100), rx.recv()).await.is_err());
	assert_eq!(h.manager.connection_state(), ConnectionState::Connected);
}

#[tokio::test]
async fn slow_handler_does_not_delay_connection_updates() {
	let h = harness();
	let (tx, mut rx) = mpsc::unbounded_channel();
	h.manager.set_message_handler(move |message: InboundMessage| {
		let tx = tx.clone();
		async move {
			tokio::time::sleep(Duration::from_millis(400)).await;
			tx.send(message.key.id)?;
			anyhow::Ok(())
		}
	});
	connected(&h).await;

	h.controller.upsert(vec![text_message("b1", false, Jid::user("15550003"), "first")], UpsertKind::Notify);
	h.controller.upsert(vec![text_message("b2", false, Jid::user("15550003"), "second")], UpsertKind::Notify);
	let started = Instant::now();
	h.controller.close(CloseInfo::code(428).with_message("Connection Closed"));

	wait_status(&h.manager, |s| s.last_disconnect.is_some()).await;
	assert!(started.elapsed() < Duration::from_millis(250), "close waited on the handler");
	assert!(rx.try_recv().is_err());

	// Batches queued before the close still arrive, in order.
	assert_eq!(tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap(), "b1");
	assert_eq!(tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap(), "b2");
}

#[tokio::test]
async fn replaced_handler_no_longer_receives() {
	let h = harness();
	let (old_tx, mut old_rx) = mpsc::unbounded_channel::<String>();
	let (new_tx, mut new_rx) = mpsc::unbounded_channel::<String>();
	h.manager.set_message_handler(move |message: InboundMessage| {
		let tx = old_tx.clone();
		async move {
			tx.send(message.key.id)?;
			anyhow::Ok(())
		}
	});
	h.manager.set_message_handler(move |message: InboundMessage| {
		let tx = new_tx.clone();
		async move {
			tx.send(message.key.id)?;
			anyhow::Ok(())
		}
	});
	connected(&h).await;

	h.controller.upsert(vec![text_message("m1", false, Jid::user("15550003"), "hi")], UpsertKind::Notify);

	assert_eq!(tokio::time::timeout(WAIT, new_rx.recv()).await.unwrap().unwrap(), "m1");
	assert!(old_rx.try_recv().is_err());
}

#[tokio::test]
async fn credential_updates_are_persisted() {
	let h = harness();
	h.manager.initialize().await.unwrap();
	let path = h.session_path();

	h.controller.creds(paired_credentials());
	eventually(|| path.join(CREDS_FILE).exists()).await;

	let stored = FileCredentialStore.load(&path).unwrap().unwrap();
	assert_eq!(stored, paired_credentials());
	assert_eq!(stored.identity(), Some("15550001:7@s.whatsapp.net"));
}
