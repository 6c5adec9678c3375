/// Integration tests for the full-sync handshake between a host and clients
use std::time::Duration;

use statesync_service::{
    HandshakeCompleteEvent, HandshakeFault, HandshakeFaultEvent, InternalChangeEvent,
    ReceiveStatesEvent, SyncStatus,
};
use statesync_shared::{
    AppRole, DeliveryMode, SendDataArgs, SendMode, SubscriptionMode, Transport, TransportError,
    WireId, SYNC_REQUEST_WIRE_ID,
};
use statesync_test::{
    exchange, protocol, Beacon, Marker, Session, TestNode, Widget, BEACON_WIRE_ID,
    MARKER_WIRE_ID, WIDGET_WIRE_ID,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wire ids of the snapshots a node has sent to specific devices
fn snapshot_wire_ids(node: &TestNode) -> Vec<WireId> {
    node.transport
        .sent()
        .into_iter()
        .filter(|args| args.send_mode == SendMode::ManualTargets)
        .map(|args| args.wire_id)
        .collect()
}

fn seeded_session() -> Session {
    let mut session = Session::new(protocol);
    session.host.service.add_state(Widget::new(0, 5)).unwrap();
    session.host.service.add_state(Marker::new(3, 1)).unwrap();
    session.host.flush(session.now);
    session
}

#[test]
fn host_is_synchronized_as_soon_as_it_connects() {
    init_logger();
    let mut session = seeded_session();

    session.connect_host();

    assert_eq!(session.host.service.status(), SyncStatus::Synchronized);
    assert!(session.host.service.is_initialized());
    assert!(session.host.service.is_synchronized());
    assert!(session.host.transport.sent().is_empty());
}

#[test]
fn client_requests_sync_when_it_connects() {
    init_logger();
    let mut session = seeded_session();
    session.connect_host();

    session.client.connect();
    session.client.pump(session.now);

    let sent = session.client.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].wire_id, SYNC_REQUEST_WIRE_ID);
    assert_eq!(sent[0].send_mode, SendMode::SkipSender);
    assert_eq!(sent[0].delivery_mode, DeliveryMode::Reliable);
    assert!(sent[0].payload.is_empty());

    assert_eq!(session.client.service.status(), SyncStatus::Synchronizing);
    assert!(session.client.service.is_initialized());
    assert!(session.client.service.is_synchronized());
}

#[test]
fn client_is_synchronized_once_every_container_arrives() {
    init_logger();
    let mut session = seeded_session();
    session.connect_host();

    session.connect_client();
    assert_eq!(session.client.service.state::<Widget>(0).unwrap().value, 5);
    assert!(!session.client.service.state_exists::<Marker>(3).unwrap());
    assert_eq!(session.client.service.status(), SyncStatus::Synchronizing);

    session.tick(session.pacing);
    assert_eq!(session.client.service.state::<Marker>(3).unwrap().value, 1);
    assert_eq!(session.client.service.status(), SyncStatus::Synchronizing);

    session.tick(session.pacing);
    assert_eq!(session.client.service.status(), SyncStatus::Synchronized);

    session.tick(session.pacing);
    let client = session.client.device();
    assert!(!session.host.service.is_synchronizing_device(client));

    let mut host_events = session.host.service.take_events();
    let completed: Vec<_> = host_events.read::<HandshakeCompleteEvent>().collect();
    assert_eq!(completed, vec![client]);

    let mut client_events = session.client.service.take_events();
    let received: Vec<_> = client_events.read::<ReceiveStatesEvent<Widget>>().collect();
    assert_eq!(received, vec![vec![0]]);
    let changed: Vec<_> = client_events.read::<InternalChangeEvent<Widget>>().collect();
    assert_eq!(changed, vec![0]);

    assert_eq!(
        snapshot_wire_ids(&session.host),
        vec![WIDGET_WIRE_ID, MARKER_WIRE_ID, BEACON_WIRE_ID]
    );
}

#[test]
fn flushes_from_other_clients_do_not_count_as_snapshots() {
    init_logger();
    let mut session = seeded_session();
    session.connect_all();
    let mut late = TestNode::new(&session.hub, AppRole::Client, protocol());
    late.initialize(session.now);
    late.connect();
    late.pump(session.now);
    assert_eq!(late.service.status(), SyncStatus::Synchronizing);

    // the other client flushes every type before the host has answered
    let service = &mut session.client.service;
    service.set_state(Widget::new(0, 6)).unwrap();
    service.set_state(Marker::new(3, 2)).unwrap();
    service.add_state(Beacon::new(0, 1)).unwrap();
    session.client.flush(session.now);
    late.pump(session.now);

    assert_eq!(late.service.state::<Beacon>(0).unwrap().value, 1);
    assert_eq!(late.service.status(), SyncStatus::Synchronizing);

    for _ in 0..4 {
        session.now += session.pacing;
        let now = session.now;
        exchange(&mut [&mut session.host, &mut session.client, &mut late], now);
        session.host.update(now);
        exchange(&mut [&mut session.host, &mut session.client, &mut late], now);
    }
    assert_eq!(late.service.status(), SyncStatus::Synchronized);
}

#[test]
fn handshake_sends_one_container_per_pacing_interval() {
    init_logger();
    let mut session = seeded_session();
    session.connect_host();
    session.connect_client();
    let client = session.client.device();
    let start = session.now;

    assert_eq!(
        session.host.service.handshake_progress(client),
        Some(&[WIDGET_WIRE_ID][..])
    );

    session
        .host
        .update(start + session.pacing - Duration::from_millis(1));
    assert_eq!(
        session.host.service.handshake_progress(client),
        Some(&[WIDGET_WIRE_ID][..])
    );

    session.host.update(start + session.pacing);
    assert_eq!(
        session.host.service.handshake_progress(client),
        Some(&[WIDGET_WIRE_ID, MARKER_WIRE_ID][..])
    );
}

#[test]
fn handshake_skips_containers_the_device_does_not_subscribe_to() {
    init_logger();
    let mut session = seeded_session();
    let client = session.client.device();
    session
        .hub
        .set_subscription_mode(client, SubscriptionMode::Manual);
    session.hub.subscribe(client, WIDGET_WIRE_ID);

    session.connect_all();

    assert_eq!(snapshot_wire_ids(&session.host), vec![WIDGET_WIRE_ID]);
    assert_eq!(session.client.service.status(), SyncStatus::Synchronized);
    assert!(!session.client.service.state_exists::<Marker>(3).unwrap());
}

#[test]
fn duplicate_sync_request_does_not_restart_handshake() {
    init_logger();
    let mut session = seeded_session();
    session.connect_host();
    session.connect_client();
    let client = session.client.device();

    session
        .client
        .transport
        .send_data(SendDataArgs::skip_sender(
            SYNC_REQUEST_WIRE_ID,
            Vec::new().into_boxed_slice(),
            DeliveryMode::Reliable,
        ))
        .unwrap();
    session.exchange();

    assert_eq!(
        session.host.service.handshake_progress(client),
        Some(&[WIDGET_WIRE_ID][..])
    );

    for _ in 0..4 {
        session.tick(session.pacing);
    }
    let mut events = session.host.service.take_events();
    assert_eq!(events.read::<HandshakeCompleteEvent>().count(), 1);
    assert_eq!(snapshot_wire_ids(&session.host).len(), 3);
}

#[test]
fn disconnect_abandons_handshake_until_device_requests_again() {
    init_logger();
    let mut session = seeded_session();
    session.connect_host();
    session.connect_client();
    let client = session.client.device();

    session.hub.disconnect(client);
    session.exchange();

    assert!(!session.host.service.is_synchronizing_device(client));
    assert_eq!(session.client.service.status(), SyncStatus::AwaitingConnection);
    assert!(!session.client.service.is_synchronized());

    session.tick(session.pacing);
    session.tick(session.pacing);
    assert_eq!(snapshot_wire_ids(&session.host), vec![WIDGET_WIRE_ID]);
    assert!(!session.host.service.take_events().has::<HandshakeCompleteEvent>());

    session.client.connect();
    session.exchange();
    assert!(session.host.service.is_synchronizing_device(client));
    assert_eq!(
        session.host.service.handshake_progress(client),
        Some(&[WIDGET_WIRE_ID][..])
    );
}

#[test]
fn clients_ignore_sync_requests() {
    init_logger();
    let mut session = seeded_session();
    session.connect_all();

    let mut late = TestNode::new(&session.hub, AppRole::Client, protocol());
    late.initialize(session.now);
    late.connect();
    exchange(
        &mut [&mut session.host, &mut session.client, &mut late],
        session.now,
    );

    assert!(session.host.service.is_synchronizing_device(late.device()));
    assert!(!session.client.service.is_synchronizing_device(late.device()));
    assert!(snapshot_wire_ids(&session.client).is_empty());
}

#[test]
fn failed_snapshot_send_faults_handshake() {
    init_logger();
    let mut session = seeded_session();
    session.connect_host();
    session.connect_client();
    let client = session.client.device();

    // the host loses its connection but has not yet heard about it
    session.hub.disconnect(session.host.device());
    session.host.update(session.now + session.pacing);

    assert!(!session.host.service.is_synchronizing_device(client));
    let mut events = session.host.service.take_events();
    let faults: Vec<_> = events.read::<HandshakeFaultEvent>().collect();
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].0, client);
    assert!(matches!(
        faults[0].1,
        HandshakeFault::Send {
            kind: "Marker",
            source: TransportError::NotConnected,
            ..
        }
    ));
}
