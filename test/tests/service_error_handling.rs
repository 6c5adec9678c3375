/// Tests for service registration, lifecycle and error handling
use std::time::{Duration, Instant};

use statesync_service::{
    ConfigurationError, InternalChangeEvent, StateProtocol, StateSyncConfig, StateSyncService,
    SyncStatus,
};
use statesync_shared::{
    AppRole, BitCodec, CodecError, StateBatch, StateBatchSink, StateCodec, StateError, StateKind,
    SubscriptionMode, SYNC_REQUEST_WIRE_ID,
};
use statesync_test::{
    protocol, protocol_with_anchors, Anchor, Beacon, Impostor, LocalHub, Marker, Reserved,
    Session, TestNode, Unconfigured, Widget, WIDGET_WIRE_ID,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn kind_names(service: &StateSyncService) -> Vec<&'static str> {
    service.state_kinds().map(|kind| kind.name()).collect()
}

/// Fails validation, as a codec missing platform support would
struct RejectingCodec;

impl StateCodec for RejectingCodec {
    fn validate(&self) -> Result<(), CodecError> {
        Err(CodecError::Unsupported {
            reason: "no compressor available".to_string(),
        })
    }

    fn encode(&self, batch: &dyn StateBatch) -> Result<Box<[u8]>, CodecError> {
        BitCodec.encode(batch)
    }

    fn decode(&self, payload: &[u8], sink: &mut dyn StateBatchSink) -> Result<(), CodecError> {
        BitCodec.decode(payload, sink)
    }
}

#[test]
fn register_state_reports_each_configuration_error() {
    init_logger();
    let mut service = StateSyncService::new(
        StateSyncConfig::default(),
        StateProtocol::builder().build(),
        BitCodec,
    );

    service.register_state::<Widget>().unwrap();

    assert_eq!(
        service.register_state::<Widget>(),
        Err(ConfigurationError::AlreadyRegistered { kind: "Widget" })
    );
    assert_eq!(
        service.register_state::<Impostor>(),
        Err(ConfigurationError::WireIdCollision {
            kind: "Impostor",
            wire_id: WIDGET_WIRE_ID,
            existing: "Widget",
        })
    );
    assert_eq!(
        service.register_state::<Reserved>(),
        Err(ConfigurationError::ReservedWireId {
            kind: "Reserved",
            wire_id: SYNC_REQUEST_WIRE_ID,
        })
    );
    assert_eq!(
        service.register_state::<Unconfigured>(),
        Err(ConfigurationError::MissingConfig {
            kind: "Unconfigured"
        })
    );
    assert_eq!(kind_names(&service), vec!["Widget"]);
}

#[test]
fn initialize_skips_failed_registrations() {
    init_logger();
    let hub = LocalHub::new();
    let mut transport = hub.add_device(AppRole::Host);
    let protocol = StateProtocol::builder()
        .add_state::<Widget>()
        .add_state::<Impostor>()
        .add_state::<Reserved>()
        .add_state::<Unconfigured>()
        .add_state::<Widget>()
        .add_state::<Marker>()
        .build();
    let mut service = StateSyncService::new(StateSyncConfig::default(), protocol, BitCodec);

    service.initialize(&mut transport, Instant::now()).unwrap();

    assert_eq!(service.status(), SyncStatus::AwaitingConnection);
    assert_eq!(kind_names(&service), vec!["Widget", "Marker"]);
    assert!(service.container_by_wire_id(WIDGET_WIRE_ID).is_some());
    assert!(service.container_by_wire_id(SYNC_REQUEST_WIRE_ID).is_none());
}

#[test]
fn invalid_codec_aborts_initialization() {
    init_logger();
    let hub = LocalHub::new();
    let mut transport = hub.add_device(AppRole::Host);
    let mut service = StateSyncService::new(StateSyncConfig::default(), protocol(), RejectingCodec);

    let result = service.initialize(&mut transport, Instant::now());

    assert!(matches!(
        result,
        Err(ConfigurationError::InvalidCodec {
            source: CodecError::Unsupported { .. }
        })
    ));
    assert_eq!(service.status(), SyncStatus::Uninitialized);
    assert!(kind_names(&service).is_empty());
}

#[test]
fn initialize_twice_fails() {
    init_logger();
    let hub = LocalHub::new();
    let mut node = TestNode::new(&hub, AppRole::Host, protocol());
    node.initialize(Instant::now());

    assert_eq!(
        node.service.initialize(&mut node.transport, Instant::now()),
        Err(ConfigurationError::AlreadyInitialized)
    );
}

#[test]
fn unregistered_type_is_unknown() {
    init_logger();
    let hub = LocalHub::new();
    let mut node = TestNode::new(&hub, AppRole::Host, protocol());
    node.initialize(Instant::now());

    assert!(matches!(
        node.service.state::<Anchor>(0),
        Err(StateError::UnknownType { kind: "Anchor" })
    ));
    assert!(matches!(
        node.service.add_state(Anchor::new(0, 1)),
        Err(StateError::UnknownType { .. })
    ));
    assert!(matches!(
        node.service
            .add_state_of_kind(&StateKind::of::<Anchor>(), None),
        Err(StateError::UnknownType { .. })
    ));
}

#[test]
fn generator_registers_its_types_and_seeds_states() {
    init_logger();
    let hub = LocalHub::new();
    let mut node = TestNode::new(&hub, AppRole::Host, protocol_with_anchors());
    node.initialize(Instant::now());

    assert_eq!(
        kind_names(&node.service),
        vec!["Widget", "Marker", "Beacon", "Anchor"]
    );
    assert_eq!(node.service.count::<Anchor>().unwrap(), 2);
    assert!(node.service.state_exists::<Anchor>(0).unwrap());
    assert!(node.service.state_exists::<Anchor>(1).unwrap());
    assert!(!node
        .service
        .state_container::<Anchor>()
        .unwrap()
        .has_pending());
}

#[test]
fn add_state_of_kind_uses_given_or_next_key() {
    init_logger();
    let hub = LocalHub::new();
    let mut node = TestNode::new(&hub, AppRole::Host, protocol());
    node.initialize(Instant::now());
    let kind = StateKind::of::<Beacon>();

    assert_eq!(node.service.add_state_of_kind(&kind, Some(4)), Ok(4));
    assert_eq!(node.service.add_state_of_kind(&kind, None), Ok(5));
    assert_eq!(
        node.service.add_state_of_kind(&kind, Some(4)),
        Err(StateError::DuplicateKey {
            kind: "Beacon",
            key: 4
        })
    );
    assert_eq!(node.service.state::<Beacon>(5).unwrap(), &Beacon::new(5, 0));
    assert_eq!(
        node.service
            .container(&kind)
            .map(|container| container.count()),
        Some(2)
    );
}

#[test]
fn subscription_guard_keeps_sync_requests_flowing() {
    init_logger();
    let hub = LocalHub::new();
    let mut node = TestNode::new(&hub, AppRole::Host, protocol());
    node.initialize(Instant::now());
    let device = node.device();

    hub.set_subscription_mode(device, SubscriptionMode::Manual);
    node.pump(Instant::now());

    assert!(hub.is_subscribed(device, SYNC_REQUEST_WIRE_ID));
    assert!(!hub.is_subscribed(device, WIDGET_WIRE_ID));
}

#[test]
fn synchronized_states_load_without_change_events() {
    init_logger();
    let hub = LocalHub::new();
    let mut client = TestNode::new(&hub, AppRole::Client, protocol());
    client.initialize(Instant::now());
    let payload = BitCodec
        .encode(&vec![Widget::new(0, 3), Widget::new(1, 4)])
        .unwrap();

    let loaded =
        client
            .service
            .receive_synchronized_states(&client.transport, WIDGET_WIRE_ID, &payload);

    assert_eq!(loaded, 2);
    assert_eq!(client.service.state::<Widget>(1).unwrap().value, 4);
    assert!(!client
        .service
        .take_events()
        .has::<InternalChangeEvent<Widget>>());
    assert_eq!(
        client
            .service
            .receive_synchronized_states(&client.transport, 99, &payload),
        0
    );
}

#[test]
fn hosts_refuse_synchronized_states() {
    init_logger();
    let hub = LocalHub::new();
    let mut host = TestNode::new(&hub, AppRole::Host, protocol());
    host.initialize(Instant::now());
    let payload = BitCodec.encode(&vec![Widget::new(0, 3)]).unwrap();

    let loaded = host
        .service
        .receive_synchronized_states(&host.transport, WIDGET_WIRE_ID, &payload);

    assert_eq!(loaded, 0);
    assert!(!host.service.state_exists::<Widget>(0).unwrap());
}

#[test]
fn teardown_stops_event_handling_but_keeps_states() {
    init_logger();
    let mut session = Session::new(protocol);
    session.host.service.add_state(Widget::new(0, 5)).unwrap();
    session.host.flush(session.now);
    session.connect_all();

    session.host.service.teardown();
    session.client.service.set_state(Widget::new(0, 1)).unwrap();
    session.tick(Duration::from_millis(16));

    assert_eq!(session.host.service.status(), SyncStatus::Terminated);
    assert_eq!(session.host.service.state::<Widget>(0).unwrap().value, 5);
    assert_eq!(session.client.service.state::<Widget>(0).unwrap().value, 1);
}
