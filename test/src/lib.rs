pub mod helpers;

pub use helpers::*;
pub use local_hub::{LocalHub, LocalTransport};
pub use test_protocol::{
    protocol, protocol_with_anchors, Anchor, AnchorGenerator, Beacon, Impostor, Marker, Reserved,
    Unconfigured, Widget, ANCHOR_WIRE_ID, BEACON_INTERVAL, BEACON_WIRE_ID, MARKER_WIRE_ID,
    WIDGET_WIRE_ID,
};
