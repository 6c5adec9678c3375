mod error;
mod send_data_args;
mod transport_event;

pub use error::TransportError;
pub use send_data_args::SendDataArgs;
pub use transport_event::TransportEvent;

use crate::types::{AppRole, ConnectStatus, DeviceId, WireId};

/// Connection fabric the state services send through. Inbound traffic
/// reaches the services as `TransportEvent` values.
pub trait Transport {
    fn send_data(&mut self, args: SendDataArgs) -> Result<(), TransportError>;

    fn is_device_subscribed(&self, device: DeviceId, wire_id: WireId) -> bool;

    fn set_local_subscription(&mut self, wire_id: WireId, subscribed: bool);

    fn role(&self) -> AppRole;

    fn local_device_id(&self) -> DeviceId;

    /// Role of another device in the session, if it is known
    fn device_role(&self, device: DeviceId) -> Option<AppRole>;

    fn status(&self) -> ConnectStatus;
}
