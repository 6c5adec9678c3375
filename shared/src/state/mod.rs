mod container;
mod container_base;
mod error;
mod state_change;
mod state_config;
mod state_kind;
mod state_record;
mod write_mode;

pub use container::{StateContainer, StateIter};
pub use container_base::StateContainerBase;
pub use error::StateError;
pub use state_change::{ChangeOrigin, StateChange};
pub use state_config::{FlushMode, StateConfig};
pub use state_kind::StateKind;
pub use state_record::StateRecord;
pub use write_mode::WriteMode;
