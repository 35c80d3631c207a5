pub mod config;
pub mod fleet;
pub mod session;
pub mod watch;

pub use config::{BackendConfig, Config, PollConfig};
pub use fleet::FleetFilter;
pub use session::{CommandRefusal, SessionError, SessionEvent, ValveSession, command_gate};
pub use watch::{FleetWatcher, StatusWatcher};
