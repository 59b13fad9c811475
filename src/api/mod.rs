pub mod attendance;

use crate::engine::Engine;
use crate::store::mysql::{
    MySqlAttendanceStore, MySqlEmployeeDirectory, MySqlEscalationStateStore,
    MySqlNotificationOutbox,
};

/// The engine as wired in production: MySQL-backed stores plus the outbox
/// sink. Handlers take this via `web::Data`.
pub type AppEngine = Engine<
    MySqlAttendanceStore,
    MySqlEscalationStateStore,
    MySqlEmployeeDirectory,
    MySqlNotificationOutbox,
>;
