pub mod attendance;
pub mod employee;
pub mod escalation;
pub mod role;
