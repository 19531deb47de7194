pub mod actuator;
pub mod config;
pub mod constants;
pub mod detection;
pub mod escalation;
pub mod logging;
pub mod replay;
pub mod services;
pub mod session;
