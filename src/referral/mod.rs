//! Partner lifecycle and the partner menu

pub mod admin_action;
pub mod menu;
pub mod workflow;

pub use admin_action::AdminAction;
pub use menu::{MenuAction, MenuDispatcher, ReferralCard};
pub use workflow::{Access, Decision, RegistrationRequest, SharedContact, Workflow};
