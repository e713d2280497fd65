//! Domain type modules
//!
//! Split by aggregate; see the individual modules for details.

pub mod doctor;
pub mod events;
pub mod invitation;
pub mod join_request;
pub mod matching;
pub mod notification;
pub mod practice;
pub mod staff;
pub mod user;

pub use doctor::*;
pub use events::*;
pub use invitation::*;
pub use join_request::*;
pub use matching::*;
pub use notification::*;
pub use practice::*;
pub use staff::*;
pub use user::*;
