//! Domain models for Ecclesia Core

pub mod church_event;
pub mod common;
pub mod donation;
pub mod group;
pub mod membership;
pub mod post;
pub mod prayer;
pub mod role;
pub mod sermon;
pub mod tenant;
pub mod user;
pub mod worship;

pub use church_event::*;
pub use common::*;
pub use donation::*;
pub use group::*;
pub use membership::*;
pub use post::*;
pub use prayer::*;
pub use role::*;
pub use sermon::*;
pub use tenant::*;
pub use user::*;
pub use worship::*;
