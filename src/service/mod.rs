//! Business logic layer

pub mod auth;
pub mod church_event;
pub mod community;
pub mod donation;
pub mod group;
pub mod membership;
pub mod prayer;
pub mod sermon;
pub mod tenant;
pub mod worship;

pub use auth::AuthService;
pub use church_event::ChurchEventService;
pub use community::CommunityService;
pub use donation::DonationService;
pub use group::GroupService;
pub use membership::MembershipService;
pub use prayer::PrayerService;
pub use sermon::SermonService;
pub use tenant::{ResolvedJoinCode, TenantService};
pub use worship::WorshipService;
