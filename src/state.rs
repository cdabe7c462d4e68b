//! Application state abstraction
//!
//! Handlers are generic over [`HasServices`], so the production
//! [`AppState`](crate::server::AppState) and the in-memory test state drive
//! the same router.

use crate::config::Config;
use crate::domain::{ChurchEvent, Donation, Group, Post, PrayerRequest, Sermon, WorshipSet};
use crate::jwt::JwtManager;
use crate::repository::{
    JoinCodeRepository, MembershipRepository, ScopedRepository, TenantRepository, UserRepository,
};
use crate::service::{
    AuthService, ChurchEventService, CommunityService, DonationService, GroupService,
    MembershipService, PrayerService, SermonService, TenantService, WorshipService,
};
use metrics_exporter_prometheus::PrometheusHandle;

/// One store for every feature collection
pub trait DocumentStore:
    ScopedRepository<Sermon>
    + ScopedRepository<ChurchEvent>
    + ScopedRepository<PrayerRequest>
    + ScopedRepository<Donation>
    + ScopedRepository<Post>
    + ScopedRepository<WorshipSet>
    + ScopedRepository<Group>
    + 'static
{
}

impl<T> DocumentStore for T where
    T: ScopedRepository<Sermon>
        + ScopedRepository<ChurchEvent>
        + ScopedRepository<PrayerRequest>
        + ScopedRepository<Donation>
        + ScopedRepository<Post>
        + ScopedRepository<WorshipSet>
        + ScopedRepository<Group>
        + 'static
{
}

pub trait HasServices: Clone + Send + Sync + 'static {
    type TenantRepo: TenantRepository + 'static;
    type JoinCodeRepo: JoinCodeRepository + 'static;
    type UserRepo: UserRepository + 'static;
    type MembershipRepo: MembershipRepository + 'static;
    type Store: DocumentStore;

    fn config(&self) -> &Config;

    fn jwt_manager(&self) -> &JwtManager;

    fn tenant_service(&self) -> &TenantService<Self::TenantRepo, Self::JoinCodeRepo>;

    fn auth_service(
        &self,
    ) -> &AuthService<Self::UserRepo, Self::MembershipRepo, Self::TenantRepo, Self::JoinCodeRepo>;

    fn membership_service(&self) -> &MembershipService<Self::MembershipRepo, Self::UserRepo>;

    fn sermon_service(&self) -> &SermonService<Self::Store>;

    fn church_event_service(&self) -> &ChurchEventService<Self::Store>;

    fn prayer_service(&self) -> &PrayerService<Self::Store>;

    fn donation_service(&self) -> &DonationService<Self::Store>;

    fn community_service(&self) -> &CommunityService<Self::Store, Self::UserRepo>;

    fn worship_service(&self) -> &WorshipService<Self::Store>;

    fn group_service(&self) -> &GroupService<Self::Store>;

    /// Present only when the Prometheus recorder is installed
    fn prometheus_handle(&self) -> Option<&PrometheusHandle>;

    /// Returns (db_ok, cache_ok)
    fn check_ready(&self) -> impl std::future::Future<Output = (bool, bool)> + Send;
}
