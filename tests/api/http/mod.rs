//! HTTP API Handler Tests Infrastructure
//!
//! - `TestAppState` implements `HasServices` over the in-memory repositories
//! - The production `build_router()` is driven with `tower::ServiceExt::oneshot`
//! - Request helpers return status, headers and the parsed JSON body

pub mod auth_http_test;
pub mod context_http_test;
pub mod sermon_http_test;

use crate::api::{
    access_token, create_test_config, create_test_jwt_manager, MemoryStore, TestEmailSender,
    TestJobQueue, TestJoinCodeRepository, TestMembershipRepository, TestTenantRepository,
    TestUserRepository,
};
use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use ecclesia_core::cache::{CacheOperations, NoOpCacheManager};
use ecclesia_core::config::Config;
use ecclesia_core::domain::{CreateTenantInput, Role, StringUuid, Tenant, User, UserStatus};
use ecclesia_core::email::EmailSender;
use ecclesia_core::events::{EventPublisher, QueueEventPublisher};
use ecclesia_core::jwt::JwtManager;
use ecclesia_core::queue::JobQueue;
use ecclesia_core::server::build_router;
use ecclesia_core::service::{
    AuthService, ChurchEventService, CommunityService, DonationService, GroupService,
    MembershipService, PrayerService, SermonService, TenantService, WorshipService,
};
use ecclesia_core::state::HasServices;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

// ============================================================================
// Test AppState
// ============================================================================

type TestAuthService = AuthService<
    TestUserRepository,
    TestMembershipRepository,
    TestTenantRepository,
    TestJoinCodeRepository,
>;

/// Test-friendly AppState over the in-memory implementations
#[derive(Clone)]
pub struct TestAppState {
    pub config: Arc<Config>,
    pub jwt_manager: JwtManager,
    pub tenant_service: Arc<TenantService<TestTenantRepository, TestJoinCodeRepository>>,
    pub auth_service: Arc<TestAuthService>,
    pub membership_service: Arc<MembershipService<TestMembershipRepository, TestUserRepository>>,
    pub sermon_service: Arc<SermonService<MemoryStore>>,
    pub church_event_service: Arc<ChurchEventService<MemoryStore>>,
    pub prayer_service: Arc<PrayerService<MemoryStore>>,
    pub donation_service: Arc<DonationService<MemoryStore>>,
    pub community_service: Arc<CommunityService<MemoryStore, TestUserRepository>>,
    pub worship_service: Arc<WorshipService<MemoryStore>>,
    pub group_service: Arc<GroupService<MemoryStore>>,
    // Raw handles for setup and assertions
    pub tenant_repo: Arc<TestTenantRepository>,
    pub user_repo: Arc<TestUserRepository>,
    pub membership_repo: Arc<TestMembershipRepository>,
    pub store: Arc<MemoryStore>,
    pub queue: Arc<TestJobQueue>,
    pub email: Arc<TestEmailSender>,
}

impl TestAppState {
    pub fn new() -> Self {
        let config = Arc::new(create_test_config());
        let tenant_repo = Arc::new(TestTenantRepository::new());
        let join_code_repo = Arc::new(TestJoinCodeRepository::new());
        let user_repo = Arc::new(TestUserRepository::new());
        let membership_repo = Arc::new(TestMembershipRepository::new());
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(TestJobQueue::new());
        let email = Arc::new(TestEmailSender::new());

        let cache: Arc<dyn CacheOperations> = Arc::new(NoOpCacheManager::new());
        let events: Arc<dyn EventPublisher> = Arc::new(QueueEventPublisher::new(
            queue.clone() as Arc<dyn JobQueue>,
            config.queue.notifications_queue.clone(),
        ));
        let jwt_manager = create_test_jwt_manager();

        let tenant_service = Arc::new(TenantService::new(
            tenant_repo.clone(),
            join_code_repo,
            cache,
        ));
        let auth_service = Arc::new(AuthService::new(
            user_repo.clone(),
            membership_repo.clone(),
            tenant_service.clone(),
            jwt_manager.clone(),
            email.clone() as Arc<dyn EmailSender>,
            events.clone(),
        ));

        Self {
            config,
            jwt_manager,
            tenant_service,
            auth_service,
            membership_service: Arc::new(MembershipService::new(
                membership_repo.clone(),
                user_repo.clone(),
            )),
            sermon_service: Arc::new(SermonService::new(store.clone(), events.clone())),
            church_event_service: Arc::new(ChurchEventService::new(store.clone(), events.clone())),
            prayer_service: Arc::new(PrayerService::new(store.clone(), events.clone())),
            donation_service: Arc::new(DonationService::new(store.clone(), events.clone())),
            community_service: Arc::new(CommunityService::new(
                store.clone(),
                user_repo.clone(),
                events.clone(),
            )),
            worship_service: Arc::new(WorshipService::new(store.clone(), events)),
            group_service: Arc::new(GroupService::new(store.clone())),
            tenant_repo,
            user_repo,
            membership_repo,
            store,
            queue,
            email,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.clone())
    }

    /// Create a church through the service, as the public signup would
    pub async fn create_church(&self, name: &str) -> Tenant {
        self.tenant_service
            .create(CreateTenantInput {
                name: name.to_string(),
                email: format!("office@{}.test", name.to_lowercase().replace(' ', "-")),
                phone: None,
                address: None,
                denomination: None,
                website: None,
                subscription_plan: None,
            })
            .await
            .expect("Failed to create church")
    }

    /// Seed a user with `role` in `tenant` and return its id plus an access token
    pub async fn principal(&self, tenant: &Tenant, role: Role, first_name: &str) -> (StringUuid, String) {
        let user = User {
            tenant_id: Some(tenant.id),
            email: format!("{}@{}.test", first_name.to_lowercase(), tenant.slug),
            first_name: first_name.to_string(),
            last_name: "Tester".to_string(),
            role,
            status: UserStatus::Active,
            email_verified: true,
            ..Default::default()
        };
        let id = user.id;
        self.user_repo.add_user(user).await;
        (id, access_token(id, Some(tenant.id), role))
    }
}

impl HasServices for TestAppState {
    type TenantRepo = TestTenantRepository;
    type JoinCodeRepo = TestJoinCodeRepository;
    type UserRepo = TestUserRepository;
    type MembershipRepo = TestMembershipRepository;
    type Store = MemoryStore;

    fn config(&self) -> &Config {
        &self.config
    }

    fn jwt_manager(&self) -> &JwtManager {
        &self.jwt_manager
    }

    fn tenant_service(&self) -> &TenantService<Self::TenantRepo, Self::JoinCodeRepo> {
        &self.tenant_service
    }

    fn auth_service(
        &self,
    ) -> &AuthService<Self::UserRepo, Self::MembershipRepo, Self::TenantRepo, Self::JoinCodeRepo>
    {
        &self.auth_service
    }

    fn membership_service(&self) -> &MembershipService<Self::MembershipRepo, Self::UserRepo> {
        &self.membership_service
    }

    fn sermon_service(&self) -> &SermonService<Self::Store> {
        &self.sermon_service
    }

    fn church_event_service(&self) -> &ChurchEventService<Self::Store> {
        &self.church_event_service
    }

    fn prayer_service(&self) -> &PrayerService<Self::Store> {
        &self.prayer_service
    }

    fn donation_service(&self) -> &DonationService<Self::Store> {
        &self.donation_service
    }

    fn community_service(&self) -> &CommunityService<Self::Store, Self::UserRepo> {
        &self.community_service
    }

    fn worship_service(&self) -> &WorshipService<Self::Store> {
        &self.worship_service
    }

    fn group_service(&self) -> &GroupService<Self::Store> {
        &self.group_service
    }

    fn prometheus_handle(&self) -> Option<&PrometheusHandle> {
        None
    }

    async fn check_ready(&self) -> (bool, bool) {
        (true, true)
    }
}

// ============================================================================
// Request helpers
// ============================================================================

/// Bearer token and `x-tenant-id` header to send, either may be absent
#[derive(Debug, Clone, Default)]
pub struct Caller {
    pub token: Option<String>,
    pub tenant_id: Option<String>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            tenant_id: None,
        }
    }

    /// Token plus the matching tenant header, the usual member call
    pub fn member(token: &str, tenant: &Tenant) -> Self {
        Self {
            token: Some(token.to_string()),
            tenant_id: Some(tenant.id.to_string()),
        }
    }

    pub fn tenant_header(mut self, tenant_id: impl ToString) -> Self {
        self.tenant_id = Some(tenant_id.to_string());
        self
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(
    app: &Router,
    method: Method,
    path: &str,
    caller: &Caller,
    body: Option<Value>,
) -> TestResponse {
    send_with_headers(app, method, path, caller, body, &[]).await
}

pub async fn send_with_headers(
    app: &Router,
    method: Method,
    path: &str,
    caller: &Caller,
    body: Option<Value>,
    extra_headers: &[(&str, &str)],
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = &caller.token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    if let Some(tenant_id) = &caller.tenant_id {
        builder = builder.header("x-tenant-id", tenant_id);
    }
    for (name, value) in extra_headers {
        builder = builder.header(*name, *value);
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()));

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get_json(app: &Router, path: &str, caller: &Caller) -> TestResponse {
    send(app, Method::GET, path, caller, None).await
}

pub async fn post_json(app: &Router, path: &str, caller: &Caller, body: Value) -> TestResponse {
    send(app, Method::POST, path, caller, Some(body)).await
}

pub async fn put_json(app: &Router, path: &str, caller: &Caller, body: Value) -> TestResponse {
    send(app, Method::PUT, path, caller, Some(body)).await
}

pub async fn patch_json(app: &Router, path: &str, caller: &Caller, body: Value) -> TestResponse {
    send(app, Method::PATCH, path, caller, Some(body)).await
}

pub async fn delete_json(app: &Router, path: &str, caller: &Caller) -> TestResponse {
    send(app, Method::DELETE, path, caller, None).await
}
