//! Server initialization and routing

use crate::api;
use crate::cache::{CacheManager, CacheOperations, NoOpCacheManager};
use crate::config::{Config, CorsConfig};
use crate::email::{EmailSender, LogEmailSender};
use crate::events::{EventPublisher, QueueEventPublisher};
use crate::jwt::JwtManager;
use crate::middleware::{
    normalize_error_response, resolve_context, ContextGuard, ObservabilityLayer,
    SanitizedMakeSpan,
};
use crate::migration;
use crate::policy::{
    RoutePolicy, ADMIN_CLERGY, ADMIN_CLERGY_LEADER, CHURCH_ADMIN, MEMBERS, SUPER_ADMIN,
};
use crate::queue::{JobQueue, RedisJobQueue};
use crate::repository::{
    JoinCodeRepositoryImpl, MembershipRepositoryImpl, ScopedStore, TenantRepositoryImpl,
    UserRepositoryImpl,
};
use crate::service::{
    AuthService, ChurchEventService, CommunityService, DonationService, GroupService,
    MembershipService, PrayerService, SermonService, TenantService, WorshipService,
};
use crate::state::HasServices;
use anyhow::Result;
use axum::{
    http::{HeaderName, HeaderValue},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post, put, MethodRouter},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: MySqlPool,
    pub cache: Arc<dyn CacheOperations>,
    pub jwt_manager: JwtManager,
    pub prometheus_handle: Option<PrometheusHandle>,
    pub tenant_service: Arc<TenantService<TenantRepositoryImpl, JoinCodeRepositoryImpl>>,
    pub auth_service: Arc<
        AuthService<
            UserRepositoryImpl,
            MembershipRepositoryImpl,
            TenantRepositoryImpl,
            JoinCodeRepositoryImpl,
        >,
    >,
    pub membership_service: Arc<MembershipService<MembershipRepositoryImpl, UserRepositoryImpl>>,
    pub sermon_service: Arc<SermonService<ScopedStore>>,
    pub church_event_service: Arc<ChurchEventService<ScopedStore>>,
    pub prayer_service: Arc<PrayerService<ScopedStore>>,
    pub donation_service: Arc<DonationService<ScopedStore>>,
    pub community_service: Arc<CommunityService<ScopedStore, UserRepositoryImpl>>,
    pub worship_service: Arc<WorshipService<ScopedStore>>,
    pub group_service: Arc<GroupService<ScopedStore>>,
}

impl HasServices for AppState {
    type TenantRepo = TenantRepositoryImpl;
    type JoinCodeRepo = JoinCodeRepositoryImpl;
    type UserRepo = UserRepositoryImpl;
    type MembershipRepo = MembershipRepositoryImpl;
    type Store = ScopedStore;

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
        self.prometheus_handle.as_ref()
    }

    async fn check_ready(&self) -> (bool, bool) {
        let db_ok = sqlx::query("SELECT 1").execute(&self.db_pool).await.is_ok();
        let cache_ok = self.cache.ping().await.is_ok();
        (db_ok, cache_ok)
    }
}

/// Open every connection once, wire the services and serve until shutdown
pub async fn run(config: Config, prometheus_handle: Option<PrometheusHandle>) -> Result<()> {
    let db_pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout_secs))
        .connect(&config.database.url)
        .await?;
    info!("Connected to database");

    migration::migrate(&db_pool).await?;

    // Tenant cache is best-effort; reads fall back to the database
    let cache: Arc<dyn CacheOperations> = match CacheManager::new(&config.redis).await {
        Ok(manager) => {
            info!("Connected to Redis");
            Arc::new(manager)
        }
        Err(e) => {
            warn!(error = %e, "Redis unavailable, tenant cache disabled");
            Arc::new(NoOpCacheManager::new())
        }
    };

    let queue: Arc<dyn JobQueue> = Arc::new(RedisJobQueue::new(&config.redis, &config.queue).await?);
    let events: Arc<dyn EventPublisher> = Arc::new(QueueEventPublisher::new(
        queue,
        config.queue.notifications_queue.clone(),
    ));
    let email: Arc<dyn EmailSender> = Arc::new(LogEmailSender);

    // Repositories
    let tenant_repo = Arc::new(TenantRepositoryImpl::new(db_pool.clone()));
    let join_code_repo = Arc::new(JoinCodeRepositoryImpl::new(db_pool.clone()));
    let user_repo = Arc::new(UserRepositoryImpl::new(db_pool.clone()));
    let membership_repo = Arc::new(MembershipRepositoryImpl::new(db_pool.clone()));
    let store = Arc::new(ScopedStore::new(db_pool.clone()));

    let jwt_manager = JwtManager::new(config.jwt.clone());

    // Services
    let tenant_service = Arc::new(TenantService::new(
        tenant_repo,
        join_code_repo,
        cache.clone(),
    ));
    let auth_service = Arc::new(AuthService::new(
        user_repo.clone(),
        membership_repo.clone(),
        tenant_service.clone(),
        jwt_manager.clone(),
        email,
        events.clone(),
    ));
    let membership_service = Arc::new(MembershipService::new(membership_repo, user_repo.clone()));
    let sermon_service = Arc::new(SermonService::new(store.clone(), events.clone()));
    let church_event_service = Arc::new(ChurchEventService::new(store.clone(), events.clone()));
    let prayer_service = Arc::new(PrayerService::new(store.clone(), events.clone()));
    let donation_service = Arc::new(DonationService::new(store.clone(), events.clone()));
    let community_service = Arc::new(CommunityService::new(
        store.clone(),
        user_repo,
        events.clone(),
    ));
    let worship_service = Arc::new(WorshipService::new(store.clone(), events));
    let group_service = Arc::new(GroupService::new(store));

    let state = AppState {
        config: Arc::new(config.clone()),
        db_pool: db_pool.clone(),
        cache,
        jwt_manager,
        prometheus_handle,
        tenant_service,
        auth_service,
        membership_service,
        sermon_service,
        church_event_service,
        prayer_service,
        donation_service,
        community_service,
        worship_service,
        group_service,
    };

    let app = build_router(state);

    let http_addr = config.http_addr();
    let listener = TcpListener::bind(&http_addr).await?;
    info!("HTTP server started on {}", http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_pool.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, draining connections");
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.allows_any() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            config
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok()),
        )
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static("x-request-id")])
}

/// Attaches context guards to method routers
struct Guard {
    jwt: JwtManager,
}

impl Guard {
    fn gate<S: HasServices>(&self, policy: RoutePolicy, route: MethodRouter<S>) -> MethodRouter<S> {
        route.route_layer(from_fn_with_state(
            ContextGuard::new(self.jwt.clone(), policy),
            resolve_context,
        ))
    }
}

pub fn build_router<S: HasServices>(state: S) -> Router {
    let guard = Guard {
        jwt: state.jwt_manager().clone(),
    };
    let cors = cors_layer(&state.config().cors);

    let public = RoutePolicy::PUBLIC;
    let authenticated = RoutePolicy::AUTHENTICATED;
    let platform_admin = RoutePolicy::authenticated(SUPER_ADMIN);
    let church_owner = RoutePolicy::authenticated(CHURCH_ADMIN);
    let members = RoutePolicy::tenant(MEMBERS);
    let admins = RoutePolicy::tenant(CHURCH_ADMIN);
    let preachers = RoutePolicy::tenant(ADMIN_CLERGY);
    let organizers = RoutePolicy::tenant(ADMIN_CLERGY_LEADER);

    Router::new()
        // Health and metrics
        .route("/health", get(api::health::health))
        .route("/ready", get(api::health::ready::<S>))
        .route("/metrics", get(api::metrics::metrics_handler::<S>))
        // Auth
        .route(
            "/api/v1/auth/register",
            guard.gate(public, post(api::auth::register::<S>)),
        )
        .route(
            "/api/v1/auth/login",
            guard.gate(public, post(api::auth::login::<S>)),
        )
        .route(
            "/api/v1/auth/refresh",
            guard.gate(public, post(api::auth::refresh::<S>)),
        )
        .route(
            "/api/v1/auth/logout",
            guard.gate(authenticated, post(api::auth::logout::<S>)),
        )
        .route(
            "/api/v1/auth/me",
            guard.gate(authenticated, get(api::auth::me::<S>)),
        )
        .route(
            "/api/v1/auth/verify-email",
            guard.gate(authenticated, post(api::auth::verify_email::<S>)),
        )
        .route(
            "/api/v1/auth/resend-verification",
            guard.gate(authenticated, post(api::auth::resend_verification::<S>)),
        )
        // Churches
        .route(
            "/api/v1/tenants",
            guard
                .gate(public, post(api::tenant::create::<S>))
                .merge(guard.gate(platform_admin, get(api::tenant::list::<S>))),
        )
        .route(
            "/api/v1/tenants/join",
            guard.gate(public, post(api::tenant::join::<S>)),
        )
        .route(
            "/api/v1/tenants/slug/{slug}",
            guard.gate(authenticated, get(api::tenant::get_by_slug::<S>)),
        )
        .route(
            "/api/v1/tenants/{id}",
            guard
                .gate(authenticated, get(api::tenant::get::<S>))
                .merge(guard.gate(church_owner, put(api::tenant::update::<S>)))
                .merge(guard.gate(platform_admin, delete(api::tenant::delete::<S>))),
        )
        .route(
            "/api/v1/tenants/{id}/join-code/regenerate",
            guard.gate(church_owner, post(api::tenant::regenerate_join_code::<S>)),
        )
        .route(
            "/api/v1/tenants/{id}/join-codes",
            guard.gate(
                church_owner,
                get(api::tenant::list_join_codes::<S>).post(api::tenant::create_join_code::<S>),
            ),
        )
        .route(
            "/api/v1/tenants/{id}/join-codes/{code_id}",
            guard.gate(church_owner, delete(api::tenant::deactivate_join_code::<S>)),
        )
        // Memberships
        .route(
            "/api/v1/memberships",
            guard.gate(admins, get(api::membership::list::<S>)),
        )
        .route(
            "/api/v1/memberships/{user_id}",
            guard.gate(
                admins,
                get(api::membership::get::<S>).patch(api::membership::update::<S>),
            ),
        )
        // Sermons
        .route(
            "/api/v1/sermons",
            guard
                .gate(members, get(api::sermon::list::<S>))
                .merge(guard.gate(preachers, post(api::sermon::create::<S>))),
        )
        .route(
            "/api/v1/sermons/speakers",
            guard.gate(members, get(api::sermon::speakers::<S>)),
        )
        .route(
            "/api/v1/sermons/tags",
            guard.gate(members, get(api::sermon::tags::<S>)),
        )
        .route(
            "/api/v1/sermons/{id}",
            guard
                .gate(members, get(api::sermon::get::<S>))
                .merge(guard.gate(preachers, put(api::sermon::update::<S>)))
                .merge(guard.gate(admins, delete(api::sermon::delete::<S>))),
        )
        .route(
            "/api/v1/sermons/{id}/publish",
            guard.gate(preachers, patch(api::sermon::publish::<S>)),
        )
        // Events
        .route(
            "/api/v1/events",
            guard
                .gate(members, get(api::church_event::list::<S>))
                .merge(guard.gate(organizers, post(api::church_event::create::<S>))),
        )
        .route(
            "/api/v1/events/{id}",
            guard
                .gate(members, get(api::church_event::get::<S>))
                .merge(guard.gate(admins, delete(api::church_event::delete::<S>))),
        )
        .route(
            "/api/v1/events/{id}/register",
            guard.gate(
                members,
                post(api::church_event::register::<S>)
                    .delete(api::church_event::unregister::<S>),
            ),
        )
        // Prayer
        .route(
            "/api/v1/prayer",
            guard.gate(
                members,
                get(api::prayer::list::<S>).post(api::prayer::create::<S>),
            ),
        )
        .route(
            "/api/v1/prayer/my-prayers",
            guard.gate(members, get(api::prayer::mine::<S>)),
        )
        .route(
            "/api/v1/prayer/{id}",
            guard.gate(members, get(api::prayer::get::<S>)),
        )
        .route(
            "/api/v1/prayer/{id}/pray",
            guard.gate(members, post(api::prayer::pray::<S>)),
        )
        .route(
            "/api/v1/prayer/{id}/answered",
            guard.gate(members, put(api::prayer::mark_answered::<S>)),
        )
        // Giving
        .route(
            "/api/v1/give/donate",
            guard.gate(members, post(api::donation::donate::<S>)),
        )
        .route(
            "/api/v1/give/my-donations",
            guard.gate(members, get(api::donation::mine::<S>)),
        )
        .route(
            "/api/v1/give/stats",
            guard.gate(admins, get(api::donation::stats::<S>)),
        )
        .route(
            "/api/v1/give/donations/{id}/status",
            guard.gate(admins, patch(api::donation::update_status::<S>)),
        )
        // Community
        .route(
            "/api/v1/community/posts",
            guard.gate(
                members,
                get(api::community::list::<S>).post(api::community::create::<S>),
            ),
        )
        .route(
            "/api/v1/community/posts/{id}",
            guard.gate(members, delete(api::community::delete::<S>)),
        )
        .route(
            "/api/v1/community/posts/{id}/like",
            guard.gate(members, post(api::community::toggle_like::<S>)),
        )
        // Groups
        .route(
            "/api/v1/groups",
            guard
                .gate(members, get(api::group::list::<S>))
                .merge(guard.gate(organizers, post(api::group::create::<S>))),
        )
        .route(
            "/api/v1/groups/my-groups",
            guard.gate(members, get(api::group::mine::<S>)),
        )
        .route(
            "/api/v1/groups/{id}",
            guard.gate(
                members,
                get(api::group::get::<S>)
                    .put(api::group::update::<S>)
                    .delete(api::group::delete::<S>),
            ),
        )
        .route(
            "/api/v1/groups/{id}/join",
            guard.gate(members, post(api::group::join::<S>)),
        )
        .route(
            "/api/v1/groups/{id}/leave",
            guard.gate(members, delete(api::group::leave::<S>)),
        )
        // Worship
        .route(
            "/api/v1/worships/sets",
            guard
                .gate(members, get(api::worship::list::<S>))
                .merge(guard.gate(organizers, post(api::worship::create::<S>))),
        )
        .route(
            "/api/v1/worships/sets/{id}",
            guard.gate(members, get(api::worship::get::<S>)).merge(guard.gate(
                organizers,
                put(api::worship::update::<S>).delete(api::worship::delete::<S>),
            )),
        )
        .route(
            "/api/v1/worships/sets/{id}/publish",
            guard.gate(organizers, patch(api::worship::publish::<S>)),
        )
        // Outermost last: trace, observability, CORS, error boundary
        .layer(from_fn(normalize_error_response))
        .layer(cors)
        .layer(ObservabilityLayer)
        .layer(TraceLayer::new_for_http().make_span_with(SanitizedMakeSpan))
        .with_state(state)
}
