use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{password::HashError, PasswordHasher, TokenService};
use crate::config::AppConfig;
use crate::database::Store;
use crate::handlers;
use crate::services::{AdminService, OrderService, ProductService, SessionService, ShopService, StudentService};

/// Everything a request handler needs, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub hasher: Arc<PasswordHasher>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Result<Self, HashError> {
        Ok(Self {
            tokens: Arc::new(TokenService::from_config(&config.security)),
            hasher: Arc::new(PasswordHasher::from_config(&config.security)?),
            config: Arc::new(config),
            store,
        })
    }

    pub fn students(&self) -> StudentService<'_> {
        StudentService::new(self.store.as_ref(), &self.hasher)
    }

    pub fn admins(&self) -> AdminService<'_> {
        AdminService::new(self.store.as_ref(), &self.hasher)
    }

    pub fn shops(&self) -> ShopService<'_> {
        ShopService::new(self.store.as_ref())
    }

    pub fn products(&self) -> ProductService<'_> {
        ProductService::new(self.store.as_ref())
    }

    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(self.store.as_ref())
    }

    pub fn sessions(&self) -> SessionService<'_> {
        SessionService::new(self.store.as_ref(), &self.hasher, &self.tokens)
    }

    /// Clamp a `?limit=` value to the configured maximum
    pub fn list_limit(&self, requested: Option<i64>) -> i64 {
        self.config.list_limit(requested)
    }
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/api/v1", get(handlers::home))
        .route("/api/v1/", get(handlers::home))
        .route("/api/v1/health", get(handlers::health))
        .merge(login_routes())
        .merge(student_routes())
        .merge(admin_routes())
        .merge(shop_routes())
        .merge(product_routes())
        .merge(order_routes());

    if state.config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn login_routes() -> Router<AppState> {
    use handlers::login;

    Router::new()
        .route("/api/v1/login", post(login::student_login))
        .route("/api/v1/admins/login", post(login::admin_login))
}

fn student_routes() -> Router<AppState> {
    use handlers::students;

    Router::new()
        .route("/api/v1/students", get(students::list).post(students::create))
        .route(
            "/api/v1/students/:student_id",
            get(students::show).put(students::update).delete(students::remove),
        )
}

fn admin_routes() -> Router<AppState> {
    use handlers::admins;

    Router::new()
        .route("/api/v1/admins", get(admins::list).post(admins::create))
        .route(
            "/api/v1/admins/:admin_id",
            get(admins::show).put(admins::update).delete(admins::remove),
        )
}

fn shop_routes() -> Router<AppState> {
    use handlers::shops;

    Router::new()
        .route("/api/v1/shops", get(shops::list))
        .route("/api/v1/shops/:shop_id", get(shops::show))
        // Mutations go through the admin who runs the shop
        .route("/api/v1/admins/:admin_id/shops", post(shops::create))
        .route(
            "/api/v1/admins/:admin_id/shops/:shop_id",
            put(shops::update).delete(shops::remove),
        )
}

fn product_routes() -> Router<AppState> {
    use handlers::products;

    Router::new()
        .route("/api/v1/products", get(products::list))
        .route("/api/v1/products/:product_id", get(products::show))
        .route(
            "/api/v1/shops/:shop_id/products",
            get(products::list_by_shop).post(products::create),
        )
        .route(
            "/api/v1/shops/:shop_id/products/:product_id",
            put(products::update).delete(products::remove),
        )
}

fn order_routes() -> Router<AppState> {
    use handlers::orders;

    Router::new()
        .route("/api/v1/orders", get(orders::list))
        .route("/api/v1/orders/:order_id", get(orders::show))
        .route(
            "/api/v1/students/:student_id/orders",
            get(orders::list_by_student).post(orders::create),
        )
        .route("/api/v1/shops/:shop_id/orders", get(orders::list_by_shop))
        .route(
            "/api/v1/shops/:shop_id/orders/:order_id",
            put(orders::update).delete(orders::remove),
        )
}
