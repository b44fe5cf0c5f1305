// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas: sem o gate)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Autoatendimento e administração de usuários
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/", get(handlers::users::list_users))
        .route(
            "/{id}",
            get(handlers::users::get_user)
                .patch(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route("/{id}/restore", post(handlers::users::restore_user));

    let role_routes = Router::new()
        .route(
            "/",
            post(handlers::roles::create_role).get(handlers::roles::list_roles),
        )
        .route(
            "/{id}",
            get(handlers::roles::get_role)
                .patch(handlers::roles::update_role)
                .delete(handlers::roles::delete_role),
        )
        .route("/{id}/restore", post(handlers::roles::restore_role));

    let permission_routes = Router::new()
        .route(
            "/",
            post(handlers::permissions::create_permission)
                .get(handlers::permissions::list_permissions),
        )
        .route(
            "/{id}",
            get(handlers::permissions::get_permission)
                .patch(handlers::permissions::update_permission)
                .delete(handlers::permissions::delete_permission),
        )
        .route(
            "/{id}/restore",
            post(handlers::permissions::restore_permission),
        );

    let company_routes = Router::new()
        .route(
            "/",
            post(handlers::companies::create_company).get(handlers::companies::list_companies),
        )
        .route("/current", get(handlers::companies::current_company))
        .route(
            "/{id}",
            get(handlers::companies::get_company)
                .patch(handlers::companies::update_company)
                .delete(handlers::companies::delete_company),
        )
        .route("/{id}/restore", post(handlers::companies::restore_company))
        .route(
            "/{id}/members/{user_id}",
            put(handlers::companies::upsert_member),
        )
        .route("/{id}/members", get(handlers::companies::list_members));

    // Tudo que não é público passa pelo gate de autenticação.
    let protected = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/roles", role_routes)
        .nest("/api/permissions", permission_routes)
        .nest("/api/companies", company_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
