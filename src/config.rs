// src/config.rs

use std::{env, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        CompanyRepository, MembershipRepository, PermissionRepository, RoleRepository,
        UserRepository,
    },
    services::{
        auth_service::TokenIssuer, AuthService, CompanyService, PermissionService, RoleService,
        UserService,
    },
};

const DEFAULT_JWT_EXPIRES_IN_SECS: i64 = 3600;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub role_service: RoleService,
    pub permission_service: PermissionService,
    pub company_service: CompanyService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        // Expiração configurável em segundos; 1h por padrão.
        let jwt_expires_in = env::var("JWT_EXPIRES_IN")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_JWT_EXPIRES_IN_SECS);

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let role_repo = RoleRepository::new(db_pool.clone());
        let permission_repo = PermissionRepository::new(db_pool.clone());
        let company_repo = CompanyRepository::new(db_pool.clone());
        let membership_repo = MembershipRepository::new(db_pool.clone());

        let tokens = TokenIssuer::new(jwt_secret, jwt_expires_in);

        let auth_service = AuthService::new(user_repo.clone(), tokens);
        let user_service = UserService::new(user_repo.clone());
        let role_service = RoleService::new(
            role_repo.clone(),
            permission_repo.clone(),
            company_repo.clone(),
            db_pool.clone(),
        );
        let permission_service = PermissionService::new(permission_repo);
        let company_service = CompanyService::new(
            company_repo,
            membership_repo,
            role_repo,
            user_repo,
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            auth_service,
            user_service,
            role_service,
            permission_service,
            company_service,
        })
    }
}
