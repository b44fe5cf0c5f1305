// src/services/auth_service.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, RoleClaim},
    models::user::User,
};

// Hash fixo usado quando o e-mail não existe: o custo do bcrypt é pago
// nos dois ramos de falha, para não revelar pelo tempo de resposta se o
// e-mail está cadastrado.
const DUMMY_HASH: &str = "$2a$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

/// Emissão e verificação de tokens, separadas do acesso a banco.
/// O token carrega a foto dos perfis/permissões no momento da emissão;
/// mudanças posteriores só passam a valer em um novo login.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    expires_in_secs: i64,
}

impl TokenIssuer {
    pub fn new(secret: String, expires_in_secs: i64) -> Self {
        Self { secret, expires_in_secs }
    }

    pub fn issue(
        &self,
        user_id: Uuid,
        email: &str,
        roles: Vec<RoleClaim>,
        company_id: Option<Uuid>,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(self.expires_in_secs);

        let claims = Claims {
            sub: user_id,
            email: email.to_owned(),
            roles,
            company_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )?)
    }

    // Assinatura ou expiração inválidas viram o mesmo InvalidToken.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, tokens: TokenIssuer) -> Self {
        Self { user_repo, tokens }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<String, AppError> {
        // Unicidade só entre usuários vivos; o índice parcial é o backstop.
        if self.user_repo.email_in_use(email, None).await? {
            return Err(AppError::EmailAlreadyExists);
        }

        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let new_user = self.user_repo.insert(email, &hashed_password).await?;

        // Usuário recém-criado ainda não tem vínculos nem perfis.
        self.tokens.issue(new_user.id, &new_user.email, Vec::new(), None)
    }

    // Login: verifica credenciais e devolve o token com as claims de
    // autorização resolvidas. Os dois ramos de falha (e-mail inexistente e
    // senha errada) produzem o mesmo erro com a mesma mensagem.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let maybe_user = self.user_repo.find_by_email(email).await?;

        let Some(user) = maybe_user else {
            // Paga o custo da verificação mesmo sem usuário.
            let password_clone = password.to_owned();
            let _ = tokio::task::spawn_blocking(move || verify(&password_clone, DUMMY_HASH))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))?;
            return Err(AppError::InvalidCredentials);
        };

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.issue_for(&user).await
    }

    async fn issue_for(&self, user: &User) -> Result<String, AppError> {
        let roles = self.user_repo.load_role_claims(user.id).await?;
        let company_id = self.user_repo.default_company(user.id).await?;
        self.tokens.issue(user.id, &user.email, roles, company_id)
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        self.tokens.decode(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("segredo-de-teste".into(), 3600)
    }

    fn roles_de_exemplo() -> Vec<RoleClaim> {
        vec![RoleClaim {
            code: "VENDEDOR".into(),
            permissions: vec!["empresas:read".into(), "usuarios:read".into()],
        }]
    }

    #[test]
    fn token_carrega_sub_email_e_perfis() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let company_id = Uuid::new_v4();

        let token = issuer
            .issue(user_id, "a@b.com", roles_de_exemplo(), Some(company_id))
            .unwrap();
        let claims = issuer.decode(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.company_id, Some(company_id));
        assert_eq!(claims.roles, roles_de_exemplo());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_expirado_e_rejeitado() {
        // Expiração no passado além da tolerância padrão de 60s.
        let issuer = TokenIssuer::new("segredo-de-teste".into(), -120);
        let token = issuer
            .issue(Uuid::new_v4(), "a@b.com", Vec::new(), None)
            .unwrap();

        let err = issuer.decode(&token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn token_com_segredo_errado_e_rejeitado() {
        let token = issuer()
            .issue(Uuid::new_v4(), "a@b.com", Vec::new(), None)
            .unwrap();

        let outro = TokenIssuer::new("outro-segredo".into(), 3600);
        assert!(matches!(outro.decode(&token).unwrap_err(), AppError::InvalidToken));
    }

    #[test]
    fn hash_dummy_e_um_bcrypt_valido() {
        // O ramo sem usuário depende de DUMMY_HASH ser decodificável pelo
        // bcrypt; verify deve responder sem erro (true ou false, tanto faz).
        assert!(verify("qualquer-senha", DUMMY_HASH).is_ok());
    }

    #[test]
    fn verify_aceita_e_rejeita_senha() {
        let hashed = hash("senha-correta", 4).unwrap();
        assert!(verify("senha-correta", &hashed).unwrap());
        assert!(!verify("senha-errada", &hashed).unwrap());
    }
}
