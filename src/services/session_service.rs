use tracing::{info, warn};
use uuid::Uuid;

use super::ServiceError;
use crate::auth::{PasswordHasher, TokenService};
use crate::database::Store;
use crate::models::{Account, Credentials, Payload};
use crate::types::Role;

/// Exchanges email and password for a bearer token
pub struct SessionService<'a> {
    store: &'a dyn Store,
    hasher: &'a PasswordHasher,
    tokens: &'a TokenService,
}

impl<'a> SessionService<'a> {
    pub fn new(store: &'a dyn Store, hasher: &'a PasswordHasher, tokens: &'a TokenService) -> Self {
        Self { store, hasher, tokens }
    }

    pub async fn login(&self, role: Role, payload: Payload<Credentials>) -> Result<String, ServiceError> {
        let credentials = payload.decode()?;
        credentials.validate()?;
        let email = credentials.email.as_deref().unwrap_or_default();
        let password = credentials.password.as_deref().unwrap_or_default();

        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        let found: Option<(Uuid, Account)> = match role {
            Role::Student => tables.find_student_by_email(email).await?.map(|s| (s.id, s.account)),
            Role::Admin => tables.find_admin_by_email(email).await?.map(|a| (a.id, a.account)),
        };

        let Some((id, account)) = found else {
            warn!(?role, "Login for unknown email");
            return Err(ServiceError::InvalidCredentials);
        };
        if !self.hasher.verify(password, &account.password)? {
            warn!(?role, %id, "Login with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.tokens.issue(&id.to_string(), role)?;
        info!(?role, %id, "Issued token");
        Ok(token)
    }
}
