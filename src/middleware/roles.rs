// src/middleware/roles.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

/// 1. O Trait que define um conjunto de papéis aceitos
pub trait RoleSet: Send + Sync + 'static {
    fn allows(role: UserRole) -> bool;
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleSet,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<User>().ok_or(AppError::InvalidToken)?;

        if !T::allows(user.role) {
            return Err(AppError::Forbidden);
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// CONJUNTOS DE PAPÉIS
// ---

// Qualquer prestador: INDIVIDUAL, MASTER ou SUB_PROVIDER
pub struct ProviderAccess;
impl RoleSet for ProviderAccess {
    fn allows(role: UserRole) -> bool {
        role.is_provider()
    }
}

// Apenas o dono de organização
pub struct MasterAccess;
impl RoleSet for MasterAccess {
    fn allows(role: UserRole) -> bool {
        matches!(role, UserRole::Master)
    }
}

pub struct ClientAccess;
impl RoleSet for ClientAccess {
    fn allows(role: UserRole) -> bool {
        matches!(role, UserRole::Client)
    }
}

// Escopo de organização: MASTER passa direto; os demais papéis precisam
// pertencer à organização da rota.
pub fn ensure_organization_scope(user: &User, organization_id: Uuid) -> Result<(), AppError> {
    if user.role == UserRole::Master {
        return Ok(());
    }

    match user.organization_id {
        Some(id) if id == organization_id => Ok(()),
        _ => Err(AppError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with(role: UserRole, organization_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            username: "teste".to_string(),
            email: "teste@email.com".to_string(),
            password_hash: "hash".to_string(),
            role,
            organization_id,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn acesso_de_prestador_cobre_os_tres_papeis() {
        assert!(ProviderAccess::allows(UserRole::Individual));
        assert!(ProviderAccess::allows(UserRole::Master));
        assert!(ProviderAccess::allows(UserRole::SubProvider));
        assert!(!ProviderAccess::allows(UserRole::Client));
    }

    #[test]
    fn master_ignora_escopo_de_organizacao() {
        let user = user_with(UserRole::Master, None);
        assert!(ensure_organization_scope(&user, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn sub_provider_precisa_pertencer_a_organizacao() {
        let org_id = Uuid::new_v4();
        let member = user_with(UserRole::SubProvider, Some(org_id));
        let outsider = user_with(UserRole::SubProvider, Some(Uuid::new_v4()));
        let unlinked = user_with(UserRole::SubProvider, None);

        assert!(ensure_organization_scope(&member, org_id).is_ok());
        assert!(matches!(
            ensure_organization_scope(&outsider, org_id),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            ensure_organization_scope(&unlinked, org_id),
            Err(AppError::Forbidden)
        ));
    }
}
