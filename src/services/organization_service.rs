// src/services/organization_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrganizationRepository, ProviderRepository, UserRepository},
    events::{DomainEvent, EventBus},
    models::auth::{User, UserRole},
    models::organization::{
        CreateOrganizationPayload, InviteSubProviderPayload, Organization, OrganizationDetail,
    },
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct OrganizationService {
    organization_repo: OrganizationRepository,
    user_repo: UserRepository,
    provider_repo: ProviderRepository,
    events: EventBus,
    pool: PgPool,
}

impl OrganizationService {
    pub fn new(
        organization_repo: OrganizationRepository,
        user_repo: UserRepository,
        provider_repo: ProviderRepository,
        events: EventBus,
        pool: PgPool,
    ) -> Self {
        Self {
            organization_repo,
            user_repo,
            provider_repo,
            events,
            pool,
        }
    }

    // Cria a organização e, atomicamente, promove o dono a MASTER
    // e o vincula a ela.
    pub async fn create_organization(
        &self,
        owner: &User,
        payload: CreateOrganizationPayload,
    ) -> Result<Organization, AppError> {
        // Regra de serviço: no máximo uma organização por dono
        if self.organization_repo.find_by_owner(owner.id).await?.is_some() {
            return Err(AppError::Conflict("Você já possui uma organização.".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let organization = self
            .organization_repo
            .create_organization(&mut *tx, &payload.name, owner.id)
            .await?;

        self.user_repo
            .set_role_and_organization(&mut *tx, owner.id, UserRole::Master, organization.id)
            .await?;

        tx.commit().await?;

        tracing::info!("Organização {} criada por {}", organization.id, owner.id);

        Ok(organization)
    }

    pub async fn get_for_user(&self, user: &User) -> Result<OrganizationDetail, AppError> {
        let organization = match user.organization_id {
            Some(id) => self.organization_repo.find_by_id(id).await?,
            None => self.organization_repo.find_by_owner(user.id).await?,
        }
        .ok_or(AppError::NotFound("Organização"))?;

        let members = self.organization_repo.list_members(organization.id).await?;

        Ok(OrganizationDetail {
            organization,
            members,
        })
    }

    // Convida um sub-prestador: cria usuário (SUB_PROVIDER) + perfil de
    // prestador já vinculados à organização, na mesma transação.
    pub async fn invite_sub_provider(
        &self,
        caller: &User,
        organization_id: Uuid,
        payload: InviteSubProviderPayload,
    ) -> Result<User, AppError> {
        let organization = self
            .organization_repo
            .find_by_id(organization_id)
            .await?
            .ok_or(AppError::NotFound("Organização"))?;

        // Só o dono convida para a própria organização
        if organization.owner_id != caller.id {
            return Err(AppError::Forbidden);
        }

        if let Some(existing) = self.user_repo.find_by_email(&payload.email).await? {
            if existing.organization_id == Some(organization.id) {
                return Err(AppError::DomainValidation(
                    "Este e-mail já faz parte desta organização.".to_string(),
                ));
            }
            return Err(AppError::EmailAlreadyExists);
        }

        let hashed_password = hash_password(&payload.password).await?;

        let mut tx = self.pool.begin().await?;

        let new_user = self
            .user_repo
            .create_user(
                &mut *tx,
                &payload.username,
                &payload.email,
                &hashed_password,
                UserRole::SubProvider,
                Some(organization.id),
            )
            .await?;

        self.provider_repo
            .create_provider(&mut *tx, new_user.id, &payload.title, None, None, None)
            .await?;

        tx.commit().await?;

        self.events.emit(DomainEvent::SubProviderInvited {
            organization_id: organization.id,
            user_id: new_user.id,
            email: new_user.email.clone(),
        });

        Ok(new_user)
    }
}
