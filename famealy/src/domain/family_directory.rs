//! Family directory: create, join, and look up household groups.

use std::sync::Arc;

use rand::seq::SliceRandom;
use serde_json::json;
use tracing::{debug, info, warn};

use super::DomainError;
use super::family::{
    Family, FamilyId, FamilyName, FamilyValidationError, INVITE_CODE_ALPHABET, INVITE_CODE_LENGTH,
    InviteCode,
};
use super::ports::{FamilyRepository, UsersRepository};
use super::service_support::map_collection_error;
use super::user::User;

/// Number of codes tried before family creation gives up.
pub const INVITE_CODE_ATTEMPTS: usize = 16;

/// Message shown when an invite code matches no family.
pub const UNKNOWN_INVITE_CODE_MESSAGE: &str =
    "Invalid invitation code. Please check with your family!";

/// Source of fresh invite codes.
#[cfg_attr(test, mockall::automock)]
pub trait InviteCodeSource: Send + Sync {
    /// Produce a candidate code. Uniqueness is checked by the caller.
    fn generate(&self) -> Result<InviteCode, FamilyValidationError>;
}

/// Uniformly random codes over `A-Z0-9`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomInviteCodes;

impl InviteCodeSource for RandomInviteCodes {
    fn generate(&self) -> Result<InviteCode, FamilyValidationError> {
        let mut rng = rand::thread_rng();
        let code: String = (0..INVITE_CODE_LENGTH)
            .filter_map(|_| INVITE_CODE_ALPHABET.choose(&mut rng).copied())
            .map(char::from)
            .collect();
        InviteCode::new(code)
    }
}

/// Family create/join/lookup over the shared collections.
///
/// The families collection is replaced whole on every write; concurrent
/// creators race and the later write wins.
#[derive(Clone)]
pub struct FamilyDirectoryService {
    families: Arc<dyn FamilyRepository>,
    users: Arc<dyn UsersRepository>,
    codes: Arc<dyn InviteCodeSource>,
}

impl FamilyDirectoryService {
    /// Create a directory drawing codes from `codes`.
    pub fn new(
        families: Arc<dyn FamilyRepository>,
        users: Arc<dyn UsersRepository>,
        codes: Arc<dyn InviteCodeSource>,
    ) -> Self {
        Self {
            families,
            users,
            codes,
        }
    }

    /// Create a family named `name` with a fresh id and unused invite code.
    ///
    /// Duplicate names are allowed. Fails with `InvalidRequest` for a blank
    /// name, or `InternalError` if no unused code turns up.
    pub async fn create(&self, name: &str) -> Result<Family, DomainError> {
        let family_name = FamilyName::new(name).map_err(|err| {
            DomainError::invalid_request(err.to_string()).with_details(json!({ "field": "name" }))
        })?;
        let mut families = self
            .families
            .load_all()
            .await
            .map_err(map_collection_error)?;

        let invite_code = self.unused_code(&families)?;
        let family = Family::new(FamilyId::random(), family_name, invite_code);
        families.push(family.clone());
        self.families
            .replace_all(&families)
            .await
            .map_err(map_collection_error)?;

        info!(family_id = %family.id(), "family created");
        Ok(family)
    }

    fn unused_code(&self, families: &[Family]) -> Result<InviteCode, DomainError> {
        for attempt in 1..=INVITE_CODE_ATTEMPTS {
            let code = self
                .codes
                .generate()
                .map_err(|err| {
                    DomainError::internal(format!("invite code generation failed: {err}"))
                })?;
            if families.iter().all(|family| family.invite_code() != &code) {
                return Ok(code);
            }
            warn!(attempt, "invite code collided with an existing family");
        }
        Err(DomainError::internal("could not find an unused invite code"))
    }

    /// Find the family whose invite code matches `invite_code`, ignoring
    /// case and surrounding whitespace.
    pub async fn join(&self, invite_code: &str) -> Result<Family, DomainError> {
        let families = self
            .families
            .load_all()
            .await
            .map_err(map_collection_error)?;
        families
            .into_iter()
            .find(|family| family.invite_code().matches(invite_code))
            .ok_or_else(|| {
                debug!("invite code matched no family");
                DomainError::not_found(UNKNOWN_INVITE_CODE_MESSAGE)
                    .with_details(json!({ "inviteCode": invite_code.trim() }))
            })
    }

    /// The family with `id`, if it exists.
    pub async fn find(&self, id: &FamilyId) -> Result<Option<Family>, DomainError> {
        let families = self
            .families
            .load_all()
            .await
            .map_err(map_collection_error)?;
        Ok(families.into_iter().find(|family| family.id() == id))
    }

    /// Every roster entry belonging to `family_id`, in roster order.
    pub async fn members_of(&self, family_id: &FamilyId) -> Result<Vec<User>, DomainError> {
        let users = self
            .users
            .load_all()
            .await
            .map_err(map_collection_error)?;
        Ok(users
            .into_iter()
            .filter(|user| user.family_id() == Some(family_id))
            .collect())
    }
}
