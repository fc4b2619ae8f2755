//! Account Recovery Service
//!
//! The two-stage security-question recovery protocol: identify the account,
//! verify all three answers, then set a replacement password while holding
//! the resulting single-use authorization. Unlike login, the identifier
//! stage deliberately reveals whether the account exists; that narrower
//! information-exposure trade-off is part of the recovery design.

use std::sync::Arc;
use thiserror::Error;

use crate::models::{
    prompt_for_key, RecoveryAuthorization, RecoveryChallengeResponse, SecurityPrompt,
};
use crate::store::{CredentialStore, StoreError};
use crate::utils::{
    error::{AppError, FieldErrors},
    security::{constant_time_compare, hash_secret_with_cost, verify_secret},
    validation::password_strength_validator,
};

/// Recovery errors
#[derive(Error, Debug)]
pub enum RecoveryError {
    /// No account matches the identifier; revealed on purpose at this step
    #[error("User not found.")]
    UserNotFound,

    /// An answer and its re-entry confirmation differ
    #[error("Your answers and re-enter answers do not match.")]
    ConfirmationMismatch,

    /// One or more answers failed verification; never says which
    #[error("One or more of the provided answers were incorrect. Please try again.")]
    AnswersIncorrect,

    /// Replacement password failed the strength rules
    #[error("Validation failed for {} field(s)", .0.len())]
    WeakPassword(FieldErrors),

    /// Replacement password and its confirmation differ
    #[error("Passwords do not match.")]
    PasswordMismatch,

    /// Backing-store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Hashing failure
    #[error("hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

impl From<RecoveryError> for AppError {
    fn from(error: RecoveryError) -> Self {
        match error {
            RecoveryError::UserNotFound => AppError::NotFound("User not found.".to_string()),
            RecoveryError::ConfirmationMismatch => AppError::Validation(FieldErrors::single(
                "confirmations",
                "Your answers and re-enter answers do not match.",
            )),
            RecoveryError::AnswersIncorrect => AppError::Authentication(
                "One or more of the provided answers were incorrect. Please try again.".to_string(),
            ),
            RecoveryError::WeakPassword(fields) => AppError::Validation(fields),
            RecoveryError::PasswordMismatch => AppError::Validation(FieldErrors::single(
                "confirm_password",
                "Passwords do not match.",
            )),
            RecoveryError::Store(e) => AppError::Store(e),
            RecoveryError::Hashing(e) => AppError::Hashing(e),
        }
    }
}

/// Result type for recovery operations
pub type RecoveryResult<T> = Result<T, RecoveryError>;

/// Drives the recovery state machine against the credential store.
pub struct RecoveryService {
    store: Arc<dyn CredentialStore>,
    bcrypt_cost: u32,
}

impl RecoveryService {
    pub fn new(store: Arc<dyn CredentialStore>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    /// Stage one: resolve the identifier and hand back the three question
    /// prompts. The stored answers are never echoed, only freshly
    /// re-collected.
    pub async fn begin_recovery(
        &self,
        identifier: &str,
    ) -> RecoveryResult<RecoveryChallengeResponse> {
        let user = self
            .store
            .find_by_identifier(identifier)
            .await?
            .ok_or(RecoveryError::UserNotFound)?;

        let prompts = user
            .question_keys()
            .iter()
            .map(|key| SecurityPrompt {
                id: key.to_string(),
                prompt: prompt_for_key(key),
            })
            .collect();

        Ok(RecoveryChallengeResponse {
            user_id: user.id,
            username: user.username,
            prompts,
        })
    }

    /// Stage two: verify all three answers. All or nothing: a single
    /// mismatch yields the same generic error with no hint of which answer
    /// failed, and no authorization is created.
    pub async fn submit_answers(
        &self,
        user_id: uuid::Uuid,
        answers: &[String; 3],
        confirmations: &[String; 3],
    ) -> RecoveryResult<RecoveryAuthorization> {
        // Each answer must equal its own re-entry, enforced server-side.
        let confirmed = constant_time_compare(&answers[0], &confirmations[0])
            & constant_time_compare(&answers[1], &confirmations[1])
            & constant_time_compare(&answers[2], &confirmations[2]);
        if !confirmed {
            return Err(RecoveryError::ConfirmationMismatch);
        }

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(RecoveryError::UserNotFound)?;

        // Every slot is verified before the verdict is combined.
        let mut all_correct = true;
        for (answer, stored_hash) in answers.iter().zip(user.answer_hashes()) {
            let correct = !answer.is_empty() && verify_secret(answer, stored_hash)?;
            all_correct &= correct;
        }

        if !all_correct {
            log::warn!("recovery answer verification failed for user {}", user.id);
            return Err(RecoveryError::AnswersIncorrect);
        }

        Ok(RecoveryAuthorization::new(user.id))
    }

    /// Terminal stage: overwrite the password under a live authorization.
    ///
    /// Takes the authorization by value, so it cannot be presented twice. The
    /// password re-runs the registration strength rules, and a successful
    /// write also clears the failure counter and any lockout.
    pub async fn set_new_password(
        &self,
        authorization: RecoveryAuthorization,
        new_password: &str,
        confirm_password: &str,
    ) -> RecoveryResult<()> {
        let mut errors = FieldErrors::new();
        if new_password.is_empty() {
            errors.insert("new_password", "New password cannot be empty.");
        } else {
            if new_password.len() < 8 {
                errors.insert(
                    "new_password",
                    "Password must be at least 8 characters long.",
                );
            }
            if let Err(strength) = password_strength_validator(new_password) {
                let message = strength
                    .message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Password is too weak.".to_string());
                errors.insert("new_password", message);
            }
        }
        if !errors.is_empty() {
            return Err(RecoveryError::WeakPassword(errors));
        }

        if !constant_time_compare(new_password, confirm_password) {
            return Err(RecoveryError::PasswordMismatch);
        }

        let password_hash = hash_secret_with_cost(new_password, self.bcrypt_cost)?;
        self.store
            .reset_password(authorization.authorized_user_id, &password_hash)
            .await
            .map_err(|error| match error {
                StoreError::NotFound => RecoveryError::UserNotFound,
                other => other.into(),
            })?;

        log::info!(
            "password reset via recovery for user {}",
            authorization.authorized_user_id
        );
        Ok(())
    }
}
