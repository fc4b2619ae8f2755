//! Security Question Catalog
//!
//! Fixed, versioned catalog of security questions. Registration validates
//! selected question identifiers against this catalog, and account recovery
//! resolves stored identifiers back to display prompts.

use serde::{Deserialize, Serialize};

/// Catalog version, bumped whenever the question list changes.
pub const CATALOG_VERSION: u32 = 1;

/// Identifier of a security question in the fixed catalog.
///
/// Stored as its snake_case key (e.g. `favorite_pet_name`) so that catalog
/// reordering never changes what a user row means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityQuestionId {
    BestFriendElementary,
    FavoritePetName,
    FavoriteTeacherHs,
    FirstCrushName,
    MotherMaidenName,
    CityOfBirth,
    FirstCarModel,
    ChildhoodNickname,
    FavoriteBook,
    PaternalGrandmotherName,
    FirstConcert,
    DreamJob,
}

impl SecurityQuestionId {
    /// All catalog entries, in display order.
    pub const ALL: [SecurityQuestionId; 12] = [
        SecurityQuestionId::BestFriendElementary,
        SecurityQuestionId::FavoritePetName,
        SecurityQuestionId::FavoriteTeacherHs,
        SecurityQuestionId::FirstCrushName,
        SecurityQuestionId::MotherMaidenName,
        SecurityQuestionId::CityOfBirth,
        SecurityQuestionId::FirstCarModel,
        SecurityQuestionId::ChildhoodNickname,
        SecurityQuestionId::FavoriteBook,
        SecurityQuestionId::PaternalGrandmotherName,
        SecurityQuestionId::FirstConcert,
        SecurityQuestionId::DreamJob,
    ];

    /// Stable storage key for this question.
    pub fn key(self) -> &'static str {
        match self {
            SecurityQuestionId::BestFriendElementary => "best_friend_elementary",
            SecurityQuestionId::FavoritePetName => "favorite_pet_name",
            SecurityQuestionId::FavoriteTeacherHs => "favorite_teacher_hs",
            SecurityQuestionId::FirstCrushName => "first_crush_name",
            SecurityQuestionId::MotherMaidenName => "mother_maiden_name",
            SecurityQuestionId::CityOfBirth => "city_of_birth",
            SecurityQuestionId::FirstCarModel => "first_car_model",
            SecurityQuestionId::ChildhoodNickname => "childhood_nickname",
            SecurityQuestionId::FavoriteBook => "favorite_book",
            SecurityQuestionId::PaternalGrandmotherName => "paternal_grandmother_name",
            SecurityQuestionId::FirstConcert => "first_concert",
            SecurityQuestionId::DreamJob => "dream_job",
        }
    }

    /// Look a question up by its storage key.
    pub fn from_key(key: &str) -> Option<SecurityQuestionId> {
        SecurityQuestionId::ALL.into_iter().find(|q| q.key() == key)
    }

    /// Human-readable prompt shown during registration and recovery.
    pub fn prompt(self) -> &'static str {
        match self {
            SecurityQuestionId::BestFriendElementary => "Who is your best friend in Elementary?",
            SecurityQuestionId::FavoritePetName => "What is the name of your favorite pet?",
            SecurityQuestionId::FavoriteTeacherHs => "Who is your favorite teacher in high school?",
            SecurityQuestionId::FirstCrushName => "What is the name of your first crush?",
            SecurityQuestionId::MotherMaidenName => "What is your mother's maiden name?",
            SecurityQuestionId::CityOfBirth => "In what city were you born?",
            SecurityQuestionId::FirstCarModel => "What was the model of your first car?",
            SecurityQuestionId::ChildhoodNickname => "What was your childhood nickname?",
            SecurityQuestionId::FavoriteBook => "What is your favorite book?",
            SecurityQuestionId::PaternalGrandmotherName => {
                "What is your paternal grandmother's first name?"
            }
            SecurityQuestionId::FirstConcert => "What was the first concert you attended?",
            SecurityQuestionId::DreamJob => "What was your dream job as a child?",
        }
    }
}

/// Resolve a stored question key to its prompt, falling back to the raw key
/// for entries that predate the current catalog.
pub fn prompt_for_key(key: &str) -> String {
    match SecurityQuestionId::from_key(key) {
        Some(question) => question.prompt().to_string(),
        None => key.to_string(),
    }
}
