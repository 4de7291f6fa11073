// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! # API Data Models
//!
//! DTOs mirrored from the GraphQL schema. Field names follow the schema's
//! camelCase on the wire. Enumerations keep unknown values so a newer backend
//! does not break older clients.
//!
//! ## Model Categories
//!
//! - **Users**: wallet-keyed accounts and profile updates
//! - **Courses**: catalog entries, lessons and reviews
//! - **Learning**: per-lesson progress records
//! - **Transactions**: YD payment history
//! - **Uploads**: pre-signed object storage targets

use serde::{Deserialize, Deserializer, Serialize};

/// GraphQL sends `null` for empty lists and flags; treat it as the default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Ethereum-compatible wallet address wrapper.
///
/// Format: `0x` followed by 40 hexadecimal characters (20 bytes). The backend
/// and the chain disagree on casing, so equality checks go through
/// [`WalletAddress::same_as`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    /// Whether the value has the `0x` + 40 hex character shape.
    pub fn is_valid(&self) -> bool {
        self.0.len() == 42
            && self.0.starts_with("0x")
            && self.0[2..].chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Case-insensitive comparison.
    pub fn same_as(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `0x1234...abcd` form used in listings.
    pub fn short(&self) -> String {
        if self.0.len() <= 10 || !self.0.is_ascii() {
            return self.0.clone();
        }
        format!("{}...{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        WalletAddress(value)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

impl From<alloy::primitives::Address> for WalletAddress {
    fn from(value: alloy::primitives::Address) -> Self {
        WalletAddress(value.to_string())
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// User Models
// =============================================================================

/// Platform role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Teacher,
    Admin,
    #[serde(untagged)]
    Other(String),
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Student => write!(f, "student"),
            UserRole::Teacher => write!(f, "teacher"),
            UserRole::Admin => write!(f, "admin"),
            UserRole::Other(other) => write!(f, "{other}"),
        }
    }
}

/// A platform user, keyed by wallet address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub wallet_address: WalletAddress,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub yd_token_balance: Option<f64>,
}

impl User {
    /// Overlay the fields present in `update` onto this user.
    pub fn merge(&mut self, update: User) {
        self.wallet_address = update.wallet_address;
        if update.username.is_some() {
            self.username = update.username;
        }
        if update.email.is_some() {
            self.email = update.email;
        }
        if update.role.is_some() {
            self.role = update.role;
        }
        if update.avatar_url.is_some() {
            self.avatar_url = update.avatar_url;
        }
        if update.yd_token_balance.is_some() {
            self.yd_token_balance = update.yd_token_balance;
        }
    }
}

/// Input of the `login` mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub wallet_address: WalletAddress,
    pub message: String,
    pub signature: String,
}

/// Input of the `updateProfile` mutation. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

// =============================================================================
// Course Models
// =============================================================================

/// Publication status of a course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Draft,
    Published,
    Archived,
    #[serde(untagged)]
    Other(String),
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseStatus::Draft => write!(f, "draft"),
            CourseStatus::Published => write!(f, "published"),
            CourseStatus::Archived => write!(f, "archived"),
            CourseStatus::Other(other) => write!(f, "{other}"),
        }
    }
}

impl std::str::FromStr for CourseStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "draft" => CourseStatus::Draft,
            "published" => CourseStatus::Published,
            "archived" => CourseStatus::Archived,
            _ => CourseStatus::Other(s.to_string()),
        })
    }
}

/// A catalog course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Price in whole YD.
    pub price_yd: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    pub status: CourseStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    pub teacher_wallet_address: WalletAddress,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reviews: Vec<Review>,
}

/// A lesson within a course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_free: bool,
    pub lesson_number: u32,
}

/// Course with its lessons, as shown on the detail and player pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    pub course: Course,
    pub lessons: Vec<Lesson>,
}

impl CourseDetail {
    /// Total lesson duration in hours.
    pub fn duration_hours(&self) -> f64 {
        let seconds: u32 = self.lessons.iter().filter_map(|l| l.duration).sum();
        f64::from(seconds) / 3600.0
    }
}

/// Reviewer summary embedded in a review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAuthor {
    #[serde(default)]
    pub username: Option<String>,
    pub wallet_address: WalletAddress,
}

/// A student review of a course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    #[serde(default)]
    pub student_wallet_address: Option<WalletAddress>,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub student: Option<ReviewAuthor>,
}

/// Fields returned by the course mutations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: String,
    pub title: String,
    pub status: CourseStatus,
}

/// Input of the `createCourse` mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price_yd: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub teacher_wallet_address: WalletAddress,
}

/// Input of the `updateCourse` mutation. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_yd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CourseStatus>,
}

/// Input of the `createReview` mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewInput {
    pub course_id: String,
    pub student_wallet_address: WalletAddress,
    /// 1 to 5.
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

// =============================================================================
// Learning Models
// =============================================================================

/// Progress of one user on one lesson (or a whole single-video course).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LearningRecord {
    pub id: String,
    pub course_id: String,
    /// `None` for single-video courses.
    #[serde(default)]
    pub lesson_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub progress_percentage: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
    #[serde(default)]
    pub last_watched_at: Option<String>,
}

/// Input of the `createLearningRecord` mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateLearningRecordInput {
    pub course_id: String,
    /// Serialized as `null` for single-video courses.
    pub lesson_id: Option<String>,
    pub user_wallet_address: WalletAddress,
    pub completed: bool,
}

// =============================================================================
// Transaction Models
// =============================================================================

/// Kind of YD movement recorded by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    CoursePurchase,
    #[serde(untagged)]
    Other(String),
}

/// A YD payment as indexed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub from_wallet_address: WalletAddress,
    pub to_wallet_address: WalletAddress,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount_yd: f64,
    pub transaction_type: TransactionType,
    pub status: String,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

// =============================================================================
// Upload Models
// =============================================================================

/// Input of the `generateVideoUploadUrl` mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateUploadUrlInput {
    pub file_name: String,
    pub content_type: String,
}

/// Pre-signed object storage target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadTarget {
    /// Time-limited PUT URL.
    pub upload_url: String,
    /// Object key in the bucket.
    pub key: String,
    /// Where the object is readable once uploaded.
    pub public_url: String,
}
