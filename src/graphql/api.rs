// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Typed marketplace API on top of [`GraphQlClient`].
//!
//! Reads are served from an attached [`QueryCache`] when possible; every
//! mutation drops the cached reads it can make stale.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::client::{decode, GraphQlClient, GraphQlError};
use super::documents;
use crate::models::{
    Course, CourseDetail, CourseStatus, CourseSummary, CreateCourseInput,
    CreateLearningRecordInput, CreateReviewInput, CreateUploadUrlInput, LearningRecord, Lesson,
    LoginInput, Review, Transaction, UpdateCourseInput, UpdateProfileInput, UploadTarget, User,
};
use crate::query_cache::QueryCache;

const KEY_COURSES: &str = "courses";
const KEY_COURSE: &str = "course:";
const KEY_ME: &str = "me";
const KEY_USER: &str = "user:";
const KEY_LEARNING_RECORDS: &str = "learningRecords";
const KEY_TRANSACTIONS: &str = "transactions:";

#[derive(Debug, Deserialize)]
struct LoginPayload {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoursePayload {
    course: Option<Course>,
    #[serde(default)]
    course_lessons: Option<Vec<Lesson>>,
}

#[derive(Clone)]
pub struct UniversityApi {
    client: GraphQlClient,
    cache: Option<Arc<QueryCache>>,
}

impl UniversityApi {
    pub fn new(client: GraphQlClient) -> Self {
        Self {
            client,
            cache: None,
        }
    }

    /// Serve reads from `cache`.
    pub fn with_cache(mut self, cache: Arc<QueryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn client(&self) -> &GraphQlClient {
        &self.client
    }

    /// Authenticate subsequent requests with `token`.
    pub async fn set_auth_token(&self, token: &str) {
        self.client.set_auth_token(token).await;
        self.invalidate(&[KEY_ME]);
    }

    pub async fn clear_auth_token(&self) {
        self.client.clear_auth_token().await;
        self.invalidate(&[KEY_ME]);
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Exchange a signed login message for a session token.
    ///
    /// `Ok(None)` when the backend answers without a token.
    pub async fn login(&self, input: &LoginInput) -> Result<Option<String>, GraphQlError> {
        let data = self
            .client
            .request_value(documents::LOGIN, json!({ "input": input }))
            .await?;
        let payload: Option<LoginPayload> = field(data, "login")?;
        Ok(payload.and_then(|p| p.token))
    }

    /// The user behind the current token.
    pub async fn me(&self) -> Result<Option<User>, GraphQlError> {
        let data = self
            .cached_query(KEY_ME.to_string(), documents::GET_ME, json!({}))
            .await?;
        field(data, "me")
    }

    pub async fn user(&self, wallet_address: &str) -> Result<Option<User>, GraphQlError> {
        let key = format!("{KEY_USER}{}", wallet_address.to_lowercase());
        let data = self
            .cached_query(
                key,
                documents::GET_USER,
                json!({ "walletAddress": wallet_address }),
            )
            .await?;
        field(data, "user")
    }

    pub async fn update_profile(&self, input: &UpdateProfileInput) -> Result<User, GraphQlError> {
        let data = self
            .client
            .request_value(documents::UPDATE_PROFILE, json!({ "input": input }))
            .await?;
        self.invalidate(&[KEY_ME, KEY_USER]);
        required(data, "updateProfile")
    }

    // =========================================================================
    // Courses
    // =========================================================================

    /// Catalog listing, optionally filtered by status and teacher.
    pub async fn courses(
        &self,
        status: Option<&CourseStatus>,
        teacher_wallet_address: Option<&str>,
    ) -> Result<Vec<Course>, GraphQlError> {
        let status = status.map(|s| s.to_string());
        let key = format!(
            "{KEY_COURSES}:{}:{}",
            status.as_deref().unwrap_or_default(),
            teacher_wallet_address.unwrap_or_default().to_lowercase()
        );
        let data = self
            .cached_query(
                key,
                documents::GET_COURSES,
                json!({ "status": status, "teacherWalletAddress": teacher_wallet_address }),
            )
            .await?;
        list(data, "courses")
    }

    /// A course with its lessons, or `None` if it does not exist.
    pub async fn course(&self, id: &str) -> Result<Option<CourseDetail>, GraphQlError> {
        let data = self
            .cached_query(format!("{KEY_COURSE}{id}"), documents::GET_COURSE, json!({ "id": id }))
            .await?;
        let payload: CoursePayload = decode(data)?;
        Ok(payload.course.map(|course| CourseDetail {
            course,
            lessons: payload.course_lessons.unwrap_or_default(),
        }))
    }

    pub async fn create_course(
        &self,
        input: &CreateCourseInput,
    ) -> Result<CourseSummary, GraphQlError> {
        let data = self
            .client
            .request_value(documents::CREATE_COURSE, json!({ "input": input }))
            .await?;
        self.invalidate(&[KEY_COURSES, KEY_COURSE]);
        let course: CourseSummary = required(data, "createCourse")?;
        info!(course_id = %course.id, title = %course.title, "Course created");
        Ok(course)
    }

    pub async fn update_course(
        &self,
        course_id: &str,
        input: &UpdateCourseInput,
    ) -> Result<CourseSummary, GraphQlError> {
        let data = self
            .client
            .request_value(
                documents::UPDATE_COURSE,
                json!({ "courseId": course_id, "input": input }),
            )
            .await?;
        self.invalidate(&[KEY_COURSES, KEY_COURSE]);
        required(data, "updateCourse")
    }

    pub async fn remove_course(&self, course_id: &str) -> Result<(), GraphQlError> {
        self.client
            .request_value(documents::REMOVE_COURSE, json!({ "courseId": course_id }))
            .await?;
        self.invalidate(&[KEY_COURSES, KEY_COURSE]);
        info!(course_id = %course_id, "Course removed");
        Ok(())
    }

    // =========================================================================
    // Learning
    // =========================================================================

    pub async fn learning_records(
        &self,
        user_wallet_address: &str,
        course_id: Option<&str>,
    ) -> Result<Vec<LearningRecord>, GraphQlError> {
        let key = format!(
            "{KEY_LEARNING_RECORDS}:{}:{}",
            user_wallet_address.to_lowercase(),
            course_id.unwrap_or_default()
        );
        let data = self
            .cached_query(
                key,
                documents::GET_LEARNING_RECORDS,
                json!({ "userWalletAddress": user_wallet_address, "courseId": course_id }),
            )
            .await?;
        list(data, "learningRecords")
    }

    /// Record a lesson (or a single-video course) as completed.
    pub async fn mark_lesson_complete(
        &self,
        input: &CreateLearningRecordInput,
    ) -> Result<LearningRecord, GraphQlError> {
        let data = self
            .client
            .request_value(
                documents::MARK_LESSON_COMPLETE,
                json!({ "createLearningRecordInput": input }),
            )
            .await?;
        self.invalidate(&[KEY_LEARNING_RECORDS]);
        required(data, "createLearningRecord")
    }

    // =========================================================================
    // Transactions, reviews, uploads
    // =========================================================================

    pub async fn transactions(&self, wallet_address: &str) -> Result<Vec<Transaction>, GraphQlError> {
        let key = format!("{KEY_TRANSACTIONS}{}", wallet_address.to_lowercase());
        let data = self
            .cached_query(
                key,
                documents::GET_TRANSACTIONS,
                json!({ "walletAddress": wallet_address }),
            )
            .await?;
        list(data, "transactions")
    }

    pub async fn create_review(&self, input: &CreateReviewInput) -> Result<Review, GraphQlError> {
        let data = self
            .client
            .request_value(documents::CREATE_REVIEW, json!({ "input": input }))
            .await?;
        self.invalidate(&[KEY_COURSES, KEY_COURSE]);
        required(data, "createReview")
    }

    /// Pre-signed PUT target for a new object.
    pub async fn generate_upload_url(
        &self,
        input: &CreateUploadUrlInput,
    ) -> Result<UploadTarget, GraphQlError> {
        let data = self
            .client
            .request_value(documents::GENERATE_VIDEO_UPLOAD_URL, json!({ "input": input }))
            .await?;
        required(data, "generateVideoUploadUrl")
    }

    // =========================================================================
    // Cache plumbing
    // =========================================================================

    async fn cached_query(
        &self,
        key: String,
        document: &str,
        variables: Value,
    ) -> Result<Value, GraphQlError> {
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            debug!(key = %key, "Query cache hit");
            return Ok(hit);
        }

        let generation = self.cache.as_ref().map(|c| c.generation());
        let data = self.client.request_value(document, variables).await?;
        if let (Some(cache), Some(generation)) = (&self.cache, generation) {
            cache.put_if_current(&key, data.clone(), generation);
        }
        Ok(data)
    }

    fn invalidate(&self, prefixes: &[&str]) {
        if let Some(cache) = &self.cache {
            for prefix in prefixes {
                cache.invalidate_prefix(prefix);
            }
        }
    }
}

/// Decode `data[name]`, allowing `null`.
fn field<T: DeserializeOwned>(mut data: Value, name: &str) -> Result<Option<T>, GraphQlError> {
    match data.get_mut(name).map(Value::take) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => decode(value).map(Some),
    }
}

/// Decode `data[name]`; `null` is an error.
fn required<T: DeserializeOwned>(data: Value, name: &str) -> Result<T, GraphQlError> {
    field(data, name)?.ok_or(GraphQlError::MissingData)
}

/// Decode a list field; `null` is an empty list.
fn list<T: DeserializeOwned>(data: Value, name: &str) -> Result<Vec<T>, GraphQlError> {
    Ok(field::<Vec<T>>(data, name)?.unwrap_or_default())
}
