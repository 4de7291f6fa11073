// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Query and mutation documents sent to the backend.

// -----------------------------------------------------------------------------
// Queries
// -----------------------------------------------------------------------------

pub const GET_COURSES: &str = r#"
query GetCourses($status: String, $teacherWalletAddress: String) {
  courses(status: $status, teacherWalletAddress: $teacherWalletAddress) {
    id
    title
    description
    priceYd
    category
    thumbnailUrl
    status
    teacherWalletAddress
    rating
    reviewCount
  }
}
"#;

pub const GET_COURSE: &str = r#"
query GetCourse($id: ID!) {
  course(id: $id) {
    id
    title
    description
    priceYd
    category
    thumbnailUrl
    videoUrl
    status
    createdAt
    teacherWalletAddress
    rating
    reviewCount
    reviews {
      id
      studentWalletAddress
      rating
      comment
      createdAt
      student {
        username
        walletAddress
      }
    }
  }
  courseLessons(courseId: $id) {
    id
    title
    duration
    isFree
    lessonNumber
  }
}
"#;

pub const GET_USER: &str = r#"
query GetUser($walletAddress: String!) {
  user(walletAddress: $walletAddress) {
    walletAddress
    username
    email
    role
    ydTokenBalance
  }
}
"#;

pub const GET_ME: &str = r#"
query GetMe {
  me {
    walletAddress
    username
    email
    role
    avatarUrl
    ydTokenBalance
  }
}
"#;

pub const GET_LEARNING_RECORDS: &str = r#"
query GetLearningRecords($userWalletAddress: String!, $courseId: ID) {
  learningRecords(userWalletAddress: $userWalletAddress, courseId: $courseId) {
    id
    courseId
    lessonId
    progressPercentage
    completed
    lastWatchedAt
  }
}
"#;

pub const GET_TRANSACTIONS: &str = r#"
query GetTransactions($walletAddress: String!) {
  transactions(walletAddress: $walletAddress) {
    id
    fromWalletAddress
    toWalletAddress
    amountYd
    transactionType
    status
    transactionHash
    createdAt
    metadata
  }
}
"#;

// -----------------------------------------------------------------------------
// Mutations
// -----------------------------------------------------------------------------

pub const LOGIN: &str = r#"
mutation Login($input: LoginInput!) {
  login(input: $input) {
    token
  }
}
"#;

pub const UPDATE_PROFILE: &str = r#"
mutation UpdateProfile($input: UpdateProfileInput!) {
  updateProfile(input: $input) {
    walletAddress
    username
    email
    avatarUrl
  }
}
"#;

pub const CREATE_COURSE: &str = r#"
mutation CreateCourse($input: CreateCourseInput!) {
  createCourse(createCourseInput: $input) {
    id
    title
    status
  }
}
"#;

pub const UPDATE_COURSE: &str = r#"
mutation UpdateCourse($courseId: ID!, $input: UpdateCourseInput!) {
  updateCourse(courseId: $courseId, input: $input) {
    id
    title
    status
  }
}
"#;

pub const REMOVE_COURSE: &str = r#"
mutation RemoveCourse($courseId: ID!) {
  removeCourse(courseId: $courseId)
}
"#;

pub const MARK_LESSON_COMPLETE: &str = r#"
mutation MarkLessonComplete($createLearningRecordInput: CreateLearningRecordInput!) {
  createLearningRecord(createLearningRecordInput: $createLearningRecordInput) {
    id
    courseId
    lessonId
    progressPercentage
    completed
    lastWatchedAt
  }
}
"#;

pub const CREATE_REVIEW: &str = r#"
mutation CreateReview($input: CreateReviewInput!) {
  createReview(createReviewInput: $input) {
    id
    rating
    comment
    createdAt
  }
}
"#;

pub const GENERATE_VIDEO_UPLOAD_URL: &str = r#"
mutation GenerateVideoUploadUrl($input: CreateUploadUrlInput!) {
  generateVideoUploadUrl(input: $input) {
    uploadUrl
    key
    publicUrl
  }
}
"#;
