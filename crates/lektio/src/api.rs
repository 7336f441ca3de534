//! API endpoint definitions and request/response types.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// Token obtain endpoint (login).
pub const LOGIN: &str = "user/token/";

/// Token refresh endpoint. The refresh token travels in the request body,
/// never as a bearer header.
pub const TOKEN_REFRESH: &str = "user/token/refresh/";

/// Registration endpoint.
pub const REGISTER: &str = "user/register/";

/// User profile endpoint; append the user id.
pub const PROFILE: &str = "user/profile/";

/// Public course catalog endpoint.
pub const COURSE_LIST: &str = "course/course-list/";

/// Public course detail endpoint; append the course id.
pub const COURSE_DETAIL: &str = "course/course-detail/";

/// Enrolled course list endpoint; append the user id.
pub const STUDENT_COURSE_LIST: &str = "student/course-list/";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for the login endpoint.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Request body for the refresh endpoint.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// A freshly issued access/refresh pair, returned by both the login and
/// refresh endpoints.
#[derive(Debug, Deserialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

/// Request body for the registration endpoint.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub password2: &'a str,
}

/// Response from the registration endpoint.
#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    pub full_name: String,
    pub email: String,
}

/// A user profile record.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// A course in the public catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub id: u64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
}

/// An enrollment linking the current student to a course.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrolledCourse {
    pub enrollment_id: String,
    pub course: Course,
    #[serde(default)]
    pub completed_lessons: Option<u64>,
    pub date: chrono::DateTime<chrono::Utc>,
}

/// Error response body format.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub detail: Option<String>,
}
