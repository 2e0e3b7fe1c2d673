//! Field-level input validation. Pure functions; each returns the first
//! failing rule, checked in a stable order: emptiness, then shape, then
//! length.

use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::dto::{LoginRequest, RegisterRequest};
use crate::error::ApiError;
use crate::tasks::dto::{CreateTaskRequest, UpdateTaskRequest};
use crate::tasks::repo::{NewTask, TaskChanges, TaskStatus};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn validate_registration(payload: &RegisterRequest) -> Result<(), ApiError> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(ApiError::Validation("All fields are required".into()));
    }
    if !is_valid_email(payload.email.trim()) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.chars().count() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }
    Ok(())
}

/// Shape and length were already enforced at registration time.
pub fn validate_login(payload: &LoginRequest) -> Result<(), ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".into(),
        ));
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }
    let len = title.chars().count();
    if !(3..=255).contains(&len) {
        return Err(ApiError::Validation(
            "Title must be between 3 and 255 characters".into(),
        ));
    }
    Ok(title.to_string())
}

fn validate_description(description: &str) -> Result<String, ApiError> {
    let description = description.trim();
    if description.chars().count() > 1000 {
        return Err(ApiError::Validation(
            "Description must be at most 1000 characters".into(),
        ));
    }
    Ok(description.to_string())
}

pub fn validate_status(value: &str) -> Result<TaskStatus, ApiError> {
    TaskStatus::parse(value)
        .ok_or_else(|| ApiError::Validation("Invalid status. Use: pending or completed".into()))
}

pub fn validate_new_task(payload: &CreateTaskRequest) -> Result<NewTask, ApiError> {
    let title = validate_title(payload.title.as_deref().unwrap_or(""))?;
    let description = payload
        .description
        .as_deref()
        .map(validate_description)
        .transpose()?;
    let status = match payload.status.as_deref() {
        Some(value) => validate_status(value)?,
        None => TaskStatus::Pending,
    };
    Ok(NewTask {
        title,
        description,
        status,
    })
}

pub fn validate_task_update(payload: &UpdateTaskRequest) -> Result<TaskChanges, ApiError> {
    if payload.title.is_none() && payload.description.is_none() && payload.status.is_none() {
        return Err(ApiError::Validation("No fields to update".into()));
    }
    let title = payload.title.as_deref().map(validate_title).transpose()?;
    let description = payload
        .description
        .as_deref()
        .map(validate_description)
        .transpose()?;
    let status = payload.status.as_deref().map(validate_status).transpose()?;
    Ok(TaskChanges {
        title,
        description,
        status,
    })
}
