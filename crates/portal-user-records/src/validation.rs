// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Field validation for user records.

use std::fmt;

use crate::record::{NewUserRecord, ProfileUpdate};

pub const MAX_USER_NAME_CHARS: usize = 128;

/// One or more field problems, in the order they were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
	pub errors: Vec<String>,
}

impl fmt::Display for ValidationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "validation failed: {}", self.errors.join("; "))
	}
}

impl std::error::Error for ValidationError {}

fn check(errors: Vec<String>) -> Result<(), ValidationError> {
	if errors.is_empty() {
		Ok(())
	} else {
		Err(ValidationError { errors })
	}
}

fn name_errors(name: &str) -> Vec<String> {
	let trimmed = name.trim();
	if trimmed.is_empty() {
		return vec!["name is required".to_string()];
	}
	if trimmed.chars().count() > MAX_USER_NAME_CHARS {
		return vec![format!("name must be at most {MAX_USER_NAME_CHARS} characters")];
	}
	Vec::new()
}

fn is_email_shaped(email: &str) -> bool {
	let Some((local, domain)) = email.split_once('@') else {
		return false;
	};
	let clean = |s: &str| !s.is_empty() && !s.contains('@') && !s.chars().any(char::is_whitespace);
	if !clean(local) || !clean(domain) {
		return false;
	}
	domain
		.char_indices()
		.any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn email_errors(email: &str) -> Vec<String> {
	if email.trim().is_empty() {
		return vec!["email is required".to_string()];
	}
	if !is_email_shaped(email.trim()) {
		return vec!["email is not a valid address".to_string()];
	}
	Vec::new()
}

pub fn validate_user_name(name: &str) -> Result<(), ValidationError> {
	check(name_errors(name))
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
	check(email_errors(email))
}

pub fn validate_new_record(record: &NewUserRecord) -> Result<(), ValidationError> {
	let mut errors = name_errors(&record.name);
	errors.extend(email_errors(&record.email));
	check(errors)
}

pub fn validate_update(update: &ProfileUpdate) -> Result<(), ValidationError> {
	let mut errors = Vec::new();
	if let Some(name) = &update.name {
		errors.extend(name_errors(name));
	}
	if let Some(email) = &update.email {
		errors.extend(email_errors(email));
	}
	check(errors)
}
