//! Usage: Operator prompts for the freeze payload (validate-or-reprompt) and final confirmation.
//!
//! The parsers are plain functions so they can be tested without a terminal; the dialoguer
//! wrappers only loop until a parser accepts the input.

use crate::domain::freeze::{FreezeReason, FreezeRequest, DATE_FORMAT};
use crate::shared::error::{AppError, AppResult, ErrorCode};
use chrono::NaiveDate;
use dialoguer::Input;

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| "Invalid date format. Please enter a date in YYYY-MM-DD format.".to_string())
}

pub(crate) fn parse_end_date(input: &str, begin: NaiveDate) -> Result<NaiveDate, String> {
    let end = parse_date(input)?;
    if end < begin {
        return Err(
            "Expected end date cannot be before begin date. Please enter a valid date.".to_string(),
        );
    }
    Ok(end)
}

pub(crate) fn parse_reason(input: &str) -> Result<FreezeReason, String> {
    input.parse::<FreezeReason>().map_err(|_| {
        "Invalid reason. Please choose from: other, personal, professional, medical.".to_string()
    })
}

/// Yes/no answer; an empty answer takes the `[y/N]` default.
pub(crate) fn parse_yes_no(input: &str) -> Result<bool, String> {
    match input.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" => Ok(true),
        "" | "false" | "f" | "no" | "n" => Ok(false),
        _ => Err(
            "Invalid input. Please enter true/false, t/f, yes/no, or their abbreviations."
                .to_string(),
        ),
    }
}

pub(crate) fn parse_non_empty(input: &str) -> Result<String, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("This field cannot be empty. Please enter a value.".to_string());
    }
    Ok(trimmed.to_string())
}

/// Comma separated logins/IDs, trimmed, blanks dropped.
pub(crate) fn split_and_trim(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn prompt_io_error(prompt: &str, err: dialoguer::Error) -> AppError {
    AppError::with_code(
        ErrorCode::Validation,
        format!("prompt `{prompt}` failed: {err}"),
    )
}

fn ask<T>(prompt: &str, allow_empty: bool, parse: impl Fn(&str) -> Result<T, String>) -> AppResult<T> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(allow_empty)
        .validate_with(|input: &String| parse(input).map(|_| ()))
        .interact_text()
        .map_err(|e| prompt_io_error(prompt, e))?;
    parse(&raw).map_err(|msg| AppError::with_code(ErrorCode::Validation, msg))
}

/// Gathers every operator-supplied field; `user_ids` stays empty for the collector to fill.
pub(crate) fn ask_freeze_request() -> AppResult<FreezeRequest> {
    let begin_date = ask("Enter begin_date (YYYY-MM-DD)", false, parse_date)?;
    let expected_end_date = ask("Enter expected_end_date (YYYY-MM-DD)", false, |input| {
        parse_end_date(input, begin_date)
    })?;
    let reason = ask(
        "Enter reason (other, personal, professional, medical)",
        false,
        parse_reason,
    )?;
    let is_free_freeze = ask("Is this a free freeze [y/N]", true, parse_yes_no)?;
    let student_description = ask("Enter student description", false, parse_non_empty)?;
    let staff_description = ask("Enter staff description", false, parse_non_empty)?;
    let excluded_ids = ask("Enter logins you want to EXCLUDE", true, |input| {
        Ok(split_and_trim(input))
    })?;

    Ok(FreezeRequest {
        user_ids: Vec::new(),
        excluded_ids,
        begin_date,
        expected_end_date,
        reason,
        is_free_freeze,
        student_description,
        staff_description,
    })
}

pub(crate) fn confirm_submission(user_count: usize) -> AppResult<bool> {
    ask(
        &format!("This freeze will hit {user_count} users, continue? [y/N]"),
        true,
        parse_yes_no,
    )
}
