//! Draft validation.

use thiserror::Error;

use crate::constants::{MAX_LOCATION_LEN, MAX_NOTES_LEN, MAX_TITLE_LEN};
use crate::event::EventDraft;

/// Reasons a draft can't be saved. All are fixable in the form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    EmptyTitle,

    #[error("{field} is too long ({len} characters, at most {max})")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("End must be after start")]
    InvalidRange,
}

/// Check a draft. Text fields are judged after trimming.
pub fn validate(draft: &EventDraft) -> Result<(), ValidationError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    check_len("Title", title, MAX_TITLE_LEN)?;
    check_len("Location", draft.location.trim(), MAX_LOCATION_LEN)?;
    check_len("Notes", draft.notes.trim(), MAX_NOTES_LEN)?;

    if draft.end <= draft.start {
        return Err(ValidationError::InvalidRange);
    }

    Ok(())
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong { field, len, max });
    }
    Ok(())
}
