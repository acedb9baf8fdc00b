//! Page state and workflows shared by the browser and terminal front-ends.
//!
//! Each page keeps plain state plus pure helpers for what to render, and
//! async workflows that talk to the backend. Workflows never fail outward:
//! they log, tell the user through a [`Notifier`], and report success as a
//! boolean or an `Option`.

pub mod book;
pub mod casting;
pub mod library;
pub mod settings;
pub mod upload;
pub mod voices;

use crate::services::toast::Notifier;
use anyhow::Result;

/// Logs a failed call and shows `message` to the user.
pub(crate) fn report<T>(result: Result<T>, notifier: &dyn Notifier, message: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("{}: {:#}", message, e);
            notifier.error(message);
            None
        }
    }
}
