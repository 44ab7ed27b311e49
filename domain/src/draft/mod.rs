//! Draft domain
//!
//! A [`ContentDraft`] is one immutable version of the content under review.
//! Redrafts never mutate a draft; they produce the next version through
//! [`ContentDraft::revise`].

mod entities;

pub use entities::{
    ContentDraft, DEFAULT_TARGET_LENGTH, DEFAULT_TONE, DraftContent, DraftRequest,
};
