//! External collaborators: identity, review summarization, image storage

pub mod identity;
pub mod media;
pub mod summarizer;
