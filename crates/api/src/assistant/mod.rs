//! External assistant provider seam.
//!
//! The platform treats the completion backend as an opaque external
//! collaborator reached over HTTP; [`CompletionProvider`] is the trait seam
//! that keeps it injectable (the tests use a scripted implementation).

pub mod provider;

pub use provider::{
    CompletionProvider, HttpCompletionProvider, ProviderError, ProviderMessage, SectionRequest,
    SectionStream,
};
