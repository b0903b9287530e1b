//! One facade per API resource family.
//!
//! Facades borrow the client's `Transport`, fix the resource path and verb,
//! and hand the response to the matching model parser.

mod style_checks;
mod style_guides;
mod style_rewrites;
mod style_suggestions;

pub use style_checks::StyleChecks;
pub use style_guides::StyleGuides;
pub use style_rewrites::StyleRewrites;
pub use style_suggestions::StyleSuggestions;

/// Extensions accepted by the check, suggestion and rewrite uploads.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["txt", "pdf", "md"];

/// Extensions accepted by style guide uploads.
pub const STYLE_GUIDE_EXTENSIONS: &[&str] = &["pdf"];
