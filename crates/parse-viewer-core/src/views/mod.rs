//! View contracts: what each synchronized view shows for the current state.
//!
//! Views are pure functions of the page collection, the selection
//! coordinator, and (for spatial views) the image metrics. None of them
//! keeps its own notion of "which item": every flag is derived through
//! [`crate::identity::resolve_identity`].
//!
//! | View | Module | Shows |
//! |------|--------|-------|
//! | Document | [`document`] | source image, page header, navigation dots |
//! | Page overlay | [`page_overlay`] | rendered overlay image, page counter, navigation dots |
//! | Overview | [`overlay`] | clickable boxes mapped onto the overlay image |
//! | Structural tree | [`tree`] | per-item JSON with expand/hide state |
//! | Reading order | [`reading_order`] | ordered block list and extracted text |
//! | RAG answer | [`sources`] | source cards under an answer |
//!
//! [`copy`] holds the copy-to-clipboard text and feedback shared by the
//! overview and the tree.

pub mod copy;
pub mod document;
pub mod overlay;
pub mod page_overlay;
pub mod reading_order;
pub mod sources;
pub mod tree;
