//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Writes the [`PostsDocument`](crate::models::PostsDocument) read by the web page
//!
//! # Output Structure
//!
//! ```text
//! posts.json
//! {
//!   "lastUpdated": "2025-10-18T09:30:00.000Z",
//!   "totalPosts": 2,
//!   "posts": [ { "category", "title", "description", "link", "platform", "publishedAt" }, ... ]
//! }
//! ```

pub mod json;
