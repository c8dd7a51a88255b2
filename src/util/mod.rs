//! Text helpers shared by the parser and the event builder.
//!
//! - **Sanitizing**: strip terminal control sequences from feed-supplied text
//! - **Truncation**: character-based cutting with an ellipsis marker
//!
//! # Examples
//!
//! ```
//! use feedbridge::util::{strip_control_chars, truncate_chars};
//!
//! let clean = strip_control_chars("Title\x07");
//! assert_eq!(clean, "Title");
//!
//! let short = truncate_chars("A fairly long sentence", 8);
//! assert_eq!(short.chars().count(), 8);
//! ```

mod text;

pub use text::{strip_control_chars, truncate_chars, ELLIPSIS};
