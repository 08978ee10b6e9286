//! Text sanitizing for terminal rendering, link validation and capped
//! response reads.

mod http;
mod text;
mod url_validator;

pub use http::{read_limited_bytes, ReadBodyError};
pub use text::{clean_snippet, display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_url_for_open, UrlValidationError};
