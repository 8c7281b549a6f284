//! Image intake: validation, decoding, and batch discovery.

mod decode;
mod discovery;
mod validate;

pub use decode::{format_to_string, ImageLoader, PreparedImage};
pub use discovery::{is_supported, DiscoveredImage, Discovery, ImageDiscovery, SUPPORTED_EXTENSIONS};
pub use validate::Validator;
