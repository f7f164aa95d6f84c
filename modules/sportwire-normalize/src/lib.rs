pub mod tagtype;
pub mod text;
pub mod timeparse;
pub mod urls;

pub use tagtype::guess_tag_type_with_context;
pub use text::{normalize_token, tokenize};
pub use timeparse::to_iso;
pub use urls::normalize_url;
