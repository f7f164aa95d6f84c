pub mod antidup;
pub mod signatures;

pub use antidup::{filter_near_duplicates, is_near_duplicate, DuplicateMatch, HiddenArticle};
pub use signatures::{compute_signatures, jaccard, signature_tokens, tokenize, EntitySlots};

pub const JACCARD_STRICT: f64 = 0.90;
pub const JACCARD_ENTITY: f64 = 0.80;
