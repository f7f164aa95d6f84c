pub mod attach;
pub mod engine;
pub mod title_refiner;
pub mod unionfind;

pub use attach::{attach_cluster, AttachOutcome};
pub use engine::{build_clusters, title_jaccard, Cluster, ClusterCandidate};
pub use title_refiner::{compute_story_title, ArticleForTitle};
pub use unionfind::UnionFind;
