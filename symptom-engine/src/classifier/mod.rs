//! Disease classifier: a bagged forest of CART trees over weighted symptom
//! vectors, its offline trainer and the persisted model artifact.

pub mod artifact;
pub mod encoder;
pub mod forest;
pub mod trainer;
pub mod tree;

pub use artifact::{ModelArtifact, ModelMetadata};
pub use encoder::LabelEncoder;
pub use forest::{argmax, ForestParams, RandomForest};
pub use trainer::{Trainer, TrainingReport};
pub use tree::{DecisionTree, TreeNode, TreeParams};
