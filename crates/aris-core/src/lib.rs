pub mod assessment;
pub mod attribution;
pub mod augment;
pub mod explain;
pub mod finalize;
pub mod normalize;
pub mod reading;
pub mod tier;

pub use assessment::*;
pub use attribution::{attribute, dynamic_influence, ContributionShares, DynamicInfluence};
pub use augment::{augment, AugmentationBreakdown};
pub use explain::*;
pub use finalize::{base_score, finalize_index, MAX_RISK_INDEX};
pub use normalize::{normalize, NormalizedFeatures};
pub use reading::*;
pub use tier::*;
