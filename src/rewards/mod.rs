pub mod badges;
pub mod queue;

pub use badges::{
    badge_slug, find_badge, BadgeAttribute, BadgeMetadata, BadgeTemplate, Rarity, BADGE_CATALOG,
};
pub use queue::{AttemptStatus, RewardAttempt, RewardKind, RewardQueue, RewardTicket};
