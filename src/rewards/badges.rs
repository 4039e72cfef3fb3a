use serde::{Deserialize, Serialize};

use crate::models::{ArcadeError, Result};

pub const BADGE_IMAGE_BASE: &str = "https://algorandgamehub.com/badges";
pub const EXTERNAL_URL: &str = "https://algorandgamehub.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

/// Catalog entry for a mintable badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub glyph: &'static str,
    /// Game name, or `any`.
    pub game: &'static str,
    pub requirement: &'static str,
    pub rarity: Rarity,
}

pub static BADGE_CATALOG: [BadgeTemplate; 6] = [
    BadgeTemplate {
        name: "Snake Master",
        description: "Achieved a score of 500+ in Snake Challenge",
        glyph: "🐍",
        game: "snake",
        requirement: "Score 500+ points in Snake Challenge",
        rarity: Rarity::Epic,
    },
    BadgeTemplate {
        name: "Trivia Champion",
        description: "Perfect score in Crypto Trivia Challenge",
        glyph: "🧠",
        game: "trivia",
        requirement: "Score 100% in Trivia Challenge",
        rarity: Rarity::Legendary,
    },
    BadgeTemplate {
        name: "Strategy Master",
        description: "Won 25 consecutive Tic-Tac-Toe games",
        glyph: "♟️",
        game: "tictactoe",
        requirement: "Win 25 Tic-Tac-Toe games",
        rarity: Rarity::Rare,
    },
    BadgeTemplate {
        name: "First Steps",
        description: "Played your first game on Algorand Game Hub",
        glyph: "👶",
        game: "any",
        requirement: "Play any game",
        rarity: Rarity::Common,
    },
    BadgeTemplate {
        name: "High Scorer",
        description: "Achieved a personal best score",
        glyph: "🎯",
        game: "any",
        requirement: "Set a new personal record",
        rarity: Rarity::Common,
    },
    BadgeTemplate {
        name: "Crypto Enthusiast",
        description: "Completed your first blockchain transaction",
        glyph: "💰",
        game: "any",
        requirement: "Complete a token reward transaction",
        rarity: Rarity::Rare,
    },
];

pub fn find_badge(name: &str) -> Result<&'static BadgeTemplate> {
    BADGE_CATALOG
        .iter()
        .find(|b| b.name == name)
        .ok_or_else(|| ArcadeError::BadgeNotFound(name.to_string()))
}

/// "Snake Master" -> "snake_master"
pub fn badge_slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeAttribute {
    pub trait_type: String,
    pub value: String,
}

/// NFT metadata document for a badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub image_url: String,
    pub external_url: String,
    pub attributes: Vec<BadgeAttribute>,
    /// `Qm` + md5 of the document without this field.
    pub content_hash: String,
}

#[derive(Serialize)]
struct CanonicalDocument<'a> {
    name: &'a str,
    description: &'a str,
    image: &'a str,
    image_url: &'a str,
    external_url: &'a str,
    attributes: &'a [BadgeAttribute],
}

impl BadgeMetadata {
    pub fn for_badge(name: &str) -> Result<Self> {
        let template = find_badge(name)?;
        Self::from_template(template)
    }

    pub fn from_template(template: &BadgeTemplate) -> Result<Self> {
        let mut metadata = Self {
            name: template.name.to_string(),
            description: template.description.to_string(),
            image: template.glyph.to_string(),
            image_url: format!("{}/{}.png", BADGE_IMAGE_BASE, badge_slug(template.name)),
            external_url: EXTERNAL_URL.to_string(),
            attributes: vec![
                BadgeAttribute {
                    trait_type: "Game Type".to_string(),
                    value: template.game.to_string(),
                },
                BadgeAttribute {
                    trait_type: "Rarity".to_string(),
                    value: template.rarity.as_str().to_string(),
                },
                BadgeAttribute {
                    trait_type: "Requirement".to_string(),
                    value: template.requirement.to_string(),
                },
            ],
            content_hash: String::new(),
        };
        metadata.content_hash = metadata.compute_hash()?;
        Ok(metadata)
    }

    pub fn compute_hash(&self) -> Result<String> {
        let canonical = serde_json::to_vec(&CanonicalDocument {
            name: &self.name,
            description: &self.description,
            image: &self.image,
            image_url: &self.image_url,
            external_url: &self.external_url,
            attributes: &self.attributes,
        })?;
        Ok(format!("Qm{:x}", md5::compute(canonical)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_reward_tier_badge_is_in_catalog() {
        let settings = crate::config::Settings::default();
        for tiers in settings.rewards.tiers.values() {
            for badge in tiers.iter().filter_map(|t| t.badge.as_deref()) {
                assert!(find_badge(badge).is_ok(), "{} missing", badge);
            }
        }
    }

    #[test]
    fn test_metadata_document() {
        let metadata = BadgeMetadata::for_badge("Snake Master").unwrap();
        assert_eq!(metadata.image_url, "https://algorandgamehub.com/badges/snake_master.png");
        assert_eq!(metadata.external_url, "https://algorandgamehub.com");
        assert_eq!(metadata.attributes.len(), 3);
        assert_eq!(metadata.attributes[1].value, "epic");
        assert!(metadata.content_hash.starts_with("Qm"));
        assert_eq!(metadata.content_hash.len(), 34);
    }

    #[test]
    fn test_hash_is_stable_and_content_addressed() {
        let a = BadgeMetadata::for_badge("First Steps").unwrap();
        let b = BadgeMetadata::for_badge("First Steps").unwrap();
        let c = BadgeMetadata::for_badge("High Scorer").unwrap();
        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.content_hash, c.content_hash);
        assert_eq!(a.compute_hash().unwrap(), a.content_hash);
    }

    #[test]
    fn test_unknown_badge() {
        assert!(matches!(
            BadgeMetadata::for_badge("Pinball Wizard"),
            Err(ArcadeError::BadgeNotFound(name)) if name == "Pinball Wizard"
        ));
    }

    #[test]
    fn test_badge_slug() {
        assert_eq!(badge_slug("Crypto Enthusiast"), "crypto_enthusiast");
        assert_eq!(badge_slug("  Trivia   Champion "), "trivia_champion");
    }
}
