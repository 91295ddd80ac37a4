use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Big Five dimension. Declaration order is the radar and report order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Trait {
    Extraversion,
    Agreeableness,
    Conscientiousness,
    Neuroticism,
    Openness,
}

impl Trait {
    pub const ALL: [Trait; 5] = [
        Trait::Extraversion,
        Trait::Agreeableness,
        Trait::Conscientiousness,
        Trait::Neuroticism,
        Trait::Openness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Trait::Extraversion => "Extraversion",
            Trait::Agreeableness => "Agreeableness",
            Trait::Conscientiousness => "Conscientiousness",
            Trait::Neuroticism => "Neuroticism",
            Trait::Openness => "Openness",
        }
    }
}

impl std::fmt::Display for Trait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer polarity. `Minus` items are reverse-scored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Keyed {
    #[default]
    Plus,
    Minus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    #[serde(rename = "trait")]
    pub trait_: Trait,
    #[serde(default)]
    pub keyed: Keyed,
    pub question_theme: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpiceOption {
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub desc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub chapter_id: String,
    pub title: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub spice_options: Vec<SpiceOption>,
    pub items: Vec<Item>,
}

/// Raw Likert responses keyed by item id.
pub type Answers = BTreeMap<String, i32>;

/// Averaged score per trait; 0 means the trait had no answered items.
pub type TraitScores = BTreeMap<Trait, f64>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackEntry {
    pub score: f64,
    pub narrative: String,
    pub suggested_roles: Vec<String>,
    pub suggested_actions: Vec<String>,
}

pub type Feedback = BTreeMap<Trait, FeedbackEntry>;

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(i64),
    Text(String),
}

fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Number(n) => n.to_string(),
        IdRepr::Text(s) => s,
    })
}
