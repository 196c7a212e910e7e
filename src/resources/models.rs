use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::{Record, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub todo: String,
    #[serde(default)]
    pub completed: bool,
    pub user_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub user_id: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub reactions: Reactions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
}

/// Post reactions arrive either as a plain count or as a keyed breakdown
/// such as `{"likes": 10, "dislikes": 2}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reactions {
    Count(u64),
    Breakdown(BTreeMap<String, u64>),
}

impl Default for Reactions {
    fn default() -> Self {
        Reactions::Count(0)
    }
}

impl Reactions {
    pub fn total(&self) -> u64 {
        match self {
            Reactions::Count(n) => *n,
            Reactions::Breakdown(parts) => parts.values().sum(),
        }
    }

    pub fn get(&self, kind: &str) -> Option<u64> {
        match self {
            Reactions::Count(_) => None,
            Reactions::Breakdown(parts) => parts.get(kind).copied(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub prep_time_minutes: u32,
    #[serde(default)]
    pub cook_time_minutes: u32,
    #[serde(default = "default_servings")]
    pub servings: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub calories_per_serving: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub user_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

fn default_servings() -> u32 {
    1
}

impl Recipe {
    pub fn total_minutes(&self) -> u64 {
        u64::from(self.prep_time_minutes) + u64::from(self.cook_time_minutes)
    }
}

/// One ingredient line. The remote API ships ingredients as free text
/// ("2 cups flour"); those become a name with an empty quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IngredientRepr")]
pub struct Ingredient {
    pub name: String,
    pub quantity: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IngredientRepr {
    Pair {
        name: String,
        #[serde(default)]
        quantity: String,
    },
    Text(String),
}

impl From<IngredientRepr> for Ingredient {
    fn from(repr: IngredientRepr) -> Self {
        match repr {
            IngredientRepr::Pair { name, quantity } => Ingredient { name, quantity },
            IngredientRepr::Text(name) => Ingredient {
                name,
                quantity: String::new(),
            },
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quantity.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} - {}", self.name, self.quantity)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty: {0}")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = UnknownDifficulty;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub body: String,
    pub post_id: u64,
    pub user: CommentUser,
    #[serde(default)]
    pub likes: u64,
}

/// The comment author as embedded by the API; only the id is guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentUser {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl CommentUser {
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.full_name.clone())
            .unwrap_or_else(|| format!("User {}", self.id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default)]
    pub stock: u64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub discount_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Reference data for "assigned to" and author pickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: u64,
    #[serde(default)]
    pub username: String,
}

impl UserRef {
    pub fn display_name(&self) -> String {
        if self.username.trim().is_empty() {
            format!("User {}", self.id)
        } else {
            self.username.clone()
        }
    }
}

/// Resolve a user id to a display name, falling back to `User {id}`.
pub fn username_for(users: &[UserRef], user_id: u64) -> String {
    users
        .iter()
        .find(|u| u.id == user_id)
        .map(UserRef::display_name)
        .unwrap_or_else(|| format!("User {}", user_id))
}

macro_rules! impl_record {
    ($ty:ty, $resource:expr) => {
        impl Record for $ty {
            const RESOURCE: Resource = $resource;

            fn id(&self) -> u64 {
                self.id
            }
        }
    };
}

impl_record!(Todo, Resource::Todos);
impl_record!(Post, Resource::Posts);
impl_record!(Recipe, Resource::Recipes);
impl_record!(Comment, Resource::Comments);
impl_record!(Product, Resource::Products);
impl_record!(UserRef, Resource::Users);
