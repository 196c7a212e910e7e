//! Client-authored form state for each resource.
//!
//! A draft is what the user typed. It serializes into the body sent to the
//! remote API and knows how to turn itself into the record that is actually
//! stored: a fresh record for creates, or an overlay of an existing record
//! for edits. Fields a draft does not carry are never touched by an edit.

use serde::Serialize;

use super::models::{Comment, CommentUser, Difficulty, Ingredient, Post, Product, Reactions, Recipe, Todo};
use super::Record;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("{0} needs at least one entry")]
    NoEntries(&'static str),

    #[error("{0} must be a number")]
    NotANumber(&'static str),
}

pub trait Draft: Serialize + Send + Sync {
    type Record: Record;

    /// Presence checks only.
    fn validate(&self) -> Result<(), ValidationError>;
}

pub trait Create: Draft {
    fn build(&self, id: u64) -> Self::Record;
}

pub trait Edit: Draft {
    fn overlay(&self, original: &Self::Record) -> Self::Record;
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Empty(field))
    } else {
        Ok(())
    }
}

/// Parse a whole-number form field. Blank input counts as zero.
pub fn parse_count(field: &'static str, raw: &str) -> Result<u32, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse().map_err(|_| ValidationError::NotANumber(field))
}

/// Parse a non-negative decimal form field. Blank input counts as zero.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(ValidationError::NotANumber(field)),
    }
}

/// Ordered tag list with no duplicates after trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma separated list, skipping blank segments.
    pub fn parse(input: &str) -> Self {
        let mut tags = Self::new();
        for piece in input.split(',') {
            if !piece.trim().is_empty() {
                let _ = tags.add(piece);
            }
        }
        tags
    }

    /// Returns `Ok(false)` when the tag is already present.
    pub fn add(&mut self, raw: &str) -> Result<bool, ValidationError> {
        let tag = raw.trim();
        if tag.is_empty() {
            return Err(ValidationError::Empty("Tag"));
        }
        if self.contains(tag) {
            return Ok(false);
        }
        self.0.push(tag.to_string());
        Ok(true)
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag.trim());
        self.0.len() != before
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag.trim())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }

    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}

impl From<&[String]> for TagSet {
    fn from(tags: &[String]) -> Self {
        let mut set = TagSet::new();
        for tag in tags {
            let _ = set.add(tag);
        }
        set
    }
}

// --- Todos ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoDraft {
    pub todo: String,
    pub completed: bool,
    pub user_id: u64,
}

impl Default for TodoDraft {
    fn default() -> Self {
        Self {
            todo: String::new(),
            completed: false,
            user_id: 1,
        }
    }
}

impl From<&Todo> for TodoDraft {
    fn from(todo: &Todo) -> Self {
        Self {
            todo: todo.todo.clone(),
            completed: todo.completed,
            user_id: todo.user_id,
        }
    }
}

impl Draft for TodoDraft {
    type Record = Todo;

    fn validate(&self) -> Result<(), ValidationError> {
        require("Todo", &self.todo)
    }
}

impl Create for TodoDraft {
    fn build(&self, id: u64) -> Todo {
        Todo {
            id,
            todo: self.todo.clone(),
            completed: self.completed,
            user_id: self.user_id,
        }
    }
}

impl Edit for TodoDraft {
    fn overlay(&self, original: &Todo) -> Todo {
        Todo {
            todo: self.todo.clone(),
            completed: self.completed,
            user_id: self.user_id,
            ..original.clone()
        }
    }
}

// --- Posts ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    pub user_id: u64,
    pub tags: TagSet,
    /// Custom author shown instead of the user's name. Kept locally only.
    #[serde(skip)]
    pub author_name: Option<String>,
}

impl Default for PostDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            body: String::new(),
            user_id: 1,
            tags: TagSet::new(),
            author_name: None,
        }
    }
}

impl From<&Post> for PostDraft {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            body: post.body.clone(),
            user_id: post.user_id,
            tags: TagSet::from(post.tags.as_slice()),
            author_name: post.author_name.clone(),
        }
    }
}

impl Draft for PostDraft {
    type Record = Post;

    fn validate(&self) -> Result<(), ValidationError> {
        require("Title", &self.title)?;
        require("Body", &self.body)
    }
}

impl Create for PostDraft {
    fn build(&self, id: u64) -> Post {
        Post {
            id,
            title: self.title.clone(),
            body: self.body.clone(),
            user_id: self.user_id,
            tags: self.tags.to_vec(),
            reactions: Reactions::default(),
            author_name: self.author_name.clone(),
            views: None,
        }
    }
}

impl Edit for PostDraft {
    fn overlay(&self, original: &Post) -> Post {
        Post {
            title: self.title.clone(),
            body: self.body.clone(),
            user_id: self.user_id,
            tags: self.tags.to_vec(),
            author_name: self.author_name.clone(),
            ..original.clone()
        }
    }
}

// --- Recipes ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub prep_time_minutes: u32,
    pub cook_time_minutes: u32,
    pub servings: u32,
    pub difficulty: Difficulty,
    pub cuisine: String,
    pub calories_per_serving: u32,
    pub tags: TagSet,
    pub user_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Default for RecipeDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            prep_time_minutes: 0,
            cook_time_minutes: 0,
            servings: 1,
            difficulty: Difficulty::Easy,
            cuisine: "American".to_string(),
            calories_per_serving: 0,
            tags: TagSet::new(),
            user_id: 1,
            image: None,
        }
    }
}

impl RecipeDraft {
    pub fn add_ingredient(&mut self, name: &str, quantity: &str) -> Result<(), ValidationError> {
        require("Ingredient name", name)?;
        self.ingredients.push(Ingredient {
            name: name.trim().to_string(),
            quantity: quantity.trim().to_string(),
        });
        Ok(())
    }

    pub fn remove_ingredient(&mut self, index: usize) -> Option<Ingredient> {
        (index < self.ingredients.len()).then(|| self.ingredients.remove(index))
    }

    pub fn add_instruction(&mut self, step: &str) -> Result<(), ValidationError> {
        require("Instruction", step)?;
        self.instructions.push(step.trim().to_string());
        Ok(())
    }

    pub fn remove_instruction(&mut self, index: usize) -> Option<String> {
        (index < self.instructions.len()).then(|| self.instructions.remove(index))
    }

    pub fn add_tag(&mut self, tag: &str) -> Result<bool, ValidationError> {
        self.tags.add(tag)
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }
}

impl From<&Recipe> for RecipeDraft {
    fn from(recipe: &Recipe) -> Self {
        Self {
            name: recipe.name.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            prep_time_minutes: recipe.prep_time_minutes,
            cook_time_minutes: recipe.cook_time_minutes,
            servings: recipe.servings,
            difficulty: recipe.difficulty,
            cuisine: recipe.cuisine.clone(),
            calories_per_serving: recipe.calories_per_serving,
            tags: TagSet::from(recipe.tags.as_slice()),
            user_id: recipe.user_id,
            image: recipe.image.clone(),
        }
    }
}

impl Draft for RecipeDraft {
    type Record = Recipe;

    fn validate(&self) -> Result<(), ValidationError> {
        require("Recipe name", &self.name)?;
        if self.ingredients.is_empty() {
            return Err(ValidationError::NoEntries("Ingredients"));
        }
        if self.instructions.is_empty() {
            return Err(ValidationError::NoEntries("Instructions"));
        }
        Ok(())
    }
}

impl Create for RecipeDraft {
    fn build(&self, id: u64) -> Recipe {
        Recipe {
            id,
            name: self.name.clone(),
            ingredients: self.ingredients.clone(),
            instructions: self.instructions.clone(),
            prep_time_minutes: self.prep_time_minutes,
            cook_time_minutes: self.cook_time_minutes,
            servings: self.servings,
            difficulty: self.difficulty,
            cuisine: self.cuisine.clone(),
            calories_per_serving: self.calories_per_serving,
            tags: self.tags.to_vec(),
            user_id: self.user_id,
            image: self.image.clone(),
        }
    }
}

impl Edit for RecipeDraft {
    fn overlay(&self, original: &Recipe) -> Recipe {
        Recipe {
            image: self.image.clone().or_else(|| original.image.clone()),
            ..self.build(original.id)
        }
    }
}

// --- Comments ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDraft {
    pub body: String,
    pub post_id: u64,
    pub user_id: u64,
    /// Resolved from the users list when known; not sent upstream.
    #[serde(skip)]
    pub username: Option<String>,
}

impl Draft for CommentDraft {
    type Record = Comment;

    fn validate(&self) -> Result<(), ValidationError> {
        require("Comment", &self.body)
    }
}

impl Create for CommentDraft {
    fn build(&self, id: u64) -> Comment {
        Comment {
            id,
            body: self.body.clone(),
            post_id: self.post_id,
            user: CommentUser {
                id: self.user_id,
                username: self.username.clone(),
                full_name: None,
            },
            likes: 0,
        }
    }
}

/// In-place edit of a comment body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentEdit {
    pub body: String,
}

impl Draft for CommentEdit {
    type Record = Comment;

    fn validate(&self) -> Result<(), ValidationError> {
        require("Comment", &self.body)
    }
}

impl Edit for CommentEdit {
    fn overlay(&self, original: &Comment) -> Comment {
        Comment {
            body: self.body.clone(),
            ..original.clone()
        }
    }
}

// --- Products ---

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub stock: u64,
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price,
            category: product.category.clone(),
            brand: product.brand.clone(),
            stock: product.stock,
        }
    }
}

impl Draft for ProductDraft {
    type Record = Product;

    fn validate(&self) -> Result<(), ValidationError> {
        require("Title", &self.title)
    }
}

impl Create for ProductDraft {
    fn build(&self, id: u64) -> Product {
        Product {
            id,
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price,
            category: self.category.clone(),
            brand: self.brand.clone(),
            stock: self.stock,
            rating: 0.0,
            discount_percentage: 0.0,
            thumbnail: None,
        }
    }
}

impl Edit for ProductDraft {
    fn overlay(&self, original: &Product) -> Product {
        Product {
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price,
            category: self.category.clone(),
            brand: self.brand.clone(),
            stock: self.stock,
            ..original.clone()
        }
    }
}
