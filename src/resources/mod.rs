pub mod drafts;
pub mod models;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

pub use drafts::{
    CommentDraft, CommentEdit, Create, Draft, Edit, PostDraft, ProductDraft, RecipeDraft, TagSet,
    TodoDraft, ValidationError,
};
pub use models::{
    Comment, CommentUser, Difficulty, Ingredient, Post, Product, Reactions, Recipe, Todo, UserRef,
};

/// The remote collections the dashboard works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Products,
    Recipes,
    Todos,
    Posts,
    Comments,
    Users,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Products,
        Resource::Recipes,
        Resource::Todos,
        Resource::Posts,
        Resource::Comments,
        Resource::Users,
    ];

    /// Path segment on the remote API, also the array field of list payloads.
    pub fn path(self) -> &'static str {
        match self {
            Resource::Products => "products",
            Resource::Recipes => "recipes",
            Resource::Todos => "todos",
            Resource::Posts => "posts",
            Resource::Comments => "comments",
            Resource::Users => "users",
        }
    }

    pub fn cache_key(self) -> String {
        format!("dummyjson_{}", self.path())
    }

    /// Singular noun used in banner messages.
    pub fn noun(self) -> &'static str {
        match self {
            Resource::Products => "product",
            Resource::Recipes => "recipe",
            Resource::Todos => "todo",
            Resource::Posts => "post",
            Resource::Comments => "comment",
            Resource::Users => "user",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A record shape stored in a cached collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const RESOURCE: Resource;

    fn id(&self) -> u64;
}
