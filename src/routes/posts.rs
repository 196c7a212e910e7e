use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use super::{finish_load, non_empty, page_actions, row_class, run_mutation, PageChrome};
use crate::error::AppResult;
use crate::resources::{models::username_for, Post, PostDraft, Resource, TagSet, UserRef};
use crate::routes::home::Html;
use crate::state::AppState;
use crate::sync::RowStatus;
use crate::views::PageEvent;

const RESOURCE: Resource = Resource::Posts;

// --- View structs ---

pub struct PostCard {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub user_id: u64,
    pub author: String,
    pub author_known: bool,
    pub custom_author: String,
    pub tags: Vec<String>,
    pub tags_joined: String,
    pub reactions: u64,
    pub likes: Option<u64>,
    pub dislikes: Option<u64>,
    pub views: Option<u64>,
    pub row_class: &'static str,
    pub failed: bool,
    pub editing: bool,
}

impl PostCard {
    fn new(post: &Post, users: &[UserRef], status: Option<&RowStatus>, editing: bool) -> Self {
        let author = match &post.author_name {
            Some(name) => name.clone(),
            None => username_for(users, post.user_id),
        };
        Self {
            id: post.id,
            title: post.title.clone(),
            body: post.body.clone(),
            user_id: post.user_id,
            author,
            author_known: users.iter().any(|u| u.id == post.user_id),
            custom_author: post.author_name.clone().unwrap_or_default(),
            tags: post.tags.clone(),
            tags_joined: post.tags.join(", "),
            reactions: post.reactions.total(),
            likes: post.reactions.get("likes"),
            dislikes: post.reactions.get("dislikes"),
            views: post.views,
            row_class: row_class(status),
            failed: status == Some(&RowStatus::Failed),
            editing,
        }
    }
}

// --- Templates ---

#[derive(Template)]
#[template(path = "pages/posts.html")]
pub struct PostsTemplate {
    pub chrome: PageChrome,
    pub posts: Vec<PostCard>,
    pub users: Vec<UserRef>,
}

// --- Forms ---

#[derive(Deserialize, Default)]
pub struct PostsQuery {
    pub edit: Option<u64>,
}

#[derive(Deserialize)]
pub struct PostForm {
    pub title: String,
    pub body: String,
    #[serde(default = "default_user")]
    pub user_id: u64,
    /// Comma-separated.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub author_name: Option<String>,
}

fn default_user() -> u64 {
    1
}

impl PostForm {
    fn draft(self) -> PostDraft {
        PostDraft {
            title: self.title.trim().to_string(),
            body: self.body.trim().to_string(),
            user_id: self.user_id,
            tags: TagSet::parse(&self.tags),
            author_name: non_empty(self.author_name),
        }
    }
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(posts_page).post(create_post))
        .route("/posts/{id}", post(update_post))
        .route("/posts/{id}/delete", post(delete_post))
        .merge(page_actions::<Post>())
}

// --- Handlers ---

async fn posts_page(
    State(state): State<AppState>,
    Query(query): Query<PostsQuery>,
) -> AppResult<Html<PostsTemplate>> {
    let loaded = state.sync.with_users::<Post>().await;
    let (loaded, mut chrome) = finish_load(&state, RESOURCE, "Posts", loaded).await;
    let (posts, users) = match loaded {
        Some((snapshot, users)) => {
            chrome = chrome.with_snapshot_age(&snapshot.saved_at);
            (snapshot.records, users)
        }
        None => (Vec::new(), Vec::new()),
    };

    let flags = state.sync.flags().for_resource(RESOURCE).await;
    let posts = posts
        .iter()
        .map(|post| PostCard::new(post, &users, flags.get(&post.id), query.edit == Some(post.id)))
        .collect();

    Ok(Html(PostsTemplate {
        chrome,
        posts,
        users,
    }))
}

async fn create_post(State(state): State<AppState>, Form(form): Form<PostForm>) -> Redirect {
    let draft = form.draft();
    run_mutation(&state, RESOURCE, PageEvent::Submit, "add", state.sync.create(&draft)).await;
    Redirect::to("/posts")
}

async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(form): Form<PostForm>,
) -> Redirect {
    let draft = form.draft();
    run_mutation(&state, RESOURCE, PageEvent::Submit, "update", state.sync.update(id, &draft))
        .await;
    Redirect::to("/posts")
}

async fn delete_post(State(state): State<AppState>, Path(id): Path<u64>) -> Redirect {
    run_mutation(&state, RESOURCE, PageEvent::Delete(id), "delete", state.sync.delete::<Post>(id))
        .await;
    Redirect::to("/posts")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Reactions;
    use std::collections::BTreeMap;

    fn post() -> Post {
        Post {
            id: 4,
            title: "Hello".into(),
            body: "World".into(),
            user_id: 2,
            tags: vec!["news".into(), "life".into()],
            reactions: Reactions::Breakdown(BTreeMap::from([
                ("likes".to_string(), 10),
                ("dislikes".to_string(), 3),
            ])),
            author_name: None,
            views: Some(120),
        }
    }

    #[test]
    fn card_resolves_author_from_users() {
        let users = vec![UserRef {
            id: 2,
            username: "michaelw".into(),
        }];
        let card = PostCard::new(&post(), &users, None, false);
        assert_eq!(card.author, "michaelw");
        assert_eq!(card.reactions, 13);
        assert_eq!(card.likes, Some(10));
        assert_eq!(card.tags_joined, "news, life");
    }

    #[test]
    fn custom_author_wins() {
        let mut post = post();
        post.author_name = Some("Guest".into());
        let card = PostCard::new(&post, &[], Some(&RowStatus::Failed), true);
        assert_eq!(card.author, "Guest");
        assert!(card.failed);
        assert!(card.editing);
    }

    #[test]
    fn form_tags_are_deduplicated() {
        let form = PostForm {
            title: " Title ".into(),
            body: "Body".into(),
            user_id: 3,
            tags: "a, b , a,  ,b".into(),
            author_name: Some("  ".into()),
        };
        let draft = form.draft();
        assert_eq!(draft.title, "Title");
        assert_eq!(draft.tags.as_slice(), &["a".to_string(), "b".to_string()]);
        assert_eq!(draft.author_name, None);
    }
}
