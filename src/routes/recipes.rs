use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use super::{finish_load, non_empty, page_actions, row_class, run_mutation, PageChrome};
use crate::error::AppResult;
use crate::resources::drafts::parse_count;
use crate::resources::{Difficulty, Recipe, RecipeDraft, Resource, UserRef, ValidationError};
use crate::routes::home::Html;
use crate::state::AppState;
use crate::sync::{RowStatus, SyncResult};
use crate::views::{EditorTarget, PageEvent};

const RESOURCE: Resource = Resource::Recipes;

// --- View structs ---

pub struct RecipeCard {
    pub id: u64,
    pub name: String,
    pub cuisine: String,
    pub difficulty: &'static str,
    pub total_minutes: u64,
    pub servings: u32,
    pub calories: u32,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub tags: Vec<String>,
    pub image: String,
    pub row_class: &'static str,
    pub failed: bool,
}

pub struct DifficultyChoice {
    pub value: &'static str,
    pub selected: bool,
}

/// Values for the add/edit form, rendered from the open draft.
pub struct RecipeFormView {
    pub action: String,
    pub heading: &'static str,
    pub recipe_id: Option<u64>,
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time_minutes: u32,
    pub cook_time_minutes: u32,
    pub servings: u32,
    pub difficulties: Vec<DifficultyChoice>,
    pub cuisine: String,
    pub calories_per_serving: u32,
    pub tags: Vec<String>,
    pub user_id: u64,
    pub author_known: bool,
    pub image: String,
}

impl RecipeFormView {
    fn new(target: EditorTarget, draft: &RecipeDraft, users: &[UserRef]) -> Self {
        let (action, heading, recipe_id) = match target {
            EditorTarget::New => ("/recipes".to_string(), "New recipe", None),
            EditorTarget::Existing(id) => (format!("/recipes/{id}"), "Edit recipe", Some(id)),
        };
        Self {
            action,
            heading,
            recipe_id,
            name: draft.name.clone(),
            ingredients: draft.ingredients.iter().map(ToString::to_string).collect(),
            instructions: draft.instructions.clone(),
            prep_time_minutes: draft.prep_time_minutes,
            cook_time_minutes: draft.cook_time_minutes,
            servings: draft.servings,
            difficulties: Difficulty::ALL
                .iter()
                .map(|d| DifficultyChoice {
                    value: d.as_str(),
                    selected: *d == draft.difficulty,
                })
                .collect(),
            cuisine: draft.cuisine.clone(),
            calories_per_serving: draft.calories_per_serving,
            tags: draft.tags.to_vec(),
            user_id: draft.user_id,
            author_known: users.iter().any(|u| u.id == draft.user_id),
            image: draft.image.clone().unwrap_or_default(),
        }
    }
}

// --- Templates ---

#[derive(Template)]
#[template(path = "pages/recipes.html")]
pub struct RecipesTemplate {
    pub chrome: PageChrome,
    pub recipes: Vec<RecipeCard>,
    pub form: Option<RecipeFormView>,
    pub users: Vec<UserRef>,
}

// --- Forms ---

#[derive(Deserialize, Default)]
pub struct RecipesQuery {
    pub edit: Option<u64>,
    pub new: Option<String>,
}

/// Everything the recipe form posts. Scalar fields are copied onto the open
/// draft on every submit; list entries only change through `op`.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RecipeForm {
    /// Present when the form edits an existing recipe.
    pub recipe_id: Option<u64>,
    pub op: String,
    pub name: String,
    pub prep_time_minutes: String,
    pub cook_time_minutes: String,
    pub servings: String,
    pub difficulty: String,
    pub cuisine: String,
    pub calories_per_serving: String,
    pub user_id: Option<u64>,
    pub image: Option<String>,
    pub new_ingredient_name: String,
    pub new_ingredient_quantity: String,
    pub new_instruction: String,
    pub new_tag: String,
}

/// A list edit requested by one of the form's secondary buttons.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftOp {
    AddIngredient,
    RemoveIngredient(usize),
    AddInstruction,
    RemoveInstruction(usize),
    AddTag,
    RemoveTag(String),
    Discard,
}

impl DraftOp {
    /// `add_*` and `discard` are bare; removals carry `:<index>` or `:<tag>`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (name, arg) = match raw.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (raw, None),
        };
        match (name, arg) {
            ("add_ingredient", None) => Some(Self::AddIngredient),
            ("remove_ingredient", Some(i)) => i.parse().ok().map(Self::RemoveIngredient),
            ("add_instruction", None) => Some(Self::AddInstruction),
            ("remove_instruction", Some(i)) => i.parse().ok().map(Self::RemoveInstruction),
            ("add_tag", None) => Some(Self::AddTag),
            ("remove_tag", Some(tag)) => Some(Self::RemoveTag(tag.to_string())),
            ("discard", None) => Some(Self::Discard),
            _ => None,
        }
    }
}

impl RecipeForm {
    fn target(&self) -> EditorTarget {
        self.recipe_id.map_or(EditorTarget::New, EditorTarget::Existing)
    }

    /// Copy the scalar fields onto `draft`. Fields that parse are applied
    /// even when another one does not; the first failure is returned.
    fn apply_to(&self, draft: &mut RecipeDraft) -> Result<(), ValidationError> {
        let mut first_error = None;
        let mut count = |field: &'static str, raw: &str, slot: &mut u32| {
            match parse_count(field, raw) {
                Ok(value) => *slot = value,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        };
        count("Prep time", &self.prep_time_minutes, &mut draft.prep_time_minutes);
        count("Cook time", &self.cook_time_minutes, &mut draft.cook_time_minutes);
        count("Servings", &self.servings, &mut draft.servings);
        count(
            "Calories",
            &self.calories_per_serving,
            &mut draft.calories_per_serving,
        );

        draft.name = self.name.trim().to_string();
        draft.servings = draft.servings.max(1);
        draft.difficulty = self.difficulty.parse().unwrap_or_default();
        draft.cuisine =
            non_empty(Some(self.cuisine.clone())).unwrap_or_else(|| RecipeDraft::default().cuisine);
        if let Some(user_id) = self.user_id {
            draft.user_id = user_id;
        }
        draft.image = non_empty(self.image.clone());

        first_error.map_or(Ok(()), Err)
    }

    fn apply_op(&self, op: &DraftOp, draft: &mut RecipeDraft) -> Result<(), ValidationError> {
        match op {
            DraftOp::AddIngredient => {
                draft.add_ingredient(&self.new_ingredient_name, &self.new_ingredient_quantity)?
            }
            DraftOp::RemoveIngredient(index) => {
                draft.remove_ingredient(*index);
            }
            DraftOp::AddInstruction => draft.add_instruction(&self.new_instruction)?,
            DraftOp::RemoveInstruction(index) => {
                draft.remove_instruction(*index);
            }
            DraftOp::AddTag => {
                draft.add_tag(&self.new_tag)?;
            }
            DraftOp::RemoveTag(tag) => {
                draft.remove_tag(tag);
            }
            DraftOp::Discard => {}
        }
        Ok(())
    }
}

fn form_href(target: EditorTarget) -> String {
    match target {
        EditorTarget::New => "/recipes?new=1".to_string(),
        EditorTarget::Existing(id) => format!("/recipes?edit={id}"),
    }
}

/// The open draft for `target`, or a fresh one seeded from the cache.
async fn working_draft(state: &AppState, target: EditorTarget) -> SyncResult<RecipeDraft> {
    if let Some(draft) = state.recipe_editor.current(target).await {
        return Ok(draft);
    }
    match target {
        EditorTarget::New => Ok(RecipeDraft::default()),
        EditorTarget::Existing(id) => Ok(RecipeDraft::from(&state.sync.find::<Recipe>(id).await?)),
    }
}

/// Fold the submitted form into the open draft and keep it there.
async fn edit_working_draft(
    state: &AppState,
    form: &RecipeForm,
    op: Option<&DraftOp>,
) -> SyncResult<RecipeDraft> {
    let target = form.target();
    let mut draft = working_draft(state, target).await?;
    let fields = form.apply_to(&mut draft);
    let edited = match op {
        Some(op) => form.apply_op(op, &mut draft),
        None => Ok(()),
    };
    state.recipe_editor.put(target, draft.clone()).await;
    fields.and(edited)?;
    Ok(draft)
}

async fn save_working_draft(state: &AppState, form: &RecipeForm) -> SyncResult<Recipe> {
    let draft = edit_working_draft(state, form, None).await?;
    match form.target() {
        EditorTarget::New => state.sync.create(&draft).await,
        EditorTarget::Existing(id) => state.sync.update(id, &draft).await,
    }
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(recipes_page).post(create_recipe))
        .route("/recipes/draft", post(edit_draft))
        .route("/recipes/{id}", post(update_recipe))
        .route("/recipes/{id}/delete", post(delete_recipe))
        .merge(page_actions::<Recipe>())
}

// --- Handlers ---

async fn recipes_page(
    State(state): State<AppState>,
    Query(query): Query<RecipesQuery>,
) -> AppResult<Html<RecipesTemplate>> {
    let loaded = state.sync.with_users::<Recipe>().await;
    let (loaded, mut chrome) = finish_load(&state, RESOURCE, "Recipes", loaded).await;
    let (recipes, users) = match loaded {
        Some((snapshot, users)) => {
            chrome = chrome.with_snapshot_age(&snapshot.saved_at);
            (snapshot.records, users)
        }
        None => (Vec::new(), Vec::new()),
    };

    let opened = match query.edit {
        Some(id) => match recipes.iter().find(|r| r.id == id) {
            Some(recipe) => {
                let target = EditorTarget::Existing(id);
                let draft = state
                    .recipe_editor
                    .open(target, || RecipeDraft::from(recipe))
                    .await;
                Some((target, draft))
            }
            None => None,
        },
        None if query.new.is_some() => {
            let draft = state
                .recipe_editor
                .open(EditorTarget::New, RecipeDraft::default)
                .await;
            Some((EditorTarget::New, draft))
        }
        None => None,
    };
    let form = opened.map(|(target, draft)| RecipeFormView::new(target, &draft, &users));

    let flags = state.sync.flags().for_resource(RESOURCE).await;
    let recipes = recipes
        .iter()
        .map(|recipe| {
            let status = flags.get(&recipe.id);
            RecipeCard {
                id: recipe.id,
                name: recipe.name.clone(),
                cuisine: recipe.cuisine.clone(),
                difficulty: recipe.difficulty.as_str(),
                total_minutes: recipe.total_minutes(),
                servings: recipe.servings,
                calories: recipe.calories_per_serving,
                ingredients: recipe.ingredients.iter().map(ToString::to_string).collect(),
                instructions: recipe.instructions.clone(),
                tags: recipe.tags.clone(),
                image: recipe.image.clone().unwrap_or_default(),
                row_class: row_class(status),
                failed: status == Some(&RowStatus::Failed),
            }
        })
        .collect();

    Ok(Html(RecipesTemplate {
        chrome,
        recipes,
        form,
        users,
    }))
}

/// Add/remove list entries on the open draft and return to the form.
async fn edit_draft(State(state): State<AppState>, Form(form): Form<RecipeForm>) -> Redirect {
    let op = DraftOp::parse(&form.op);
    if op == Some(DraftOp::Discard) {
        state.recipe_editor.close().await;
        return Redirect::to("/recipes");
    }

    if let Err(e) = edit_working_draft(&state, &form, op.as_ref()).await {
        let message = format!("Failed to edit recipe: {}", e.user_message());
        tracing::warn!(resource = %RESOURCE, error = %e, "{}", message);
        state.pages.apply(RESOURCE, PageEvent::Failed(message)).await;
    }
    Redirect::to(&form_href(form.target()))
}

async fn create_recipe(State(state): State<AppState>, Form(form): Form<RecipeForm>) -> Redirect {
    save_recipe(&state, RecipeForm { recipe_id: None, ..form }, "add").await
}

async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(form): Form<RecipeForm>,
) -> Redirect {
    save_recipe(&state, RecipeForm { recipe_id: Some(id), ..form }, "update").await
}

/// On failure the draft stays open so the form comes back as it was typed.
async fn save_recipe(state: &AppState, form: RecipeForm, action: &str) -> Redirect {
    let saved = run_mutation(
        state,
        RESOURCE,
        PageEvent::Submit,
        action,
        save_working_draft(state, &form),
    )
    .await;

    match saved {
        Some(_) => {
            state.recipe_editor.close().await;
            Redirect::to("/recipes")
        }
        None => Redirect::to(&form_href(form.target())),
    }
}

async fn delete_recipe(State(state): State<AppState>, Path(id): Path<u64>) -> Redirect {
    run_mutation(
        &state,
        RESOURCE,
        PageEvent::Delete(id),
        "delete",
        state.sync.delete::<Recipe>(id),
    )
    .await;
    Redirect::to("/recipes")
}
