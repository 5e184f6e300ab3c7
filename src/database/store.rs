use async_trait::async_trait;

use super::{
    error::QueryError,
    form::{NewIngredient, NewTag, NewUser, ValidRecipe},
    relation::RelationKind,
    schema::{Ingredient, Recipe, RecipePart, Tag, User, Uuid},
};

/// Narrows a recipe listing. Every set field must hold; an unset field keeps
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<Uuid>,
    /// A recipe matches when it carries any of these tag slugs.
    pub tags: Vec<String>,
    /// `(user, wanted)`: keep recipes whose favorite edge from `user` exists
    /// exactly when `wanted` is true.
    pub favorited: Option<(Uuid, bool)>,
    pub in_cart: Option<(Uuid, bool)>,
}

/// Storage for the follow/favorite/cart relations and the reads built on them.
///
/// `insert_edge` must be an atomic insert-if-absent backed by a uniqueness
/// constraint on (actor, target): of any number of concurrent inserts for the
/// same pair exactly one returns `true`.
#[async_trait]
pub trait RelationStore: Send + Sync {
    async fn insert_edge<R: RelationKind>(
        &self,
        actor: Uuid,
        target: Uuid,
    ) -> Result<bool, QueryError>;

    async fn delete_edge<R: RelationKind>(
        &self,
        actor: Uuid,
        target: Uuid,
    ) -> Result<bool, QueryError>;

    async fn edge_exists<R: RelationKind>(
        &self,
        actor: Uuid,
        target: Uuid,
    ) -> Result<bool, QueryError>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, QueryError>;

    async fn get_recipe(&self, id: Uuid) -> Result<Option<Recipe>, QueryError>;

    /// Stable within a single call, no other ordering guarantee.
    async fn list_cart_recipes(&self, user_id: Uuid) -> Result<Vec<Recipe>, QueryError>;

    async fn list_recipe_parts(&self, recipe_id: Uuid) -> Result<Vec<RecipePart>, QueryError>;

    async fn list_followed(&self, user_id: Uuid) -> Result<Vec<User>, QueryError>;

    async fn list_author_recipes(
        &self,
        author_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Recipe>, QueryError>;

    async fn count_author_recipes(&self, author_id: Uuid) -> Result<i64, QueryError>;

    /// Newest first.
    async fn list_recipes(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>, QueryError>;
}

/// Writes for users, ingredients, tags and recipes. Every `create_*` returns
/// `None` instead of inserting when a uniqueness constraint would be violated.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> Result<Option<User>, QueryError>;

    async fn create_ingredient(
        &self,
        ingredient: &NewIngredient,
    ) -> Result<Option<Ingredient>, QueryError>;

    async fn get_ingredient(&self, id: Uuid) -> Result<Option<Ingredient>, QueryError>;

    /// Case-insensitive name prefix match, ordered by name and unit.
    async fn search_ingredients(&self, prefix: &str) -> Result<Vec<Ingredient>, QueryError>;

    async fn create_tag(&self, tag: &NewTag) -> Result<Option<Tag>, QueryError>;

    async fn get_tag(&self, id: Uuid) -> Result<Option<Tag>, QueryError>;

    /// Inserts the recipe, its ingredient amounts and tag links as one unit.
    async fn create_recipe(
        &self,
        author_id: Uuid,
        recipe: &ValidRecipe,
    ) -> Result<Option<Recipe>, QueryError>;

    /// Replaces the recipe fields, ingredient amounts and tag links as one
    /// unit. `None` when the recipe doesn't exist. Taking a name the author
    /// already uses fails with `Violation::Unique`.
    async fn update_recipe(
        &self,
        id: Uuid,
        recipe: &ValidRecipe,
    ) -> Result<Option<Recipe>, QueryError>;

    /// Cascades to ingredient amounts, tag links, favorites and cart entries.
    async fn delete_recipe(&self, id: Uuid) -> Result<bool, QueryError>;

    /// Cascades to authored recipes and every relation touching the user.
    async fn delete_user(&self, id: Uuid) -> Result<bool, QueryError>;
}
