use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    error::{QueryError, Violation},
    form::{NewIngredient, NewTag, NewUser, ValidRecipe},
    relation::{EdgeKind, RelationKind},
    schema::{Ingredient, Recipe, RecipePart, Tag, User, UserRole, Uuid},
    store::{CatalogStore, RecipeFilter, RelationStore},
};

#[derive(Default)]
struct Tables {
    next_id: Uuid,
    users: BTreeMap<Uuid, User>,
    ingredients: BTreeMap<Uuid, Ingredient>,
    tags: BTreeMap<Uuid, Tag>,
    recipes: BTreeMap<Uuid, Recipe>,
    // recipe -> (ingredient, amount)
    recipe_parts: BTreeMap<Uuid, Vec<(Uuid, i32)>>,
    recipe_tags: BTreeMap<Uuid, Vec<Uuid>>,
    follows: BTreeSet<(Uuid, Uuid)>,
    favorites: BTreeSet<(Uuid, Uuid)>,
    cart: BTreeSet<(Uuid, Uuid)>,
}

impl Tables {
    fn next_id(&mut self) -> Uuid {
        self.next_id += 1;
        self.next_id
    }

    fn edges(&self, kind: EdgeKind) -> &BTreeSet<(Uuid, Uuid)> {
        match kind {
            EdgeKind::Follow => &self.follows,
            EdgeKind::Favorite => &self.favorites,
            EdgeKind::Cart => &self.cart,
        }
    }

    fn edges_mut(&mut self, kind: EdgeKind) -> &mut BTreeSet<(Uuid, Uuid)> {
        match kind {
            EdgeKind::Follow => &mut self.follows,
            EdgeKind::Favorite => &mut self.favorites,
            EdgeKind::Cart => &mut self.cart,
        }
    }

    fn check_links(&self, recipe: &ValidRecipe) -> Result<(), QueryError> {
        if let Some(part) = recipe
            .ingredients()
            .iter()
            .find(|part| !self.ingredients.contains_key(&part.id))
        {
            return Err(QueryError::violated(
                Violation::ForeignKey,
                format!("recipe_ingredients {} violates a foreign key constraint", part.id),
            ));
        }
        if let Some(tag) = recipe.tags().iter().find(|tag| !self.tags.contains_key(tag)) {
            return Err(QueryError::violated(
                Violation::ForeignKey,
                format!("recipe_tags {tag} violates a foreign key constraint"),
            ));
        }
        Ok(())
    }

    fn replace_links(&mut self, id: Uuid, recipe: &ValidRecipe) {
        self.recipe_parts.insert(
            id,
            recipe
                .ingredients()
                .iter()
                .map(|part| (part.id, part.amount))
                .collect(),
        );
        self.recipe_tags.insert(id, recipe.tags().to_vec());
    }

    fn remove_recipe(&mut self, id: Uuid) -> bool {
        if self.recipes.remove(&id).is_none() {
            return false;
        }
        self.recipe_parts.remove(&id);
        self.recipe_tags.remove(&id);
        self.favorites.retain(|(_, recipe)| *recipe != id);
        self.cart.retain(|(_, recipe)| *recipe != id);
        true
    }
}

/// In-process store holding every table behind one lock. Each operation runs
/// under a single guard, so insert-if-absent is atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_role(&self, user_id: Uuid, role: UserRole) -> bool {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&user_id) {
            Some(user) => {
                user.role = role;
                true
            }
            None => false,
        }
    }

    pub async fn edge_count(&self, kind: EdgeKind) -> usize {
        self.tables.read().await.edges(kind).len()
    }
}

#[async_trait]
impl RelationStore for MemoryStore {
    async fn insert_edge<R: RelationKind>(
        &self,
        actor: Uuid,
        target: Uuid,
    ) -> Result<bool, QueryError> {
        let mut tables = self.tables.write().await;

        // mirrors the foreign keys and CHECK constraint of the SQL schema
        let target_exists = match R::KIND {
            EdgeKind::Follow => tables.users.contains_key(&target),
            EdgeKind::Favorite | EdgeKind::Cart => tables.recipes.contains_key(&target),
        };
        if !tables.users.contains_key(&actor) || !target_exists {
            return Err(QueryError::violated(
                Violation::ForeignKey,
                format!(
                    "{} ({actor}, {target}) violates a foreign key constraint",
                    R::TABLE
                ),
            ));
        }
        if R::KIND == EdgeKind::Follow && actor == target {
            return Err(QueryError::violated(
                Violation::Check,
                format!(
                    "{} ({actor}, {target}) violates a check constraint",
                    R::TABLE
                ),
            ));
        }

        Ok(tables.edges_mut(R::KIND).insert((actor, target)))
    }

    async fn delete_edge<R: RelationKind>(
        &self,
        actor: Uuid,
        target: Uuid,
    ) -> Result<bool, QueryError> {
        let mut tables = self.tables.write().await;
        Ok(tables.edges_mut(R::KIND).remove(&(actor, target)))
    }

    async fn edge_exists<R: RelationKind>(
        &self,
        actor: Uuid,
        target: Uuid,
    ) -> Result<bool, QueryError> {
        let tables = self.tables.read().await;
        Ok(tables.edges(R::KIND).contains(&(actor, target)))
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, QueryError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_recipe(&self, id: Uuid) -> Result<Option<Recipe>, QueryError> {
        Ok(self.tables.read().await.recipes.get(&id).cloned())
    }

    async fn list_cart_recipes(&self, user_id: Uuid) -> Result<Vec<Recipe>, QueryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .cart
            .range((user_id, Uuid::MIN)..=(user_id, Uuid::MAX))
            .filter_map(|(_, recipe)| tables.recipes.get(recipe).cloned())
            .collect())
    }

    async fn list_recipe_parts(&self, recipe_id: Uuid) -> Result<Vec<RecipePart>, QueryError> {
        let tables = self.tables.read().await;
        let parts = match tables.recipe_parts.get(&recipe_id) {
            Some(parts) => parts,
            None => return Ok(vec![]),
        };

        Ok(parts
            .iter()
            .filter_map(|(ingredient_id, amount)| {
                tables
                    .ingredients
                    .get(ingredient_id)
                    .map(|ingredient| RecipePart {
                        recipe_id,
                        ingredient_id: *ingredient_id,
                        name: ingredient.name.to_owned(),
                        measurement_unit: ingredient.measurement_unit.to_owned(),
                        amount: *amount,
                    })
            })
            .collect())
    }

    async fn list_followed(&self, user_id: Uuid) -> Result<Vec<User>, QueryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .range((user_id, Uuid::MIN)..=(user_id, Uuid::MAX))
            .filter_map(|(_, author)| tables.users.get(author).cloned())
            .collect())
    }

    async fn list_author_recipes(
        &self,
        author_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Recipe>, QueryError> {
        let tables = self.tables.read().await;
        let limit = limit
            .map(|limit| usize::try_from(limit).unwrap_or(0))
            .unwrap_or(usize::MAX);

        Ok(tables
            .recipes
            .values()
            .rev()
            .filter(|recipe| recipe.author_id == author_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_author_recipes(&self, author_id: Uuid) -> Result<i64, QueryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .values()
            .filter(|recipe| recipe.author_id == author_id)
            .count() as i64)
    }

    async fn list_recipes(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>, QueryError> {
        let tables = self.tables.read().await;
        let has_edge = |edges: &BTreeSet<(Uuid, Uuid)>, user: Uuid, recipe: Uuid, wanted: bool| {
            edges.contains(&(user, recipe)) == wanted
        };

        Ok(tables
            .recipes
            .values()
            .rev()
            .filter(|recipe| filter.author.map_or(true, |author| recipe.author_id == author))
            .filter(|recipe| {
                filter.tags.is_empty()
                    || tables.recipe_tags.get(&recipe.id).is_some_and(|tags| {
                        tags.iter().any(|tag| {
                            tables
                                .tags
                                .get(tag)
                                .is_some_and(|tag| filter.tags.contains(&tag.slug))
                        })
                    })
            })
            .filter(|recipe| {
                filter.favorited.map_or(true, |(user, wanted)| {
                    has_edge(&tables.favorites, user, recipe.id, wanted)
                })
            })
            .filter(|recipe| {
                filter.in_cart.map_or(true, |(user, wanted)| {
                    has_edge(&tables.cart, user, recipe.id, wanted)
                })
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn create_user(&self, user: &NewUser) -> Result<Option<User>, QueryError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Ok(None);
        }

        let row = User {
            id: tables.next_id(),
            email: user.email.to_owned(),
            username: user.username.to_owned(),
            first_name: user.first_name.to_owned(),
            last_name: user.last_name.to_owned(),
            role: UserRole::User,
        };
        tables.users.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn create_ingredient(
        &self,
        ingredient: &NewIngredient,
    ) -> Result<Option<Ingredient>, QueryError> {
        let mut tables = self.tables.write().await;
        if tables.ingredients.values().any(|i| {
            i.name == ingredient.name && i.measurement_unit == ingredient.measurement_unit
        }) {
            return Ok(None);
        }

        let row = Ingredient {
            id: tables.next_id(),
            name: ingredient.name.to_owned(),
            measurement_unit: ingredient.measurement_unit.to_owned(),
        };
        tables.ingredients.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn get_ingredient(&self, id: Uuid) -> Result<Option<Ingredient>, QueryError> {
        Ok(self.tables.read().await.ingredients.get(&id).cloned())
    }

    async fn search_ingredients(&self, prefix: &str) -> Result<Vec<Ingredient>, QueryError> {
        let prefix = prefix.to_lowercase();
        let tables = self.tables.read().await;

        let mut rows: Vec<Ingredient> = tables
            .ingredients
            .values()
            .filter(|i| i.name.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (&a.name, &a.measurement_unit).cmp(&(&b.name, &b.measurement_unit))
        });
        Ok(rows)
    }

    async fn create_tag(&self, tag: &NewTag) -> Result<Option<Tag>, QueryError> {
        let mut tables = self.tables.write().await;
        if tables
            .tags
            .values()
            .any(|t| t.name == tag.name || t.color == tag.color || t.slug == tag.slug)
        {
            return Ok(None);
        }

        let row = Tag {
            id: tables.next_id(),
            name: tag.name.to_owned(),
            color: tag.color.to_owned(),
            slug: tag.slug.to_owned(),
        };
        tables.tags.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn get_tag(&self, id: Uuid) -> Result<Option<Tag>, QueryError> {
        Ok(self.tables.read().await.tags.get(&id).cloned())
    }

    async fn create_recipe(
        &self,
        author_id: Uuid,
        recipe: &ValidRecipe,
    ) -> Result<Option<Recipe>, QueryError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&author_id) {
            return Err(QueryError::violated(
                Violation::ForeignKey,
                format!("recipes author {author_id} violates a foreign key constraint"),
            ));
        }
        tables.check_links(recipe)?;

        if tables
            .recipes
            .values()
            .any(|r| r.author_id == author_id && r.name == recipe.name())
        {
            return Ok(None);
        }

        let row = Recipe {
            id: tables.next_id(),
            author_id,
            name: recipe.name().to_owned(),
            text: recipe.text().to_owned(),
            image: recipe.image().to_owned(),
            cooking_time: recipe.cooking_time(),
        };
        tables.replace_links(row.id, recipe);
        tables.recipes.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn update_recipe(
        &self,
        id: Uuid,
        recipe: &ValidRecipe,
    ) -> Result<Option<Recipe>, QueryError> {
        let mut tables = self.tables.write().await;
        let author_id = match tables.recipes.get(&id) {
            Some(row) => row.author_id,
            None => return Ok(None),
        };
        tables.check_links(recipe)?;

        if tables
            .recipes
            .values()
            .any(|r| r.id != id && r.author_id == author_id && r.name == recipe.name())
        {
            return Err(QueryError::violated(
                Violation::Unique,
                format!("recipes ({author_id}, {}) violates a unique constraint", recipe.name()),
            ));
        }

        tables.replace_links(id, recipe);
        let row = match tables.recipes.get_mut(&id) {
            Some(row) => row,
            None => return Ok(None),
        };
        row.name = recipe.name().to_owned();
        row.text = recipe.text().to_owned();
        row.image = recipe.image().to_owned();
        row.cooking_time = recipe.cooking_time();
        Ok(Some(row.clone()))
    }

    async fn delete_recipe(&self, id: Uuid) -> Result<bool, QueryError> {
        Ok(self.tables.write().await.remove_recipe(id))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, QueryError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }

        let authored: Vec<Uuid> = tables
            .recipes
            .values()
            .filter(|recipe| recipe.author_id == id)
            .map(|recipe| recipe.id)
            .collect();
        for recipe in authored {
            tables.remove_recipe(recipe);
        }

        tables
            .follows
            .retain(|(user, following)| *user != id && *following != id);
        tables.favorites.retain(|(user, _)| *user != id);
        tables.cart.retain(|(user, _)| *user != id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::{Favorites, Follows};

    fn user(name: &str) -> NewUser {
        NewUser {
            email: format!("{name}@example.com"),
            username: name.to_owned(),
            first_name: name.to_owned(),
            last_name: "Test".to_owned(),
        }
    }

    #[tokio::test]
    async fn unique_email_and_username() {
        let store = MemoryStore::new();
        assert!(store.create_user(&user("anna")).await.unwrap().is_some());
        assert!(store.create_user(&user("anna")).await.unwrap().is_none());

        let mut other = user("bert");
        other.email = "anna@example.com".to_owned();
        assert!(store.create_user(&other).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ingredient_unique_per_unit() {
        let store = MemoryStore::new();
        let grams = NewIngredient {
            name: "sugar".to_owned(),
            measurement_unit: "g".to_owned(),
        };
        let cups = NewIngredient {
            name: "sugar".to_owned(),
            measurement_unit: "cup".to_owned(),
        };
        assert!(store.create_ingredient(&grams).await.unwrap().is_some());
        assert!(store.create_ingredient(&cups).await.unwrap().is_some());
        assert!(store.create_ingredient(&grams).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn edges_require_existing_endpoints() {
        let store = MemoryStore::new();
        let anna = store.create_user(&user("anna")).await.unwrap().unwrap();

        let missing = store.insert_edge::<Follows>(anna.id, 999).await.unwrap_err();
        assert!(missing.is_foreign_key_violation());
        let missing = store.insert_edge::<Favorites>(999, 1).await.unwrap_err();
        assert!(missing.is_foreign_key_violation());

        let own = store.insert_edge::<Follows>(anna.id, anna.id).await.unwrap_err();
        assert_eq!(own.violation(), Some(Violation::Check));
    }

    #[tokio::test]
    async fn deleting_user_drops_follow_edges_both_ways() {
        let store = MemoryStore::new();
        let anna = store.create_user(&user("anna")).await.unwrap().unwrap();
        let bert = store.create_user(&user("bert")).await.unwrap().unwrap();
        let cleo = store.create_user(&user("cleo")).await.unwrap().unwrap();

        assert!(store.insert_edge::<Follows>(anna.id, bert.id).await.unwrap());
        assert!(store.insert_edge::<Follows>(bert.id, cleo.id).await.unwrap());
        assert!(store.insert_edge::<Follows>(cleo.id, anna.id).await.unwrap());

        assert!(store.delete_user(bert.id).await.unwrap());
        assert_eq!(store.edge_count(EdgeKind::Follow).await, 1);
        assert!(store.edge_exists::<Follows>(cleo.id, anna.id).await.unwrap());
        assert!(!store.delete_user(bert.id).await.unwrap());
    }
}
