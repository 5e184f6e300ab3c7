use crate::{
    error::{GateError, Rejection, ValidationError},
    form::{RecipeForm, RecipeQuery, ValidRecipe},
    permissions::{ActionType, Actor},
    relation::{Favorites, ShoppingCart},
    schema::{Recipe, RecipeFlags, Uuid},
    store::{CatalogStore, RelationStore},
};

/// Validates the submission, checks that every referenced ingredient and tag
/// exists, then stores the recipe in one unit. Nothing is written when any
/// check fails.
pub async fn create_recipe<S: RelationStore + CatalogStore>(
    actor: &Actor,
    form: RecipeForm,
    store: &S,
) -> Result<Recipe, GateError> {
    actor.authenticate(ActionType::CreateRecipes)?;
    let recipe = form.validate()?;
    check_references(&recipe, store).await?;

    match store.create_recipe(actor.user_id, &recipe).await? {
        Some(row) => {
            log::info!("User {} published recipe {}", actor.user_id, row.id);
            Ok(row)
        }
        None => Err(Rejection::AlreadyExists("Recipe with this name").into()),
    }
}

pub async fn get_recipe_mut<S: RelationStore>(
    id: Uuid,
    actor: &Actor,
    store: &S,
) -> Result<Recipe, GateError> {
    let recipe = store.get_recipe(id).await?;

    match recipe {
        Some(recipe) => {
            actor.authenticate_recipe(&recipe)?;
            Ok(recipe)
        }
        None => Err(Rejection::RecipeNotFound.into()),
    }
}

/// Replaces the fields, ingredients and tags of a recipe. Author or
/// administrator only; the submission is validated as on creation.
pub async fn update_recipe<S: RelationStore + CatalogStore>(
    id: Uuid,
    actor: &Actor,
    form: RecipeForm,
    store: &S,
) -> Result<Recipe, GateError> {
    get_recipe_mut(id, actor, store).await?;
    let recipe = form.validate()?;
    check_references(&recipe, store).await?;

    match store.update_recipe(id, &recipe).await {
        Ok(Some(row)) => {
            log::info!("User {} updated recipe {id}", actor.user_id);
            Ok(row)
        }
        Ok(None) => Err(Rejection::RecipeNotFound.into()),
        Err(e) if e.is_unique_violation() => {
            Err(Rejection::AlreadyExists("Recipe with this name").into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Author or administrator only.
pub async fn delete_recipe<S: RelationStore + CatalogStore>(
    id: Uuid,
    actor: &Actor,
    store: &S,
) -> Result<(), GateError> {
    get_recipe_mut(id, actor, store).await?;

    if !store.delete_recipe(id).await? {
        return Err(Rejection::RecipeNotFound.into());
    }

    log::info!("User {} deleted recipe {id}", actor.user_id);
    Ok(())
}

pub async fn list_recipes<S: RelationStore>(
    viewer: Option<Uuid>,
    query: RecipeQuery,
    store: &S,
) -> Result<Vec<Recipe>, GateError> {
    Ok(store.list_recipes(&query.filter(viewer)).await?)
}

/// Flags are scoped to `viewer`; an anonymous viewer gets neither.
pub async fn recipe_flags<S: RelationStore>(
    viewer: Option<Uuid>,
    recipe_id: Uuid,
    store: &S,
) -> Result<RecipeFlags, GateError> {
    let Some(viewer) = viewer else {
        return Ok(RecipeFlags::default());
    };

    Ok(RecipeFlags {
        is_favorited: store.edge_exists::<Favorites>(viewer, recipe_id).await?,
        is_in_shopping_cart: store.edge_exists::<ShoppingCart>(viewer, recipe_id).await?,
    })
}

async fn check_references<S: CatalogStore>(
    recipe: &ValidRecipe,
    store: &S,
) -> Result<(), GateError> {
    for part in recipe.ingredients() {
        if store.get_ingredient(part.id).await?.is_none() {
            return Err(ValidationError::UnknownIngredient(part.id).into());
        }
    }
    for tag in recipe.tags() {
        if store.get_tag(*tag).await?.is_none() {
            return Err(ValidationError::UnknownTag(*tag).into());
        }
    }
    Ok(())
}
