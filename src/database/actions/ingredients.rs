use crate::{
    error::{GateError, Rejection},
    form::NewIngredient,
    permissions::{ActionType, Actor},
    schema::Ingredient,
    store::CatalogStore,
};

pub async fn create_ingredient<S: CatalogStore>(
    actor: &Actor,
    ingredient: NewIngredient,
    store: &S,
) -> Result<Ingredient, GateError> {
    actor.authenticate(ActionType::ManageIngredients)?;
    let ingredient = ingredient.validate()?;

    match store.create_ingredient(&ingredient).await? {
        Some(row) => Ok(row),
        None => Err(Rejection::AlreadyExists("Ingredient with this unit").into()),
    }
}

/// Public catalog lookup by case-insensitive name prefix.
pub async fn search_ingredients<S: CatalogStore>(
    prefix: &str,
    store: &S,
) -> Result<Vec<Ingredient>, GateError> {
    Ok(store.search_ingredients(prefix.trim()).await?)
}
