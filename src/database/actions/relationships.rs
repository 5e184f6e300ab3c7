use crate::{
    error::RelationError,
    relation::{Favorites, Follows, RelationKind, ShoppingCart},
    schema::{CartEntry, Favorite, Follow, Recipe, Uuid},
    store::RelationStore,
};

/// Creates the (actor, target) edge of kind `R`.
///
/// The uniqueness check is the insert itself, so of two racing calls for the
/// same pair one gets `RelationError::Duplicate`.
pub async fn add_edge<R: RelationKind, S: RelationStore>(
    actor: Uuid,
    target: Uuid,
    store: &S,
) -> Result<R::Edge, RelationError> {
    R::validate(actor, target)?;

    if !store.insert_edge::<R>(actor, target).await? {
        log::debug!("Duplicate {} {actor} -> {target} rejected", R::KIND);
        return Err(RelationError::Duplicate);
    }

    log::info!("Created {} {actor} -> {target}", R::KIND);
    Ok(R::edge(actor, target))
}

pub async fn remove_edge<R: RelationKind, S: RelationStore>(
    actor: Uuid,
    target: Uuid,
    store: &S,
) -> Result<(), RelationError> {
    if !store.delete_edge::<R>(actor, target).await? {
        log::debug!("No {} {actor} -> {target} to remove", R::KIND);
        return Err(RelationError::NotFound);
    }

    log::info!("Removed {} {actor} -> {target}", R::KIND);
    Ok(())
}

pub async fn add_follow<S: RelationStore>(
    follower: Uuid,
    followed: Uuid,
    store: &S,
) -> Result<Follow, RelationError> {
    add_edge::<Follows, S>(follower, followed, store).await
}

pub async fn remove_follow<S: RelationStore>(
    follower: Uuid,
    followed: Uuid,
    store: &S,
) -> Result<(), RelationError> {
    remove_edge::<Follows, S>(follower, followed, store).await
}

pub async fn add_favorite<S: RelationStore>(
    user_id: Uuid,
    recipe_id: Uuid,
    store: &S,
) -> Result<Favorite, RelationError> {
    add_edge::<Favorites, S>(user_id, recipe_id, store).await
}

pub async fn remove_favorite<S: RelationStore>(
    user_id: Uuid,
    recipe_id: Uuid,
    store: &S,
) -> Result<(), RelationError> {
    remove_edge::<Favorites, S>(user_id, recipe_id, store).await
}

pub async fn add_cart_entry<S: RelationStore>(
    user_id: Uuid,
    recipe_id: Uuid,
    store: &S,
) -> Result<CartEntry, RelationError> {
    add_edge::<ShoppingCart, S>(user_id, recipe_id, store).await
}

pub async fn remove_cart_entry<S: RelationStore>(
    user_id: Uuid,
    recipe_id: Uuid,
    store: &S,
) -> Result<(), RelationError> {
    remove_edge::<ShoppingCart, S>(user_id, recipe_id, store).await
}

pub async fn list_cart_recipes<S: RelationStore>(
    user_id: Uuid,
    store: &S,
) -> Result<Vec<Recipe>, RelationError> {
    Ok(store.list_cart_recipes(user_id).await?)
}
