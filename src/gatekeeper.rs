use std::sync::Arc;

use chrono::Local;

use crate::{
    actions::{add_edge, remove_edge},
    error::{GateError, RelationError, Rejection},
    permissions::{ActionType, Actor},
    relation::{Favorites, Follows, RelationKind, ShoppingCart},
    schema::{CartEntry, Favorite, Follow, User, Uuid},
    shopping::{aggregate_cart, ShoppingListExport},
    store::RelationStore,
};

/// Validates relationship mutations and turns store outcomes into uniform
/// rejection reasons. Identities are always passed in; nothing is read from
/// request state.
pub struct Gatekeeper<S> {
    store: Arc<S>,
}

impl<S> Clone for Gatekeeper<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RelationStore> Gatekeeper<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn request_follow(&self, actor: Uuid, target: Uuid) -> Result<Follow, GateError> {
        if actor == target {
            return Err(Rejection::CannotFollowSelf.into());
        }
        self.resolve_actor(actor).await?;
        if self.store.get_user(target).await?.is_none() {
            return Err(Rejection::UserNotFound.into());
        }

        match add_edge::<Follows, S>(actor, target, &self.store).await {
            Err(RelationError::Query(e)) if e.is_foreign_key_violation() => {
                log::debug!("Follow {actor} -> {target} lost a user mid-request: {e}");
                Err(Rejection::UserNotFound.into())
            }
            result => result
                .map_err(|e| reject(e, Rejection::AlreadyFollowing, Rejection::NotFollowing)),
        }
    }

    pub async fn request_unfollow(&self, actor: Uuid, target: Uuid) -> Result<(), GateError> {
        remove_edge::<Follows, S>(actor, target, &self.store)
            .await
            .map_err(|e| reject(e, Rejection::AlreadyFollowing, Rejection::NotFollowing))
    }

    pub async fn request_favorite(
        &self,
        actor: Uuid,
        recipe_id: Uuid,
    ) -> Result<Favorite, GateError> {
        self.add_recipe_edge::<Favorites>(actor, recipe_id).await
    }

    pub async fn request_unfavorite(&self, actor: Uuid, recipe_id: Uuid) -> Result<(), GateError> {
        self.remove_recipe_edge::<Favorites>(actor, recipe_id).await
    }

    pub async fn request_cart_add(
        &self,
        actor: Uuid,
        recipe_id: Uuid,
    ) -> Result<CartEntry, GateError> {
        self.add_recipe_edge::<ShoppingCart>(actor, recipe_id).await
    }

    pub async fn request_cart_remove(&self, actor: Uuid, recipe_id: Uuid) -> Result<(), GateError> {
        self.remove_recipe_edge::<ShoppingCart>(actor, recipe_id).await
    }

    /// Aggregates and renders the actor's cart. An empty cart yields
    /// `ShoppingListExport::Empty` instead of an empty document.
    pub async fn download_shopping_list(&self, actor: Uuid) -> Result<ShoppingListExport, GateError> {
        let user = self.resolve_actor(actor).await?;

        let list = aggregate_cart(actor, &*self.store).await?;
        Ok(ShoppingListExport::build(&list, &user.username, &Local::now()))
    }

    async fn add_recipe_edge<R: RelationKind>(
        &self,
        actor: Uuid,
        recipe_id: Uuid,
    ) -> Result<R::Edge, GateError> {
        self.resolve_actor(actor).await?;
        if self.store.get_recipe(recipe_id).await?.is_none() {
            return Err(Rejection::RecipeNotFound.into());
        }

        match add_edge::<R, S>(actor, recipe_id, &self.store).await {
            // an endpoint was deleted after the checks above
            Err(RelationError::Query(e)) if e.is_foreign_key_violation() => {
                log::debug!("{} {actor} -> {recipe_id} lost an endpoint: {e}", R::KIND);
                match self.store.get_user(actor).await? {
                    Some(_) => Err(Rejection::RecipeNotFound.into()),
                    None => Err(Rejection::UserNotFound.into()),
                }
            }
            result => result.map_err(|e| reject(e, Rejection::AlreadyPresent, Rejection::NotPresent)),
        }
    }

    /// Loads the acting user and checks they may manage their own relations.
    async fn resolve_actor(&self, actor: Uuid) -> Result<User, GateError> {
        let user = match self.store.get_user(actor).await? {
            Some(user) => user,
            None => return Err(Rejection::UserNotFound.into()),
        };

        Actor::from(&user).authenticate(ActionType::ManageOwnRelations)?;
        Ok(user)
    }

    async fn remove_recipe_edge<R: RelationKind>(
        &self,
        actor: Uuid,
        recipe_id: Uuid,
    ) -> Result<(), GateError> {
        remove_edge::<R, S>(actor, recipe_id, &self.store)
            .await
            .map_err(|e| reject(e, Rejection::AlreadyPresent, Rejection::NotPresent))
    }
}

fn reject(err: RelationError, duplicate: Rejection, missing: Rejection) -> GateError {
    match err {
        RelationError::SelfReference => Rejection::CannotFollowSelf.into(),
        RelationError::Duplicate => duplicate.into(),
        RelationError::NotFound => missing.into(),
        RelationError::Query(e) => {
            log::error!("Relationship storage failed: {e}");
            e.into()
        }
    }
}
