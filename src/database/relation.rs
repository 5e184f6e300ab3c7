use std::fmt::{self, Debug, Display};

use super::{
    error::RelationError,
    schema::{CartEntry, Favorite, Follow, Uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Follow,
    Favorite,
    Cart,
}

impl Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Follow => write!(f, "follow"),
            EdgeKind::Favorite => write!(f, "favorite"),
            EdgeKind::Cart => write!(f, "cart entry"),
        }
    }
}

/// A directed (actor, target) relation stored under a uniqueness constraint
/// on the pair.
pub trait RelationKind: Send + Sync + 'static {
    type Edge: Debug + Clone + Send;

    const KIND: EdgeKind;
    const TABLE: &'static str;
    const ACTOR_COLUMN: &'static str;
    const TARGET_COLUMN: &'static str;

    fn edge(actor: Uuid, target: Uuid) -> Self::Edge;

    fn validate(_actor: Uuid, _target: Uuid) -> Result<(), RelationError> {
        Ok(())
    }
}

/// user -> user
pub struct Follows;

/// user -> recipe
pub struct Favorites;

/// user -> recipe
pub struct ShoppingCart;

impl RelationKind for Follows {
    type Edge = Follow;

    const KIND: EdgeKind = EdgeKind::Follow;
    const TABLE: &'static str = "follows";
    const ACTOR_COLUMN: &'static str = "user_id";
    const TARGET_COLUMN: &'static str = "following_id";

    fn edge(actor: Uuid, target: Uuid) -> Self::Edge {
        Follow {
            user_id: actor,
            following_id: target,
        }
    }

    fn validate(actor: Uuid, target: Uuid) -> Result<(), RelationError> {
        if actor == target {
            return Err(RelationError::SelfReference);
        }
        Ok(())
    }
}

impl RelationKind for Favorites {
    type Edge = Favorite;

    const KIND: EdgeKind = EdgeKind::Favorite;
    const TABLE: &'static str = "favorites";
    const ACTOR_COLUMN: &'static str = "user_id";
    const TARGET_COLUMN: &'static str = "recipe_id";

    fn edge(actor: Uuid, target: Uuid) -> Self::Edge {
        Favorite {
            user_id: actor,
            recipe_id: target,
        }
    }
}

impl RelationKind for ShoppingCart {
    type Edge = CartEntry;

    const KIND: EdgeKind = EdgeKind::Cart;
    const TABLE: &'static str = "shopping_cart";
    const ACTOR_COLUMN: &'static str = "user_id";
    const TARGET_COLUMN: &'static str = "recipe_id";

    fn edge(actor: Uuid, target: Uuid) -> Self::Edge {
        CartEntry {
            user_id: actor,
            recipe_id: target,
        }
    }
}
