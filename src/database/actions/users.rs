use crate::{
    error::{GateError, Rejection},
    form::NewUser,
    relation::Follows,
    schema::{Subscription, User, Uuid},
    store::{CatalogStore, RelationStore},
};

pub async fn register_user<S: CatalogStore>(user: NewUser, store: &S) -> Result<User, GateError> {
    let user = user.validate()?;

    match store.create_user(&user).await? {
        Some(row) => {
            log::info!("Registered user {}", row.id);
            Ok(row)
        }
        None => Err(Rejection::AlreadyExists("User with this email or username").into()),
    }
}

pub async fn is_subscribed<S: RelationStore>(
    viewer: Option<Uuid>,
    author_id: Uuid,
    store: &S,
) -> Result<bool, GateError> {
    match viewer {
        Some(viewer) => Ok(store.edge_exists::<Follows>(viewer, author_id).await?),
        None => Ok(false),
    }
}

/// Every author `user_id` follows, each with at most `recipes_limit` of their
/// newest recipes and their total recipe count.
pub async fn list_subscriptions<S: RelationStore>(
    user_id: Uuid,
    recipes_limit: Option<i64>,
    store: &S,
) -> Result<Vec<Subscription>, GateError> {
    let authors = store.list_followed(user_id).await?;

    let mut subscriptions = Vec::with_capacity(authors.len());
    for author in authors {
        let recipes = store.list_author_recipes(author.id, recipes_limit).await?;
        let recipes_count = store.count_author_recipes(author.id).await?;
        subscriptions.push(Subscription {
            author,
            recipes,
            recipes_count,
        });
    }

    Ok(subscriptions)
}
