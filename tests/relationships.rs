mod common;

use common::Kitchen;
use foodgram_sdk::{
    add_cart_entry, add_favorite, add_follow,
    error::RelationError,
    list_cart_recipes,
    relation::{EdgeKind, Favorites},
    remove_cart_entry, remove_favorite, remove_follow,
    schema::{Favorite, Follow},
    store::RelationStore,
};

#[tokio::test]
async fn second_favorite_is_a_duplicate() {
    let kitchen = Kitchen::new().await;
    let anna = kitchen.user("anna").await;
    let pancakes = kitchen.recipe(&anna, "pancakes", &[(&kitchen.flour, 200)]).await;
    let store = &*kitchen.store;

    let favorite = add_favorite(anna.id, pancakes.id, store).await.unwrap();
    assert_eq!(
        favorite,
        Favorite {
            user_id: anna.id,
            recipe_id: pancakes.id
        }
    );
    assert!(matches!(
        add_favorite(anna.id, pancakes.id, store).await,
        Err(RelationError::Duplicate)
    ));
    assert_eq!(kitchen.store.edge_count(EdgeKind::Favorite).await, 1);
}

#[tokio::test]
async fn self_follow_always_fails() {
    let kitchen = Kitchen::new().await;
    let anna = kitchen.user("anna").await;
    let bert = kitchen.user("bert").await;
    let store = &*kitchen.store;

    assert!(matches!(
        add_follow(anna.id, anna.id, store).await,
        Err(RelationError::SelfReference)
    ));

    add_follow(anna.id, bert.id, store).await.unwrap();
    add_follow(bert.id, anna.id, store).await.unwrap();
    assert!(matches!(
        add_follow(anna.id, anna.id, store).await,
        Err(RelationError::SelfReference)
    ));

    // even for an id nothing is stored under
    assert!(matches!(
        add_follow(4242, 4242, store).await,
        Err(RelationError::SelfReference)
    ));
    assert_eq!(kitchen.store.edge_count(EdgeKind::Follow).await, 2);
}

#[tokio::test]
async fn follow_is_directed() {
    let kitchen = Kitchen::new().await;
    let anna = kitchen.user("anna").await;
    let bert = kitchen.user("bert").await;
    let store = &*kitchen.store;

    assert_eq!(
        add_follow(anna.id, bert.id, store).await.unwrap(),
        Follow {
            user_id: anna.id,
            following_id: bert.id
        }
    );
    assert!(matches!(
        add_follow(anna.id, bert.id, store).await,
        Err(RelationError::Duplicate)
    ));
    assert!(matches!(
        remove_follow(bert.id, anna.id, store).await,
        Err(RelationError::NotFound)
    ));

    remove_follow(anna.id, bert.id, store).await.unwrap();
    assert!(matches!(
        remove_follow(anna.id, bert.id, store).await,
        Err(RelationError::NotFound)
    ));
}

#[tokio::test]
async fn removing_absent_cart_entry_changes_nothing() {
    let kitchen = Kitchen::new().await;
    let anna = kitchen.user("anna").await;
    let bert = kitchen.user("bert").await;
    let pancakes = kitchen.recipe(&anna, "pancakes", &[(&kitchen.flour, 200)]).await;
    let omelette = kitchen.recipe(&anna, "omelette", &[(&kitchen.egg, 3)]).await;
    let store = &*kitchen.store;

    add_cart_entry(bert.id, omelette.id, store).await.unwrap();

    for _ in 0..3 {
        assert!(matches!(
            remove_cart_entry(bert.id, pancakes.id, store).await,
            Err(RelationError::NotFound)
        ));
    }
    assert_eq!(kitchen.store.edge_count(EdgeKind::Cart).await, 1);
    assert_eq!(list_cart_recipes(bert.id, store).await.unwrap(), vec![omelette]);
}

#[tokio::test]
async fn favorites_and_cart_are_independent() {
    let kitchen = Kitchen::new().await;
    let anna = kitchen.user("anna").await;
    let pancakes = kitchen.recipe(&anna, "pancakes", &[(&kitchen.flour, 200)]).await;
    let store = &*kitchen.store;

    add_favorite(anna.id, pancakes.id, store).await.unwrap();
    add_cart_entry(anna.id, pancakes.id, store).await.unwrap();

    remove_favorite(anna.id, pancakes.id, store).await.unwrap();
    assert!(!store
        .edge_exists::<Favorites>(anna.id, pancakes.id)
        .await
        .unwrap());
    assert_eq!(
        list_cart_recipes(anna.id, store).await.unwrap(),
        vec![pancakes]
    );
}

#[tokio::test]
async fn cart_listing_is_per_user() {
    let kitchen = Kitchen::new().await;
    let anna = kitchen.user("anna").await;
    let bert = kitchen.user("bert").await;
    let pancakes = kitchen.recipe(&anna, "pancakes", &[(&kitchen.flour, 200)]).await;
    let omelette = kitchen.recipe(&anna, "omelette", &[(&kitchen.egg, 3)]).await;
    let store = &*kitchen.store;

    add_cart_entry(anna.id, pancakes.id, store).await.unwrap();
    add_cart_entry(anna.id, omelette.id, store).await.unwrap();
    add_cart_entry(bert.id, omelette.id, store).await.unwrap();

    let mut anna_cart: Vec<_> = list_cart_recipes(anna.id, store)
        .await
        .unwrap()
        .into_iter()
        .map(|recipe| recipe.id)
        .collect();
    anna_cart.sort();
    assert_eq!(anna_cart, vec![pancakes.id, omelette.id]);
    assert_eq!(list_cart_recipes(bert.id, store).await.unwrap().len(), 1);
}
