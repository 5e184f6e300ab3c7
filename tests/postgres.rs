mod common;

use common::new_user;
use foodgram_sdk::{
    add_cart_entry, add_follow, aggregate_cart, error::RelationError, register_user,
    store::CatalogStore, Config,
};

// Needs FOODGRAM_DATABASE_URL pointing at an empty database.
#[tokio::test]
#[ignore]
async fn postgres_enforces_relation_constraints() {
    common::init_logging();
    let store = Config::load().unwrap().connect().await.unwrap();
    store.migrate().await.unwrap();

    let anna = register_user(new_user("pg-anna"), &store).await.unwrap();
    let bert = register_user(new_user("pg-bert"), &store).await.unwrap();

    add_follow(anna.id, bert.id, &store).await.unwrap();
    assert!(matches!(
        add_follow(anna.id, bert.id, &store).await,
        Err(RelationError::Duplicate)
    ));
    assert!(matches!(
        add_follow(anna.id, anna.id, &store).await,
        Err(RelationError::SelfReference)
    ));

    assert!(aggregate_cart(anna.id, &store).await.unwrap().is_empty());
    assert!(matches!(
        add_cart_entry(anna.id, i32::MAX, &store).await,
        Err(RelationError::Query(_))
    ));

    assert!(store.delete_user(anna.id).await.unwrap());
    assert!(store.delete_user(bert.id).await.unwrap());
}
