#![allow(dead_code)]

use std::sync::Arc;

use foodgram_sdk::{
    create_ingredient, create_recipe, create_tag,
    form::{IngredientAmount, NewIngredient, NewTag, NewUser, RecipeForm},
    register_user,
    schema::{Ingredient, Recipe, Tag, User, UserRole},
    Actor, Gatekeeper, MemoryStore,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn new_user(name: &str) -> NewUser {
    NewUser {
        email: format!("{name}@example.com"),
        username: name.to_owned(),
        first_name: name.to_owned(),
        last_name: "Cook".to_owned(),
    }
}

pub struct Kitchen {
    pub store: Arc<MemoryStore>,
    pub admin: Actor,
    pub tag: Tag,
    pub flour: Ingredient,
    pub egg: Ingredient,
    pub salt: Ingredient,
    pub sugar_g: Ingredient,
    pub sugar_cup: Ingredient,
}

impl Kitchen {
    pub async fn new() -> Self {
        init_logging();
        let store = Arc::new(MemoryStore::new());

        let admin = register_user(new_user("admin"), &*store).await.unwrap();
        assert!(store.set_role(admin.id, UserRole::Admin).await);
        let admin = Actor::new(admin.id, UserRole::Admin);

        let tag = create_tag(
            &admin,
            NewTag {
                name: "Breakfast".to_owned(),
                color: "#E26C2D".to_owned(),
                slug: "breakfast".to_owned(),
            },
            &*store,
        )
        .await
        .unwrap();

        let ingredient = |name: &str, unit: &str| NewIngredient {
            name: name.to_owned(),
            measurement_unit: unit.to_owned(),
        };
        let flour = create_ingredient(&admin, ingredient("flour", "g"), &*store)
            .await
            .unwrap();
        let egg = create_ingredient(&admin, ingredient("egg", "pcs"), &*store)
            .await
            .unwrap();
        let salt = create_ingredient(&admin, ingredient("salt", "tsp"), &*store)
            .await
            .unwrap();
        let sugar_g = create_ingredient(&admin, ingredient("sugar", "g"), &*store)
            .await
            .unwrap();
        let sugar_cup = create_ingredient(&admin, ingredient("sugar", "cup"), &*store)
            .await
            .unwrap();

        Self {
            store,
            admin,
            tag,
            flour,
            egg,
            salt,
            sugar_g,
            sugar_cup,
        }
    }

    pub fn gatekeeper(&self) -> Gatekeeper<MemoryStore> {
        Gatekeeper::new(Arc::clone(&self.store))
    }

    pub async fn user(&self, name: &str) -> User {
        register_user(new_user(name), &*self.store).await.unwrap()
    }

    pub fn form(&self, name: &str, parts: &[(&Ingredient, i32)]) -> RecipeForm {
        RecipeForm {
            name: name.to_owned(),
            text: format!("How to make {name}."),
            image: format!("recipes/{name}.png"),
            cooking_time: 30,
            tags: vec![self.tag.id],
            ingredients: parts
                .iter()
                .map(|(ingredient, amount)| IngredientAmount {
                    id: ingredient.id,
                    amount: *amount,
                })
                .collect(),
        }
    }

    pub async fn recipe(&self, author: &User, name: &str, parts: &[(&Ingredient, i32)]) -> Recipe {
        create_recipe(&Actor::from(author), self.form(name, parts), &*self.store)
            .await
            .unwrap()
    }
}
