use std::collections::{hash_map, HashMap};

use serde::Serialize;

use crate::{
    error::QueryError,
    schema::{RecipePart, Uuid},
    store::RelationStore,
};

/// Identity of a purchasable item. Two ingredients sharing a name but not a
/// unit are different items.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IngredientKey {
    pub name: String,
    pub measurement_unit: String,
}

impl IngredientKey {
    pub fn new(name: impl Into<String>, measurement_unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            measurement_unit: measurement_unit.into(),
        }
    }
}

impl From<&RecipePart> for IngredientKey {
    fn from(part: &RecipePart) -> Self {
        Self::new(part.name.to_owned(), part.measurement_unit.to_owned())
    }
}

/// Total quantity per (name, unit) across a set of recipes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShoppingList {
    totals: HashMap<IngredientKey, i64>,
}

impl ShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: IngredientKey, amount: i64) {
        *self.totals.entry(key).or_insert(0) += amount;
    }

    pub fn add_part(&mut self, part: &RecipePart) {
        self.add(IngredientKey::from(part), part.amount.into());
    }

    pub fn get(&self, name: &str, measurement_unit: &str) -> Option<i64> {
        self.totals
            .get(&IngredientKey::new(name, measurement_unit))
            .copied()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Iteration order is unspecified.
    pub fn iter(&self) -> hash_map::Iter<'_, IngredientKey, i64> {
        self.totals.iter()
    }

    pub fn into_map(self) -> HashMap<IngredientKey, i64> {
        self.totals
    }
}

impl<'a> FromIterator<&'a RecipePart> for ShoppingList {
    fn from_iter<T: IntoIterator<Item = &'a RecipePart>>(iter: T) -> Self {
        let mut list = ShoppingList::new();
        iter.into_iter().for_each(|part| list.add_part(part));
        list
    }
}

/// Folds the parts of several recipes into one list.
pub fn aggregate<'a, I, P>(recipes: I) -> ShoppingList
where
    I: IntoIterator<Item = P>,
    P: IntoIterator<Item = &'a RecipePart>,
{
    let mut list = ShoppingList::new();
    for parts in recipes {
        parts.into_iter().for_each(|part| list.add_part(part));
    }
    list
}

/// Aggregates every recipe currently in the user's cart. The read is a
/// best-effort snapshot and is not isolated from concurrent cart changes.
pub async fn aggregate_cart<S: RelationStore>(
    user_id: Uuid,
    store: &S,
) -> Result<ShoppingList, QueryError> {
    let recipes = store.list_cart_recipes(user_id).await?;

    let mut list = ShoppingList::new();
    for recipe in recipes.iter() {
        let parts = store.list_recipe_parts(recipe.id).await?;
        parts.iter().for_each(|part| list.add_part(part));
    }

    log::debug!(
        "Aggregated {} recipes into {} items for user {user_id}",
        recipes.len(),
        list.len()
    );
    Ok(list)
}
