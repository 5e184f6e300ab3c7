use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use crate::constants::{
    AMOUNT_MAX, AMOUNT_MIN, COOKING_TIME_MAX, COOKING_TIME_MIN, INGREDIENT_NAME_MAX_LENGTH,
    MEASUREMENT_UNIT_MAX_LENGTH, RECIPE_NAME_MAX_LENGTH, TAG_FIELD_MAX_LENGTH,
    USER_FIELD_MAX_LENGTH,
};

use super::{error::ValidationError, schema::Uuid, store::RecipeFilter};

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IngredientAmount {
    pub id: Uuid,
    pub amount: i32,
}

/// Recipe submission as received from a caller, before validation.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RecipeForm {
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<IngredientAmount>,
}

/// A recipe submission that passed every shape check. Only `RecipeForm::validate`
/// builds one, so stores can rely on its invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRecipe {
    name: String,
    text: String,
    image: String,
    cooking_time: i32,
    tags: Vec<Uuid>,
    ingredients: Vec<IngredientAmount>,
}

impl ValidRecipe {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn cooking_time(&self) -> i32 {
        self.cooking_time
    }

    pub fn tags(&self) -> &[Uuid] {
        &self.tags
    }

    pub fn ingredients(&self) -> &[IngredientAmount] {
        &self.ingredients
    }
}

impl RecipeForm {
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        serde_json::from_value(value).map_err(|e| ValidationError::Malformed(format!("{e}")))
    }

    pub fn validate(self) -> Result<ValidRecipe, ValidationError> {
        let name = required("name", self.name, RECIPE_NAME_MAX_LENGTH)?;
        if self.text.trim().is_empty() {
            return Err(ValidationError::MissingField("text"));
        }
        if self.image.trim().is_empty() {
            return Err(ValidationError::MissingField("image"));
        }

        if !(COOKING_TIME_MIN..=COOKING_TIME_MAX).contains(&self.cooking_time) {
            return Err(ValidationError::InvalidCookingTime(self.cooking_time));
        }

        if self.ingredients.is_empty() {
            return Err(ValidationError::NoIngredients);
        }
        let mut seen = HashSet::new();
        for part in self.ingredients.iter() {
            if !(AMOUNT_MIN..=AMOUNT_MAX).contains(&part.amount) {
                return Err(ValidationError::InvalidAmount {
                    ingredient: part.id,
                    amount: part.amount,
                });
            }
            if !seen.insert(part.id) {
                return Err(ValidationError::DuplicateIngredient(part.id));
            }
        }

        if self.tags.is_empty() {
            return Err(ValidationError::NoTags);
        }
        let mut seen = HashSet::new();
        for tag in self.tags.iter() {
            if !seen.insert(*tag) {
                return Err(ValidationError::DuplicateTag(*tag));
            }
        }

        Ok(ValidRecipe {
            name,
            text: self.text,
            image: self.image,
            cooking_time: self.cooking_time,
            tags: self.tags,
            ingredients: self.ingredients,
        })
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl NewUser {
    pub fn validate(self) -> Result<Self, ValidationError> {
        let email = required("email", self.email, USER_FIELD_MAX_LENGTH)?;
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(ValidationError::InvalidEmail),
        }

        let username = required("username", self.username, USER_FIELD_MAX_LENGTH)?;
        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || ".@+-_".contains(c))
        {
            return Err(ValidationError::InvalidUsername);
        }

        Ok(Self {
            email,
            username,
            first_name: required("first_name", self.first_name, USER_FIELD_MAX_LENGTH)?,
            last_name: required("last_name", self.last_name, USER_FIELD_MAX_LENGTH)?,
        })
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
}

impl NewIngredient {
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required("name", self.name, INGREDIENT_NAME_MAX_LENGTH)?,
            measurement_unit: required(
                "measurement_unit",
                self.measurement_unit,
                MEASUREMENT_UNIT_MAX_LENGTH,
            )?,
        })
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl NewTag {
    pub fn validate(self) -> Result<Self, ValidationError> {
        let name = required("name", self.name, TAG_FIELD_MAX_LENGTH)?;

        let color = required("color", self.color, 7)?;
        let hex = color.strip_prefix('#').unwrap_or("");
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidColor);
        }

        let slug = required("slug", self.slug, TAG_FIELD_MAX_LENGTH)?;
        if !slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::InvalidSlug);
        }

        Ok(Self {
            name,
            color: color.to_uppercase(),
            slug,
        })
    }
}

/// Recipe listing parameters. The favorite and cart flags only apply to a
/// signed-in viewer.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RecipeQuery {
    pub author: Option<Uuid>,
    pub tags: Vec<String>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
}

impl RecipeQuery {
    pub fn filter(self, viewer: Option<Uuid>) -> RecipeFilter {
        RecipeFilter {
            author: self.author,
            tags: self.tags,
            favorited: viewer.zip(self.is_favorited),
            in_cart: viewer.zip(self.is_in_shopping_cart),
        }
    }
}

fn required(field: &'static str, value: String, max: usize) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    if value.chars().count() > max {
        return Err(ValidationError::FieldTooLong { field, max });
    }
    Ok(value.to_owned())
}
