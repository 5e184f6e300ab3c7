use async_trait::async_trait;
use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use super::{
    error::QueryError,
    form::{NewIngredient, NewTag, NewUser, ValidRecipe},
    relation::RelationKind,
    schema::{Ingredient, Recipe, RecipePart, Tag, User, Uuid},
    store::{CatalogStore, RecipeFilter, RelationStore},
};

/// PostgreSQL backed store. Uniqueness and self-reference rules are enforced
/// by the schema in `migrations/`.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), QueryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| QueryError::new(format!("{e}")))?;

        Ok(())
    }
}

#[async_trait]
impl RelationStore for PgStore {
    async fn insert_edge<R: RelationKind>(
        &self,
        actor: Uuid,
        target: Uuid,
    ) -> Result<bool, QueryError> {
        let result = sqlx::query(&format!(
            "INSERT INTO {} ({}, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            R::TABLE,
            R::ACTOR_COLUMN,
            R::TARGET_COLUMN
        ))
        .bind(actor)
        .bind(target)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_edge<R: RelationKind>(
        &self,
        actor: Uuid,
        target: Uuid,
    ) -> Result<bool, QueryError> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE {} = $1 AND {} = $2",
            R::TABLE,
            R::ACTOR_COLUMN,
            R::TARGET_COLUMN
        ))
        .bind(actor)
        .bind(target)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn edge_exists<R: RelationKind>(
        &self,
        actor: Uuid,
        target: Uuid,
    ) -> Result<bool, QueryError> {
        let row: (bool,) = sqlx::query_as(&format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE {} = $1 AND {} = $2)",
            R::TABLE,
            R::ACTOR_COLUMN,
            R::TARGET_COLUMN
        ))
        .bind(actor)
        .bind(target)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, QueryError> {
        let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn get_recipe(&self, id: Uuid) -> Result<Option<Recipe>, QueryError> {
        let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn list_cart_recipes(&self, user_id: Uuid) -> Result<Vec<Recipe>, QueryError> {
        let rows: Vec<Recipe> = sqlx::query_as(
            "
            SELECT r.*
            FROM shopping_cart c
            INNER JOIN recipes r ON r.id = c.recipe_id
            WHERE c.user_id = $1
            ORDER BY c.id
        ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_recipe_parts(&self, recipe_id: Uuid) -> Result<Vec<RecipePart>, QueryError> {
        let rows: Vec<RecipePart> = sqlx::query_as("
            SELECT ri.recipe_id AS recipe_id, i.id AS ingredient_id, i.name AS name, i.measurement_unit AS measurement_unit, ri.amount AS amount
            FROM recipe_ingredients ri
            INNER JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
        ")
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_followed(&self, user_id: Uuid) -> Result<Vec<User>, QueryError> {
        let rows: Vec<User> = sqlx::query_as(
            "
            SELECT u.*
            FROM follows f
            INNER JOIN users u ON u.id = f.following_id
            WHERE f.user_id = $1
            ORDER BY f.id
        ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_author_recipes(
        &self,
        author_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Recipe>, QueryError> {
        // LIMIT NULL is LIMIT ALL
        let rows: Vec<Recipe> =
            sqlx::query_as("SELECT * FROM recipes WHERE author_id = $1 ORDER BY id DESC LIMIT $2")
                .bind(author_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows)
    }

    async fn count_author_recipes(&self, author_id: Uuid) -> Result<i64, QueryError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.0)
    }

    async fn list_recipes(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>, QueryError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT r.* FROM recipes r WHERE TRUE");

        if let Some(author) = filter.author {
            query.push(" AND r.author_id = ").push_bind(author);
        }
        if !filter.tags.is_empty() {
            query
                .push(
                    " AND EXISTS (SELECT 1 FROM recipe_tags rt INNER JOIN tags t ON t.id = rt.tag_id WHERE rt.recipe_id = r.id AND t.slug = ANY(",
                )
                .push_bind(filter.tags.clone())
                .push("))");
        }
        if let Some((user, wanted)) = filter.favorited {
            query
                .push(if wanted { " AND EXISTS" } else { " AND NOT EXISTS" })
                .push(" (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
                .push_bind(user)
                .push(")");
        }
        if let Some((user, wanted)) = filter.in_cart {
            query
                .push(if wanted { " AND EXISTS" } else { " AND NOT EXISTS" })
                .push(" (SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = ")
                .push_bind(user)
                .push(")");
        }
        query.push(" ORDER BY r.id DESC");

        let rows: Vec<Recipe> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn create_user(&self, user: &NewUser) -> Result<Option<User>, QueryError> {
        let row: Option<User> = sqlx::query_as(
            "
            INSERT INTO users (email, username, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING RETURNING *;
        ",
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create_ingredient(
        &self,
        ingredient: &NewIngredient,
    ) -> Result<Option<Ingredient>, QueryError> {
        let row: Option<Ingredient> = sqlx::query_as(
            "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2) ON CONFLICT DO NOTHING RETURNING *",
        )
        .bind(&ingredient.name)
        .bind(&ingredient.measurement_unit)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_ingredient(&self, id: Uuid) -> Result<Option<Ingredient>, QueryError> {
        let row: Option<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn create_tag(&self, tag: &NewTag) -> Result<Option<Tag>, QueryError> {
        let row: Option<Tag> = sqlx::query_as(
            "INSERT INTO tags (name, color, slug) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING RETURNING *",
        )
        .bind(&tag.name)
        .bind(&tag.color)
        .bind(&tag.slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn search_ingredients(&self, prefix: &str) -> Result<Vec<Ingredient>, QueryError> {
        let rows: Vec<Ingredient> = sqlx::query_as(
            "SELECT * FROM ingredients WHERE name ILIKE $1 ESCAPE '\\' ORDER BY name, measurement_unit",
        )
        .bind(format!("{}%", escape_like(prefix)))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get_tag(&self, id: Uuid) -> Result<Option<Tag>, QueryError> {
        let row: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn create_recipe(
        &self,
        author_id: Uuid,
        recipe: &ValidRecipe,
    ) -> Result<Option<Recipe>, QueryError> {
        let mut tr = self
            .pool
            .begin()
            .await
            .map_err(|_| QueryError::new("Could not start transaction".to_owned()))?;

        let row: Option<Recipe> = sqlx::query_as(
            "
            INSERT INTO recipes (author_id, name, text, image, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (author_id, name) DO NOTHING RETURNING *
        ",
        )
        .bind(author_id)
        .bind(recipe.name())
        .bind(recipe.text())
        .bind(recipe.image())
        .bind(recipe.cooking_time())
        .fetch_optional(&mut *tr)
        .await?;

        // dropping the transaction rolls it back
        let Some(row) = row else {
            return Ok(None);
        };

        insert_links(&mut tr, row.id, recipe).await?;

        tr.commit()
            .await
            .map_err(|_| QueryError::new("Could not commit transaction".to_owned()))?;

        Ok(Some(row))
    }

    async fn update_recipe(
        &self,
        id: Uuid,
        recipe: &ValidRecipe,
    ) -> Result<Option<Recipe>, QueryError> {
        let mut tr = self
            .pool
            .begin()
            .await
            .map_err(|_| QueryError::new("Could not start transaction".to_owned()))?;

        let row: Option<Recipe> = sqlx::query_as(
            "
            UPDATE recipes
            SET name = $2, text = $3, image = $4, cooking_time = $5
            WHERE id = $1
            RETURNING *
        ",
        )
        .bind(id)
        .bind(recipe.name())
        .bind(recipe.text())
        .bind(recipe.image())
        .bind(recipe.cooking_time())
        .fetch_optional(&mut *tr)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tr)
            .await?;
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tr)
            .await?;
        insert_links(&mut tr, id, recipe).await?;

        tr.commit()
            .await
            .map_err(|_| QueryError::new("Could not commit transaction".to_owned()))?;

        Ok(Some(row))
    }

    async fn delete_recipe(&self, id: Uuid) -> Result<bool, QueryError> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, QueryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn insert_links(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    recipe: &ValidRecipe,
) -> Result<(), QueryError> {
    let mut parts: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ");
    parts.push_values(recipe.ingredients(), |mut b, part| {
        b.push_bind(recipe_id).push_bind(part.id).push_bind(part.amount);
    });
    parts.build().execute(&mut *conn).await?;

    let mut tags: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");
    tags.push_values(recipe.tags(), |mut b, tag| {
        b.push_bind(recipe_id).push_bind(*tag);
    });
    tags.build().execute(&mut *conn).await?;

    Ok(())
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("sugar"), "sugar");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
