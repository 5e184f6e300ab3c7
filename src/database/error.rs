use thiserror::Error;

use super::schema::Uuid;

/// Database constraint a failed statement ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    ForeignKey,
    Unique,
    Check,
}

/// Failure of the persistence layer itself. Never retried.
#[derive(Error, Debug)]
#[error("{info}")]
pub struct QueryError {
    info: String,
    violation: Option<Violation>,
}

impl QueryError {
    pub fn new(info: String) -> Self {
        Self {
            info,
            violation: None,
        }
    }

    pub fn violated(violation: Violation, info: String) -> Self {
        Self {
            info,
            violation: Some(violation),
        }
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn violation(&self) -> Option<Violation> {
        self.violation
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        self.violation == Some(Violation::ForeignKey)
    }

    pub fn is_unique_violation(&self) -> bool {
        self.violation == Some(Violation::Unique)
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Database(e) if e.is_foreign_key_violation() => {
                Self::violated(Violation::ForeignKey, e.to_string())
            }
            sqlx::Error::Database(e) if e.is_unique_violation() => {
                Self::violated(Violation::Unique, e.to_string())
            }
            sqlx::Error::Database(e) if e.is_check_violation() => {
                Self::violated(Violation::Check, e.to_string())
            }
            sqlx::Error::RowNotFound => Self::new("Row not found".to_owned()),
            e => Self::new(e.to_string()),
        }
    }
}

/// Outcome of a Relationship Store mutation that did not apply.
#[derive(Error, Debug)]
pub enum RelationError {
    #[error("An actor cannot target itself")]
    SelfReference,

    #[error("Relation already exists")]
    Duplicate,

    #[error("Relation not found")]
    NotFound,

    #[error(transparent)]
    Query(#[from] QueryError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field {field} is longer than {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("Invalid amount {amount} for ingredient {ingredient}")]
    InvalidAmount { ingredient: Uuid, amount: i32 },

    #[error("Invalid cooking time: {0}")]
    InvalidCookingTime(i32),

    #[error("A recipe needs at least one ingredient")]
    NoIngredients,

    #[error("A recipe needs at least one tag")]
    NoTags,

    #[error("Ingredient {0} is listed more than once")]
    DuplicateIngredient(Uuid),

    #[error("Tag {0} is listed more than once")]
    DuplicateTag(Uuid),

    #[error("Ingredient {0} doesn't exist")]
    UnknownIngredient(Uuid),

    #[error("Tag {0} doesn't exist")]
    UnknownTag(Uuid),

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Invalid username")]
    InvalidUsername,

    #[error("Invalid color, expected #RRGGBB")]
    InvalidColor,

    #[error("Invalid slug")]
    InvalidSlug,

    #[error("Malformed payload: {0}")]
    Malformed(String),
}

/// User-facing reason a request was turned down.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("You cannot follow yourself")]
    CannotFollowSelf,

    #[error("You are already following this user")]
    AlreadyFollowing,

    #[error("You are not following this user")]
    NotFollowing,

    #[error("User not found")]
    UserNotFound,

    #[error("Recipe not found")]
    RecipeNotFound,

    #[error("Recipe is already present")]
    AlreadyPresent,

    #[error("Recipe is not present")]
    NotPresent,

    #[error("You don't have permission to perform this action")]
    Forbidden,

    #[error("{0} already exists")]
    AlreadyExists(&'static str),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl Rejection {
    pub fn code(&self) -> u16 {
        match self {
            Rejection::UserNotFound | Rejection::RecipeNotFound => 404,
            Rejection::Forbidden => 403,
            _ => 400,
        }
    }
}

#[derive(Error, Debug)]
pub enum GateError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Storage(#[from] QueryError),
}

impl GateError {
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            GateError::Rejected(rejection) => Some(rejection),
            GateError::Storage(_) => None,
        }
    }
}

impl From<ValidationError> for GateError {
    fn from(value: ValidationError) -> Self {
        GateError::Rejected(Rejection::Invalid(value))
    }
}
