pub const AMOUNT_MIN: i32 = 1;
pub const AMOUNT_MAX: i32 = 32_000;

pub const COOKING_TIME_MIN: i32 = 1;
pub const COOKING_TIME_MAX: i32 = 32_000;

pub const RECIPE_NAME_MAX_LENGTH: usize = 200;
pub const INGREDIENT_NAME_MAX_LENGTH: usize = 150;
pub const MEASUREMENT_UNIT_MAX_LENGTH: usize = 50;
pub const USER_FIELD_MAX_LENGTH: usize = 150;
pub const TAG_FIELD_MAX_LENGTH: usize = 200;

pub const SHOPPING_LIST_HEADER: &str = "Shopping list:";
pub const SHOPPING_LIST_FILE_PREFIX: &str = "shopping_cart";

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 3;
