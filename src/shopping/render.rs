use chrono::{DateTime, TimeZone};

use crate::constants::{SHOPPING_LIST_FILE_PREFIX, SHOPPING_LIST_HEADER};

use super::aggregate::{IngredientKey, ShoppingList};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListDocument {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShoppingListExport {
    /// The cart holds nothing to buy.
    Empty,
    Document(ShoppingListDocument),
}

impl ShoppingListExport {
    pub fn build<Tz: TimeZone>(list: &ShoppingList, username: &str, at: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        if list.is_empty() {
            return ShoppingListExport::Empty;
        }

        ShoppingListExport::Document(ShoppingListDocument {
            filename: export_filename(username, at),
            content: render(list),
        })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ShoppingListExport::Empty)
    }
}

/// One line per item, ordered by the displayed name, then unit, then stored
/// name, so that equal lists always render identically.
pub fn render_lines(list: &ShoppingList) -> Vec<String> {
    let mut rows: Vec<(String, &IngredientKey, i64)> = list
        .iter()
        .map(|(key, total)| (capitalize(&key.name), key, *total))
        .collect();
    rows.sort_by(|(a, a_key, _), (b, b_key, _)| {
        (a, &a_key.measurement_unit, &a_key.name).cmp(&(b, &b_key.measurement_unit, &b_key.name))
    });

    rows.into_iter()
        .map(|(name, key, total)| format!("{name} -- {total} {}.", key.measurement_unit))
        .collect()
}

pub fn render(list: &ShoppingList) -> String {
    let mut content = format!("{SHOPPING_LIST_HEADER}\n\n");
    for line in render_lines(list) {
        content.push_str(&line);
        content.push('\n');
    }
    content
}

/// Upper-cases the first character and lower-cases the rest.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub fn export_filename<Tz: TimeZone>(username: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{SHOPPING_LIST_FILE_PREFIX}_{}_{}.txt",
        slugify(username),
        at.format("%Y%m%d_%H%M%S")
    )
}

fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut dash = false;
    for c in value.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '_' {
            slug.push(c);
            dash = false;
        } else if (c.is_whitespace() || c == '-') && !dash && !slug.is_empty() {
            slug.push('-');
            dash = true;
        }
    }
    slug.trim_end_matches('-').to_owned()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn example() -> ShoppingList {
        let mut list = ShoppingList::new();
        list.add(IngredientKey::new("flour", "g"), 500);
        list.add(IngredientKey::new("salt", "tsp"), 1);
        list.add(IngredientKey::new("egg", "pcs"), 2);
        list
    }

    #[test]
    fn lines_are_sorted_and_capitalized() {
        assert_eq!(
            render_lines(&example()),
            vec!["Egg -- 2 pcs.", "Flour -- 500 g.", "Salt -- 1 tsp."]
        );
    }

    #[test]
    fn header_precedes_lines() {
        assert_eq!(
            render(&example()),
            "Shopping list:\n\nEgg -- 2 pcs.\nFlour -- 500 g.\nSalt -- 1 tsp.\n"
        );
    }

    #[test]
    fn rendering_ignores_insertion_order() {
        let mut reversed = ShoppingList::new();
        reversed.add(IngredientKey::new("egg", "pcs"), 2);
        reversed.add(IngredientKey::new("salt", "tsp"), 1);
        reversed.add(IngredientKey::new("flour", "g"), 500);

        assert_eq!(render(&example()), render(&reversed));
    }

    #[test]
    fn same_name_renders_once_per_unit() {
        let mut list = ShoppingList::new();
        list.add(IngredientKey::new("sugar", "g"), 100);
        list.add(IngredientKey::new("sugar", "cup"), 1);

        assert_eq!(render_lines(&list), vec!["Sugar -- 1 cup.", "Sugar -- 100 g."]);
    }

    #[test]
    fn order_follows_displayed_names() {
        let mut list = ShoppingList::new();
        list.add(IngredientKey::new("apple", "pcs"), 1);
        list.add(IngredientKey::new("Banana", "pcs"), 2);
        list.add(IngredientKey::new("cherry", "g"), 300);

        assert_eq!(
            render_lines(&list),
            vec!["Apple -- 1 pcs.", "Banana -- 2 pcs.", "Cherry -- 300 g."]
        );
    }

    #[test]
    fn names_differing_only_in_case_render_deterministically() {
        let mut forward = ShoppingList::new();
        forward.add(IngredientKey::new("Salt", "g"), 5);
        forward.add(IngredientKey::new("salt", "g"), 3);
        let mut backward = ShoppingList::new();
        backward.add(IngredientKey::new("salt", "g"), 3);
        backward.add(IngredientKey::new("Salt", "g"), 5);

        assert_eq!(render_lines(&forward), vec!["Salt -- 5 g.", "Salt -- 3 g."]);
        assert_eq!(render(&forward), render(&backward));
    }

    #[test]
    fn capitalize_lowercases_the_tail() {
        assert_eq!(capitalize("bROWN sugar"), "Brown sugar");
        assert_eq!(capitalize("яблоко"), "Яблоко");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn empty_list_exports_nothing() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 18, 5, 7).unwrap();
        assert!(ShoppingListExport::build(&ShoppingList::new(), "anna", &at).is_empty());
    }

    #[test]
    fn document_is_named_after_user_and_time() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 18, 5, 7).unwrap();
        match ShoppingListExport::build(&example(), "Anna Maria", &at) {
            ShoppingListExport::Document(document) => {
                assert_eq!(document.filename, "shopping_cart_anna-maria_20240309_180507.txt");
                assert_eq!(document.content, render(&example()));
            }
            ShoppingListExport::Empty => panic!("expected a document"),
        }
    }
}
