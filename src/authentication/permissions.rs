use serde::{Deserialize, Serialize};

use crate::{
    error::Rejection,
    schema::{Recipe, User, UserRole, Uuid},
};

const ACTION_TABLE: &[(UserRole, &[ActionType])] = &[
    (
        UserRole::User,
        &[
            ActionType::ManageOwnRelations,
            ActionType::CreateRecipes,
            ActionType::ManageOwnRecipes,
        ],
    ),
    (
        UserRole::Admin,
        &[
            ActionType::ManageOwnRelations,
            ActionType::CreateRecipes,
            ActionType::ManageOwnRecipes,
            ActionType::ManageAllRecipes,
            ActionType::ManageTags,
            ActionType::ManageIngredients,
        ],
    ),
];

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionType {
    ManageOwnRelations,

    CreateRecipes,
    ManageOwnRecipes,

    ManageAllRecipes,
    ManageTags,
    ManageIngredients,
}

impl ActionType {
    pub fn authenticate(self, actor: &Actor) -> bool {
        ACTION_TABLE
            .iter()
            .find_map(|(role, actions)| {
                if &actor.role != role {
                    return None;
                }

                Some(actions.contains(&self))
            })
            .unwrap_or(false)
    }
}

/// The identity a request acts on behalf of. Always passed explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn authenticate(&self, action: ActionType) -> Result<(), Rejection> {
        if !action.authenticate(self) {
            return Err(Rejection::Forbidden);
        }
        Ok(())
    }

    /// Only the author or an administrator may change a recipe.
    pub fn authenticate_recipe(&self, recipe: &Recipe) -> Result<(), Rejection> {
        self.authenticate(ActionType::ManageOwnRecipes)?;

        match self.authenticate(ActionType::ManageAllRecipes) {
            Ok(_) => Ok(()),
            Err(_) => {
                if recipe.author_id != self.user_id {
                    Err(Rejection::Forbidden)
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(author_id: Uuid) -> Recipe {
        Recipe {
            id: 1,
            author_id,
            name: "Borscht".to_owned(),
            text: "Boil.".to_owned(),
            image: "borscht.png".to_owned(),
            cooking_time: 90,
        }
    }

    #[test]
    fn users_cannot_manage_catalog() {
        let actor = Actor::new(1, UserRole::User);
        assert!(actor.authenticate(ActionType::ManageOwnRelations).is_ok());
        assert_eq!(
            actor.authenticate(ActionType::ManageTags),
            Err(Rejection::Forbidden)
        );
        assert_eq!(
            actor.authenticate(ActionType::ManageIngredients),
            Err(Rejection::Forbidden)
        );
    }

    #[test]
    fn author_may_change_own_recipe() {
        let actor = Actor::new(1, UserRole::User);
        assert!(actor.authenticate_recipe(&recipe(1)).is_ok());
        assert_eq!(
            actor.authenticate_recipe(&recipe(2)),
            Err(Rejection::Forbidden)
        );
    }

    #[test]
    fn admin_may_change_any_recipe() {
        let actor = Actor::new(5, UserRole::Admin);
        assert!(actor.is_admin());
        assert!(actor.authenticate_recipe(&recipe(2)).is_ok());
        assert!(actor.authenticate(ActionType::ManageTags).is_ok());
    }
}
