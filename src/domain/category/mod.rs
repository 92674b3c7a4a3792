pub mod commands;
pub mod entity;

use crate::domain::slug::category_slug;

use self::{commands::CreateCategory, entity::NewCategory};

impl From<CreateCategory> for NewCategory {
	fn from(cmd: CreateCategory) -> Self {
		NewCategory {
			slug: category_slug(&cmd.name),
			name: cmd.name,
			description: cmd.description,
		}
	}
}
