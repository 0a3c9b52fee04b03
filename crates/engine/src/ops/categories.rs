use sea_orm::{QueryFilter, QueryOrder, prelude::*};

use crate::{Category, EngineError, ResultEngine, TransactionKind, categories};

use super::Store;

impl Store {
    /// Every category, grouped by kind then sorted by name.
    pub(super) async fn all_categories(&self) -> ResultEngine<Vec<Category>> {
        categories::Entity::find()
            .order_by_asc(categories::Column::Kind)
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    pub(super) async fn kind_categories(
        &self,
        kind: TransactionKind,
    ) -> ResultEngine<Vec<Category>> {
        categories::Entity::find()
            .filter(categories::Column::Kind.eq(kind.as_str()))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    pub(super) async fn find_category(&self, id: i32) -> ResultEngine<Category> {
        let model = categories::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("category {id}")))?;
        Category::try_from(model)
    }
}
