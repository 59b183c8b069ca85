//! Category catalog reads plus the internal get-or-create used by the
//! transfer engine for its system categories.

use sea_orm::{DatabaseTransaction, Order, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{Category, Direction, LedgerError, LedgerResult, categories};

use super::Ledger;

/// Sort rank for categories created on demand rather than seeded; keeps
/// them after the curated catalog in any ordered listing.
const SYSTEM_SORT_ORDER: i32 = 1000;

impl Ledger {
    /// Lists active categories, optionally restricted to one direction,
    /// ordered by sort rank then name.
    pub async fn list_categories(
        &self,
        direction: Option<Direction>,
    ) -> LedgerResult<Vec<Category>> {
        let mut query = categories::Entity::find()
            .filter(categories::Column::IsActive.eq(true));
        if let Some(direction) = direction {
            query = query.filter(categories::Column::Direction.eq(direction.as_str()));
        }
        let models = query
            .order_by(categories::Column::SortOrder, Order::Asc)
            .order_by(categories::Column::Name, Order::Asc)
            .all(&self.database)
            .await?;
        models.into_iter().map(Category::try_from).collect()
    }

    /// Exact-name lookup; names are unique across the catalog.
    pub async fn category_by_name(&self, name: &str) -> LedgerResult<Category> {
        let model = categories::Entity::find()
            .filter(categories::Column::Name.eq(name))
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("category {name}")))?;
        Ok(Category::try_from(model)?)
    }

    pub(super) async fn require_category(
        db_tx: &DatabaseTransaction,
        category_id: Uuid,
    ) -> LedgerResult<Category> {
        let model = categories::Entity::find_by_id(category_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("category {category_id}")))?;
        Ok(Category::try_from(model)?)
    }

    /// Finds a system category by name, creating it on first use.
    ///
    /// A creation race against the unique name index resolves by
    /// re-selecting the winner's row.
    pub(super) async fn get_or_create_system_category(
        db_tx: &DatabaseTransaction,
        name: &str,
        direction: Direction,
        color_hex: &str,
    ) -> LedgerResult<Category> {
        if let Some(model) = Self::find_category_by_name(db_tx, name).await? {
            return Ok(Category::try_from(model)?);
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            direction,
            color_hex: Some(color_hex.to_string()),
            is_active: true,
            sort_order: SYSTEM_SORT_ORDER,
        };
        match categories::ActiveModel::from(&category).insert(db_tx).await {
            Ok(_) => Ok(category),
            Err(insert_err) => match Self::find_category_by_name(db_tx, name).await? {
                Some(model) => Ok(Category::try_from(model)?),
                None => Err(insert_err.into()),
            },
        }
    }

    async fn find_category_by_name(
        db_tx: &DatabaseTransaction,
        name: &str,
    ) -> LedgerResult<Option<categories::Model>> {
        Ok(categories::Entity::find()
            .filter(categories::Column::Name.eq(name))
            .one(db_tx)
            .await?)
    }
}
