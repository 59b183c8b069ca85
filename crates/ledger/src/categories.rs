//! Category catalog: static income/expense classification for entries.
//!
//! Seeded by migration and edited only administratively; the ledger reads it
//! to validate the category/direction invariant and get-or-creates a few
//! reserved system rows (transfer pair, top-up, fallback expense) on demand.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Direction, LedgerError};

/// Reserved expense category for the source half of a transfer.
pub const TRANSFER_OUT_NAME: &str = "Transfer Out";
/// Reserved income category for the destination half of a transfer.
pub const TRANSFER_IN_NAME: &str = "Transfer In";
/// Default category for `top_up` when the caller supplies none.
pub const TOP_UP_NAME: &str = "Top Up";
/// Default category for `set_expense` when the caller supplies none.
pub const OTHER_EXPENSES_NAME: &str = "Other Expenses";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub direction: Direction,
    pub color_hex: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub direction: String,
    pub color_hex: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(category: &Category) -> Self {
        Self {
            id: ActiveValue::Set(category.id),
            name: ActiveValue::Set(category.name.clone()),
            direction: ActiveValue::Set(category.direction.as_str().to_string()),
            color_hex: ActiveValue::Set(category.color_hex.clone()),
            is_active: ActiveValue::Set(category.is_active),
            sort_order: ActiveValue::Set(category.sort_order),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            direction: Direction::try_from(model.direction.as_str())?,
            color_hex: model.color_hex,
            is_active: model.is_active,
            sort_order: model.sort_order,
        })
    }
}
