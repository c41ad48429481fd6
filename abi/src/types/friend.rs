use sqlx::postgres::PgRow;
use sqlx::{Error, FromRow, Row};

use crate::model::FriendRelation;

impl FromRow<'_, PgRow> for FriendRelation {
    fn from_row(row: &'_ PgRow) -> Result<Self, Error> {
        Ok(Self {
            id: row.try_get("id")?,
            follower_id: row.try_get("follower_id")?,
            followed_id: row.try_get("followed_id")?,
            status: row.try_get("status")?,
            create_time: row.try_get("create_time")?,
        })
    }
}
