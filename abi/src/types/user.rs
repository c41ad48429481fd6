use sqlx::postgres::PgRow;
use sqlx::{Error, FromRow, Row};

use crate::model::UserInfo;

impl FromRow<'_, PgRow> for UserInfo {
    fn from_row(row: &'_ PgRow) -> Result<Self, Error> {
        Ok(UserInfo {
            stu_id: row.try_get("stu_id")?,
            name: row.try_get("name")?,
            sex: row.try_get("sex")?,
            birthday: row.try_get("birthday")?,
            college: row.try_get("college")?,
            grade: row.try_get("grade")?,
            major: row.try_get("major")?,
        })
    }
}
