use crate::db;
use crate::dto::AccountWithUser;
use crate::errors::ApiError;
use crate::PGPool;

pub async fn get_accounts(pool: &PGPool) -> Result<Vec<AccountWithUser>, ApiError> {
    Ok(db::user::list_accounts(pool).await?)
}
