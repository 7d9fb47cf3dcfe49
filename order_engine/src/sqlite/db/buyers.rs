use sqlx::SqliteConnection;

use crate::db_types::BuyerId;

/// Returns `true` if a buyer (a row in `users`) with the given id exists.
pub async fn buyer_exists(buyer_id: BuyerId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let exists = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(buyer_id)
        .fetch_one(conn)
        .await?;
    Ok(exists)
}

