//! # Review Repository

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use rapidtech_core::{Review, ReviewStatus};

const REVIEW_COLUMNS: &str = "id, user_id, product_id, rating, comment, status, created_at";

/// Repository for review database operations.
#[derive(Debug, Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReviewRepository { pool }
    }

    /// Inserts a review on the caller's connection or transaction.
    pub async fn insert_in(conn: &mut SqliteConnection, review: &Review) -> DbResult<()> {
        debug!(review_id = %review.id, product_id = %review.product_id, "Inserting review");

        sqlx::query(
            r#"
            INSERT INTO reviews (id, user_id, product_id, rating, comment, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&review.id)
        .bind(&review.user_id)
        .bind(&review.product_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.status)
        .bind(review.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Reviews of a product, newest first.
    ///
    /// Only approved reviews unless `include_pending`.
    pub async fn list_for_product(
        &self,
        product_id: &str,
        include_pending: bool,
    ) -> DbResult<Vec<Review>> {
        let status_clause = if include_pending {
            ""
        } else {
            " AND status = 'approved'"
        };
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE product_id = ?1{status_clause} \
             ORDER BY created_at DESC, id DESC"
        );

        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(reviews)
    }

    /// Overwrites a review's status and returns the updated review.
    ///
    /// `Ok(None)` when no review has that id.
    pub async fn set_status(&self, id: &str, status: ReviewStatus) -> DbResult<Option<Review>> {
        debug!(review_id = %id, status = %status, "Setting review status");

        let sql = format!("UPDATE reviews SET status = ?2 WHERE id = ?1 RETURNING {REVIEW_COLUMNS}");
        let review = sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;

        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use rapidtech_core::review::new_review;

    #[tokio::test]
    async fn test_moderation_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.reviews();

        let review = new_review("u1", "p1", 4, "quiet fans", Utc::now()).unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        ReviewRepository::insert_in(&mut conn, &review).await.unwrap();
        drop(conn);

        assert!(repo.list_for_product("p1", false).await.unwrap().is_empty());
        assert_eq!(repo.list_for_product("p1", true).await.unwrap(), vec![review.clone()]);

        let approved = repo
            .set_status(&review.id, ReviewStatus::Approved)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(approved.status, ReviewStatus::Approved);
        assert_eq!(repo.list_for_product("p1", false).await.unwrap().len(), 1);

        assert!(repo
            .set_status("missing", ReviewStatus::Rejected)
            .await
            .unwrap()
            .is_none());
    }
}
