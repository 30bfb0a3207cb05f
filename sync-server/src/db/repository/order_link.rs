//! OrderLink Repository
//!
//! Persistent mapping between external (marketplace) order IDs and local
//! order IDs. `external_order_id` is the primary key; every mutation
//! relies on that constraint for its uniqueness guarantee.

use super::{RepoError, RepoResult, is_unique_violation};
use crate::db::models::OrderLink;
use sqlx::SqliteConnection;

pub struct OrderLinkRepository;

impl OrderLinkRepository {
    /// Look up a link by its external order ID
    pub async fn find_by_external_id(
        conn: &mut SqliteConnection,
        external_id: &str,
    ) -> RepoResult<Option<OrderLink>> {
        let link = sqlx::query_as::<_, OrderLink>(
            "SELECT external_order_id, local_order_id FROM order_link WHERE external_order_id = ?",
        )
        .bind(external_id)
        .fetch_optional(conn)
        .await?;
        Ok(link)
    }

    /// Create a link; fails with [`RepoError::Duplicate`] when the
    /// external ID is already taken.
    pub async fn create(
        conn: &mut SqliteConnection,
        external_id: &str,
        local_id: i64,
    ) -> RepoResult<OrderLink> {
        let result = sqlx::query(
            "INSERT INTO order_link (external_order_id, local_order_id) VALUES (?, ?)",
        )
        .bind(external_id)
        .bind(local_id)
        .execute(conn)
        .await;

        match result {
            Ok(_) => Ok(OrderLink {
                external_order_id: external_id.to_string(),
                local_order_id: local_id,
            }),
            Err(e) if is_unique_violation(&e) => {
                Err(RepoError::Duplicate(external_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Re-key a link to a new external ID.
    ///
    /// Single conditional UPDATE: two concurrent rebinds to the same new
    /// ID cannot both succeed, the second hits the primary key.
    pub async fn rebind_external_id(
        conn: &mut SqliteConnection,
        old_id: &str,
        new_id: &str,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE order_link SET external_order_id = ? WHERE external_order_id = ?",
        )
        .bind(new_id)
        .bind(old_id)
        .execute(conn)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                Err(RepoError::NotFound(format!("order link {}", old_id)))
            }
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(RepoError::Duplicate(new_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the link of a destroyed local order. Best effort: absence
    /// is not an error.
    pub async fn delete_by_local_id(conn: &mut SqliteConnection, local_id: i64) -> RepoResult<()> {
        sqlx::query("DELETE FROM order_link WHERE local_order_id = ?")
            .bind(local_id)
            .execute(conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = test_support::pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let link = OrderLinkRepository::create(&mut conn, "ext-1", 42)
            .await
            .unwrap();
        assert_eq!(link.local_order_id, 42);

        let found = OrderLinkRepository::find_by_external_id(&mut conn, "ext-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, link);

        assert!(
            OrderLinkRepository::find_by_external_id(&mut conn, "ext-2")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_create_duplicate_external_id_rejected() {
        let pool = test_support::pool().await;
        let mut conn = pool.acquire().await.unwrap();

        OrderLinkRepository::create(&mut conn, "ext-1", 1)
            .await
            .unwrap();
        let result = OrderLinkRepository::create(&mut conn, "ext-1", 2).await;
        assert!(matches!(result, Err(RepoError::Duplicate(_))));

        // original row untouched
        let found = OrderLinkRepository::find_by_external_id(&mut conn, "ext-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.local_order_id, 1);
    }

    #[tokio::test]
    async fn test_rebind_external_id() {
        let pool = test_support::pool().await;
        let mut conn = pool.acquire().await.unwrap();

        OrderLinkRepository::create(&mut conn, "ext-1", 1)
            .await
            .unwrap();
        OrderLinkRepository::rebind_external_id(&mut conn, "ext-1", "ext-9")
            .await
            .unwrap();

        assert!(
            OrderLinkRepository::find_by_external_id(&mut conn, "ext-1")
                .await
                .unwrap()
                .is_none()
        );
        let found = OrderLinkRepository::find_by_external_id(&mut conn, "ext-9")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.local_order_id, 1);
    }

    #[tokio::test]
    async fn test_rebind_to_taken_id_rejected() {
        let pool = test_support::pool().await;
        let mut conn = pool.acquire().await.unwrap();

        OrderLinkRepository::create(&mut conn, "ext-1", 1)
            .await
            .unwrap();
        OrderLinkRepository::create(&mut conn, "ext-2", 2)
            .await
            .unwrap();

        let result =
            OrderLinkRepository::rebind_external_id(&mut conn, "ext-1", "ext-2").await;
        assert!(matches!(result, Err(RepoError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_rebind_missing_link() {
        let pool = test_support::pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let result =
            OrderLinkRepository::rebind_external_id(&mut conn, "nope", "ext-2").await;
        assert!(matches!(result, Err(RepoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_by_local_id_is_best_effort() {
        let pool = test_support::pool().await;
        let mut conn = pool.acquire().await.unwrap();

        OrderLinkRepository::create(&mut conn, "ext-1", 1)
            .await
            .unwrap();
        OrderLinkRepository::delete_by_local_id(&mut conn, 1)
            .await
            .unwrap();
        assert!(
            OrderLinkRepository::find_by_external_id(&mut conn, "ext-1")
                .await
                .unwrap()
                .is_none()
        );

        // deleting again is a no-op, not an error
        OrderLinkRepository::delete_by_local_id(&mut conn, 1)
            .await
            .unwrap();
    }
}
