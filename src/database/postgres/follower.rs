use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::database::models::Follower;
use crate::database::store::{FollowerStore, StoreResult};

#[async_trait]
impl FollowerStore for PgStore {
    async fn get_follower(&self, follower_id: Uuid, following_id: Uuid) -> StoreResult<Option<Follower>> {
        let edge = sqlx::query_as::<_, Follower>(
            "SELECT id, follower_id, following_id, created_at FROM followers \
             WHERE follower_id = $1 AND following_id = $2",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(edge)
    }

    async fn follow_user(&self, follower_id: Uuid, following_id: Uuid) -> StoreResult<Follower> {
        let edge = sqlx::query_as::<_, Follower>(
            "INSERT INTO followers (id, follower_id, following_id) VALUES ($1, $2, $3) \
             RETURNING id, follower_id, following_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(edge)
    }

    async fn unfollow_user(&self, follower_id: Uuid, following_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM followers WHERE follower_id = $1 AND following_id = $2")
            .bind(follower_id)
            .bind(following_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
