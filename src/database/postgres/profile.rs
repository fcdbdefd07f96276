use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::database::models::{NewProfile, Profile, ProfileChanges};
use crate::database::store::{ProfileStore, StoreResult};

const PROFILE_SELECT: &str = r#"
    SELECT
        p.id, p.user_id, p.username, p.name, p.bio, p.avatar, u.public,
        (SELECT COUNT(*) FROM followers f WHERE f.following_id = p.user_id) AS followers,
        (SELECT COUNT(*) FROM followers f WHERE f.follower_id = p.user_id) AS following
    FROM profiles p
    JOIN users u ON u.id = p.user_id
    WHERE p.user_id = $1
"#;

#[async_trait]
impl ProfileStore for PgStore {
    async fn get_profile_by_user_id(&self, user_id: Uuid) -> StoreResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(PROFILE_SELECT)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn create_profile(&self, profile: NewProfile) -> StoreResult<Profile> {
        sqlx::query("INSERT INTO profiles (id, user_id, username, name) VALUES ($1, $2, $3, $4)")
            .bind(Uuid::new_v4())
            .bind(profile.user_id)
            .bind(&profile.username)
            .bind(&profile.name)
            .execute(&self.pool)
            .await?;

        let created = sqlx::query_as::<_, Profile>(PROFILE_SELECT)
            .bind(profile.user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> StoreResult<Option<Profile>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE profiles SET
                username = COALESCE($2, username),
                name = COALESCE($3, name),
                bio = COALESCE($4, bio)
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(changes.username.as_deref())
        .bind(changes.name.as_deref())
        .bind(changes.bio.as_deref())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        if let Some(public) = changes.public {
            sqlx::query("UPDATE users SET public = $2 WHERE id = $1")
                .bind(user_id)
                .bind(public)
                .execute(&mut *tx)
                .await?;
        }

        let profile = sqlx::query_as::<_, Profile>(PROFILE_SELECT)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(profile)
    }

    async fn update_avatar(&self, user_id: Uuid, avatar: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE profiles SET avatar = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(avatar)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
