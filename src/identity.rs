//! Device-scoped identity resolution.
//!
//! Each physical device presents an opaque device id; the resolver mints a
//! stable user id for it exactly once and keeps the mutable profile (name,
//! photo) behind it. Core operations receive the resolved `User` as an
//! explicit value, never through a hidden global.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::types::User;

#[derive(Default)]
pub struct IdentityResolver {
    /// Keyed by device id; the user id inside is what the rest of the
    /// system refers to.
    users: RwLock<HashMap<String, User>>,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a device to its user record, creating it on first contact.
    /// Subsequent calls update the profile in place; the id never changes.
    pub async fn resolve(
        &self,
        device_id: &str,
        name: &str,
        profile_photo_url: Option<String>,
    ) -> User {
        let mut users = self.users.write().await;
        let now = chrono::Utc::now().to_rfc3339();

        if let Some(user) = users.get_mut(device_id) {
            user.name = name.trim().to_string();
            if profile_photo_url.is_some() {
                user.profile_photo_url = profile_photo_url;
            }
            user.updated_at = now;
            return user.clone();
        }

        let user = User {
            id: ulid::Ulid::new().to_string(),
            name: name.trim().to_string(),
            profile_photo_url,
            created_at: now.clone(),
            updated_at: now,
        };
        users.insert(device_id.to_string(), user.clone());
        tracing::info!(user_id = %user.id, "minted user for new device");
        user
    }

    pub async fn get(&self, user_id: &str) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.id == user_id)
            .cloned()
    }

    pub async fn update_name(&self, user_id: &str, name: &str) -> Option<User> {
        let mut users = self.users.write().await;
        let user = users.values_mut().find(|u| u.id == user_id)?;
        user.name = name.trim().to_string();
        user.updated_at = chrono::Utc::now().to_rfc3339();
        Some(user.clone())
    }

    pub async fn set_photo(&self, user_id: &str, url: String) -> Option<User> {
        let mut users = self.users.write().await;
        let user = users.values_mut().find(|u| u.id == user_id)?;
        user.profile_photo_url = Some(url);
        user.updated_at = chrono::Utc::now().to_rfc3339();
        Some(user.clone())
    }

    pub async fn clear_photo(&self, user_id: &str) -> Option<User> {
        let mut users = self.users.write().await;
        let user = users.values_mut().find(|u| u.id == user_id)?;
        user.profile_photo_url = None;
        user.updated_at = chrono::Utc::now().to_rfc3339();
        Some(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_device_resolves_to_same_user_id() {
        let resolver = IdentityResolver::new();
        let first = resolver.resolve("device-1", "Alice", None).await;
        let second = resolver.resolve("device-1", "Alice", None).await;
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn different_devices_get_different_users() {
        let resolver = IdentityResolver::new();
        let a = resolver.resolve("device-1", "Alice", None).await;
        let b = resolver.resolve("device-2", "Bob", None).await;
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn resolve_updates_profile_in_place() {
        let resolver = IdentityResolver::new();
        let user = resolver.resolve("device-1", "Alice", None).await;
        let renamed = resolver
            .resolve("device-1", "  Alicia ", Some("https://cdn/p.jpg".to_string()))
            .await;

        assert_eq!(renamed.id, user.id);
        assert_eq!(renamed.name, "Alicia");
        assert_eq!(renamed.profile_photo_url.as_deref(), Some("https://cdn/p.jpg"));
    }

    #[tokio::test]
    async fn clear_photo_removes_url() {
        let resolver = IdentityResolver::new();
        let user = resolver
            .resolve("device-1", "Alice", Some("https://cdn/p.jpg".to_string()))
            .await;

        let cleared = resolver.clear_photo(&user.id).await.unwrap();
        assert!(cleared.profile_photo_url.is_none());
    }
}
