use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use super::{Cookie, CookieError, CookieStore};

type CookieKey = (Option<String>, String);

/// In-memory cookie storage using HashMap with RwLock for thread-safe access.
///
/// This is the jar behind every HTTP identity in the crate. Cloning shares the underlying map.
#[derive(Clone)]
pub struct InMemoryCookieStore {
    cookies: Arc<RwLock<HashMap<CookieKey, Cookie>>>,
}

impl InMemoryCookieStore {
    /// Creates a new empty in-memory cookie store.
    pub fn new() -> Self {
        Self {
            cookies: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryCookieStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CookieStore for InMemoryCookieStore {
    async fn get_cookie(&self, name: &str) -> Result<Option<Cookie>, CookieError> {
        let cookies = self.cookies.read().await;
        Ok(cookies
            .values()
            .find(|c| c.name == name && !c.is_expired())
            .cloned())
    }

    async fn set_cookie(&self, cookie: Cookie) -> Result<(), CookieError> {
        cookie.validate_security_attributes()?;

        let key = (cookie.domain.clone(), cookie.name.clone());
        let mut cookies = self.cookies.write().await;
        if cookie.is_expired() {
            cookies.remove(&key);
        } else {
            cookies.insert(key, cookie);
        }
        Ok(())
    }

    async fn remove_cookie(&self, name: &str) -> Result<(), CookieError> {
        let mut cookies = self.cookies.write().await;
        cookies.retain(|(_, n), _| n != name);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CookieError> {
        let mut cookies = self.cookies.write().await;
        cookies.clear();
        Ok(())
    }

    async fn list_cookies(&self) -> Result<Vec<Cookie>, CookieError> {
        let cookies = self.cookies.read().await;
        Ok(cookies.values().filter(|c| !c.is_expired()).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;

    #[tokio::test]
    async fn test_set_and_get_cookie() {
        let store = InMemoryCookieStore::new();
        store
            .set_cookie(Cookie::new("session", "token123"))
            .await
            .unwrap();

        let retrieved = store.get_cookie("session").await.unwrap().unwrap();
        assert_eq!(retrieved.value, "token123");
    }

    #[tokio::test]
    async fn test_same_name_kept_per_domain() {
        let store = InMemoryCookieStore::new();
        let mut broker = Cookie::new("lang", "ru");
        broker.domain = Some("gosuslugi.ru".to_string());
        let portal = Cookie::new("lang", "en");

        store.set_cookie(broker).await.unwrap();
        store.set_cookie(portal).await.unwrap();

        assert_eq!(store.list_cookies().await.unwrap().len(), 2);

        let for_broker = store.cookies_for_host("esia.gosuslugi.ru").await.unwrap();
        assert_eq!(for_broker.len(), 2);
        let for_portal = store.cookies_for_host("sgo.example.ru").await.unwrap();
        assert_eq!(for_portal.len(), 1);
        assert_eq!(for_portal[0].value, "en");
    }

    #[tokio::test]
    async fn test_expired_cookie_deletes_entry() {
        let store = InMemoryCookieStore::new();
        store.set_cookie(Cookie::new("at", "1")).await.unwrap();

        let mut expired = Cookie::new("at", "");
        expired.expires = Some(SystemTime::now() - Duration::from_secs(1));
        store.set_cookie(expired).await.unwrap();

        assert!(store.get_cookie("at").await.unwrap().is_none());
        assert!(store.list_cookies().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let store = InMemoryCookieStore::new();
        store.set_cookie(Cookie::new("a", "1")).await.unwrap();
        store.set_cookie(Cookie::new("b", "2")).await.unwrap();

        store.remove_cookie("a").await.unwrap();
        store.remove_cookie("missing").await.unwrap();
        assert_eq!(store.list_cookies().await.unwrap().len(), 1);

        store.clear().await.unwrap();
        assert!(store.list_cookies().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clone_shares_storage() {
        let store = InMemoryCookieStore::new();
        let other = store.clone();
        other.set_cookie(Cookie::new("x", "y")).await.unwrap();
        assert!(store.get_cookie("x").await.unwrap().is_some());
    }
}
