use crate::database::{DatabaseError, Datastore};

/// Where a page gate sends the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    Redirect(String),
    Render,
}

/// Answers ownership questions about stores for a caller
pub struct TenantResolver<'a> {
    datastore: &'a dyn Datastore,
}

impl<'a> TenantResolver<'a> {
    pub fn new(datastore: &'a dyn Datastore) -> Self {
        Self { datastore }
    }

    /// Anonymous callers go to `/` without touching the datastore; owners go
    /// to their first store; everyone else stays.
    pub async fn redirect_target(&self, caller: Option<&str>) -> Result<RedirectDecision, DatabaseError> {
        let Some(user_id) = caller else {
            return Ok(RedirectDecision::Redirect("/".to_string()));
        };

        match self.datastore.first_store_owned_by(user_id).await? {
            Some(store) => Ok(RedirectDecision::Redirect(format!("/{}", store.id))),
            None => Ok(RedirectDecision::Render),
        }
    }

    /// True iff `store_id` exists and belongs to `user_id`
    pub async fn verify_ownership(&self, user_id: &str, store_id: &str) -> Result<bool, DatabaseError> {
        Ok(self.datastore.find_owned_store(store_id, user_id).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryDatastore;

    async fn seeded() -> MemoryDatastore {
        let db = MemoryDatastore::new();
        db.seed_store("S1", "alice", "Alice's").await;
        db.seed_store("S2", "bob", "Bob's").await;
        db
    }

    #[tokio::test]
    async fn anonymous_callers_are_sent_to_root() {
        let db = seeded().await;
        let decision = TenantResolver::new(&db).redirect_target(None).await.unwrap();
        assert_eq!(decision, RedirectDecision::Redirect("/".to_string()));
    }

    #[tokio::test]
    async fn owners_are_sent_to_their_store() {
        let db = seeded().await;
        let decision = TenantResolver::new(&db).redirect_target(Some("alice")).await.unwrap();
        assert_eq!(decision, RedirectDecision::Redirect("/S1".to_string()));
    }

    #[tokio::test]
    async fn callers_without_a_store_render() {
        let db = seeded().await;
        let decision = TenantResolver::new(&db).redirect_target(Some("carol")).await.unwrap();
        assert_eq!(decision, RedirectDecision::Render);
    }

    #[tokio::test]
    async fn ownership_requires_matching_owner() {
        let db = seeded().await;
        let resolver = TenantResolver::new(&db);
        assert!(resolver.verify_ownership("alice", "S1").await.unwrap());
        assert!(!resolver.verify_ownership("alice", "S2").await.unwrap());
        assert!(!resolver.verify_ownership("alice", "missing").await.unwrap());
    }
}
