use super::*;
use gym_core::ID;
use gym_core::Unique;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Storage seam for members and their credentials.
/// The auth pipeline only reads through `lookup` and `find`.
#[allow(async_fn_in_trait)]
pub trait Members {
    async fn lookup(&self, email: &str) -> Result<Option<(Member, Password)>, Failure>;
    async fn find(&self, id: ID<Member>) -> Result<Option<Member>, Failure>;
    async fn exists(&self, email: &str) -> Result<bool, Failure>;
    async fn create(&self, member: &Member, password: &Password) -> Result<(), Failure>;
}

/// In-process member store keyed by email.
#[derive(Default)]
pub struct Roster {
    members: RwLock<HashMap<String, (Member, Password)>>,
}

impl Members for Roster {
    async fn lookup(&self, email: &str) -> Result<Option<(Member, Password)>, Failure> {
        Ok(self.members.read().await.get(email).cloned())
    }

    async fn find(&self, id: ID<Member>) -> Result<Option<Member>, Failure> {
        Ok(self
            .members
            .read()
            .await
            .values()
            .map(|(member, _)| member)
            .find(|member| member.id() == id)
            .cloned())
    }

    async fn exists(&self, email: &str) -> Result<bool, Failure> {
        Ok(self.members.read().await.contains_key(email))
    }

    async fn create(&self, member: &Member, password: &Password) -> Result<(), Failure> {
        use std::collections::hash_map::Entry;
        match self.members.write().await.entry(member.email().to_string()) {
            Entry::Occupied(_) => Err(Failure::Conflict),
            Entry::Vacant(slot) => {
                slot.insert((member.clone(), password.clone()));
                Ok(())
            }
        }
    }
}
