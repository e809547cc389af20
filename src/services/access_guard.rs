/*
 * Responsibility
 * - リソースの owner と呼び出し元 (caller) から Allow / Deny を決める
 * - 状態を持たない純粋関数のみ (HTTP には依存しない)
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    AuthenticationRequired,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny(DenyReason),
}

impl Access {
    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Access::Allow => Ok(()),
            Access::Deny(reason) => Err(reason),
        }
    }
}

/// Anything carrying an optional owner reference.
pub trait Owned {
    fn owner_id(&self) -> Option<&str>;
}

/// Ownership policy:
/// - no owner (or empty owner) → Allow
/// - owner, no caller → Deny(AuthenticationRequired)
/// - owner != caller → Deny(Forbidden)
/// - otherwise → Allow
pub fn check(resource_owner: Option<&str>, caller: Option<&str>) -> Access {
    let Some(owner) = resource_owner.filter(|o| !o.is_empty()) else {
        return Access::Allow;
    };

    match caller {
        None => Access::Deny(DenyReason::AuthenticationRequired),
        Some(caller) if caller != owner => Access::Deny(DenyReason::Forbidden),
        Some(_) => Access::Allow,
    }
}

/// "List mine": keep only entries owned by `caller`.
pub fn owned_by<T, I>(items: I, caller: &str) -> Vec<T>
where
    T: Owned,
    I: IntoIterator<Item = T>,
{
    items
        .into_iter()
        .filter(|item| item.owner_id() == Some(caller))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unowned_resource_is_public() {
        assert_eq!(check(None, None), Access::Allow);
        assert_eq!(check(None, Some("u1")), Access::Allow);
        assert_eq!(check(Some(""), None), Access::Allow);
    }

    #[test]
    fn owned_resource_requires_a_caller() {
        assert_eq!(
            check(Some("u1"), None),
            Access::Deny(DenyReason::AuthenticationRequired)
        );
    }

    #[test]
    fn owned_resource_rejects_other_callers() {
        assert_eq!(
            check(Some("u1"), Some("u2")),
            Access::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn owner_is_allowed() {
        assert_eq!(check(Some("u1"), Some("u1")), Access::Allow);
        assert_eq!(check(Some("u1"), Some("u1")).into_result(), Ok(()));
    }

    struct Doc(Option<&'static str>);

    impl Owned for Doc {
        fn owner_id(&self) -> Option<&str> {
            self.0
        }
    }

    #[test]
    fn owned_by_filters_to_caller() {
        let docs = vec![Doc(Some("u1")), Doc(None), Doc(Some("u2")), Doc(Some("u1"))];

        let mine = owned_by(docs, "u1");

        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|d| d.0 == Some("u1")));
    }
}
