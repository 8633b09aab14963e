//! Operator-to-ambulance ownership checks.
//!
//! Crew routes act on an ambulance named in the path, but the authority comes
//! from the authenticated operator account. The check resolves the operator's
//! own profile and compares; the target id itself is never looked up, so the
//! outcome reveals nothing about other ambulances.

use anyhow::Result;

use super::models::ambulance::Ambulance;
use crate::common::{AmbulanceId, UserId};
use crate::kernel::BaseDirectory;

/// Outcome of resolving whether an operator may act on an ambulance.
///
/// Callers map each variant to a wire response themselves. `Forbidden` must
/// not surface as its own status code: the wire reads it as a conflict, so a
/// probing caller cannot confirm that somebody else's ambulance id exists.
#[derive(Debug)]
pub enum OperatorAccess {
    /// The operator's own ambulance, loaded as part of the check.
    Authorized(Ambulance),
    /// The operator has no ambulance profile.
    NotFound,
    /// The operator has a profile, but the target is not their ambulance.
    Forbidden,
}

/// Resolve the acting operator's ambulance and compare it to the target.
pub async fn authorize_operator(
    directory: &dyn BaseDirectory,
    operator: UserId,
    ambulance_id: AmbulanceId,
) -> Result<OperatorAccess> {
    let Some(ambulance) = directory.ambulance_for_operator(operator).await? else {
        return Ok(OperatorAccess::NotFound);
    };
    if ambulance.id != ambulance_id {
        return Ok(OperatorAccess::Forbidden);
    }
    Ok(OperatorAccess::Authorized(ambulance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::InMemoryDirectory;

    #[tokio::test]
    async fn operator_without_profile_is_not_found() {
        let directory = InMemoryDirectory::new();
        let access = authorize_operator(&directory, UserId::new(), AmbulanceId::new())
            .await
            .unwrap();
        assert!(matches!(access, OperatorAccess::NotFound));
    }

    #[tokio::test]
    async fn operator_acting_on_own_ambulance_is_authorized() {
        let directory = InMemoryDirectory::new();
        let operator = UserId::new();
        let ambulance = Ambulance::new(operator, "AMB-001", "Kasun Perera", "+94771234567", None);
        let ambulance = directory.insert_ambulance(&ambulance).await.unwrap();

        let access = authorize_operator(&directory, operator, ambulance.id)
            .await
            .unwrap();
        match access {
            OperatorAccess::Authorized(own) => assert_eq!(own.id, ambulance.id),
            other => panic!("expected Authorized, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn operator_acting_on_other_ambulance_is_forbidden() {
        let directory = InMemoryDirectory::new();
        let operator = UserId::new();
        let own = Ambulance::new(operator, "AMB-001", "Kasun Perera", "+94771234567", None);
        directory.insert_ambulance(&own).await.unwrap();

        let access = authorize_operator(&directory, operator, AmbulanceId::new())
            .await
            .unwrap();
        assert!(matches!(access, OperatorAccess::Forbidden));
    }
}
