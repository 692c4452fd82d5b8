//! The idempotency engine.
//!
//! One generic diff-and-decide loop serves both resource kinds. A kind plugs
//! in through [`ResourceApi`]: a natural-key accessor, an id accessor, the
//! comparison rule, and the four HTTP bindings. The decision itself is the
//! pure [`plan`] step; [`reconcile`] executes it with at most one mutating
//! call, and check mode short-circuits strictly before that call.

use std::collections::HashMap;

use crate::error::MonascaError;
use crate::params::State;

/// What a reconcile invocation did (or, in check mode, would have done).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Unchanged { id: Option<String> },
    Created { id: Option<String> },
    Updated { id: String },
    Deleted,
}

impl Outcome {
    /// False only for `Unchanged`.
    pub fn changed(&self) -> bool {
        !matches!(self, Outcome::Unchanged { .. })
    }

    /// The resource identifier, when known.
    pub fn id(&self) -> Option<&str> {
        match self {
            Outcome::Unchanged { id } | Outcome::Created { id } => id.as_deref(),
            Outcome::Updated { id } => Some(id),
            Outcome::Deleted => None,
        }
    }
}

/// Bindings one resource kind provides to the engine.
#[allow(async_fn_in_trait)]
pub trait ResourceApi {
    type Desired;
    type Remote;

    fn desired_name(desired: &Self::Desired) -> &str;
    fn desired_state(desired: &Self::Desired) -> State;
    fn remote_name(remote: &Self::Remote) -> &str;
    fn remote_id(remote: &Self::Remote) -> &str;
    fn up_to_date(desired: &Self::Desired, remote: &Self::Remote) -> bool;

    async fn list(&self) -> Result<Vec<Self::Remote>, MonascaError>;
    /// Returns the server-assigned id of the new resource.
    async fn create(&self, desired: &Self::Desired) -> Result<String, MonascaError>;
    /// Returns the id reported by the update response.
    async fn update(&self, id: &str, desired: &Self::Desired) -> Result<String, MonascaError>;
    async fn delete(&self, id: &str) -> Result<(), MonascaError>;
}

/// The decision for one desired resource against the existing collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Already in the desired state; carries the existing id when present.
    Keep(Option<String>),
    Create,
    Update(String),
    Delete(String),
}

/// Decide what to do, without touching the network.
///
/// The existing collection is indexed by name, last write wins on duplicate
/// names (not expected upstream, not defended against).
pub fn plan<A: ResourceApi>(desired: &A::Desired, existing: &[A::Remote]) -> Plan {
    let mut index: HashMap<&str, &A::Remote> = HashMap::new();
    for remote in existing {
        index.insert(A::remote_name(remote), remote);
    }

    let current = index.get(A::desired_name(desired)).copied();

    match (A::desired_state(desired), current) {
        (State::Absent, None) => Plan::Keep(None),
        (State::Absent, Some(remote)) => Plan::Delete(A::remote_id(remote).to_string()),
        (State::Present, None) => Plan::Create,
        (State::Present, Some(remote)) => {
            let id = A::remote_id(remote).to_string();
            if A::up_to_date(desired, remote) {
                Plan::Keep(Some(id))
            } else {
                Plan::Update(id)
            }
        }
    }
}

/// List the existing collection, diff, and issue at most one mutating call.
///
/// In check mode every mutating branch returns its would-be outcome without
/// making the call; `Created` then carries no id.
pub async fn reconcile<A: ResourceApi>(
    api: &A,
    desired: &A::Desired,
    check_mode: bool,
) -> Result<Outcome, MonascaError> {
    let existing = api.list().await?;
    let decision = plan::<A>(desired, &existing);
    tracing::debug!(
        "reconcile {:?} for {:?}",
        decision,
        A::desired_name(desired)
    );

    match decision {
        Plan::Keep(id) => Ok(Outcome::Unchanged { id }),
        Plan::Create => {
            if check_mode {
                return Ok(Outcome::Created { id: None });
            }
            let id = api.create(desired).await?;
            Ok(Outcome::Created { id: Some(id) })
        }
        Plan::Update(id) => {
            if check_mode {
                return Ok(Outcome::Updated { id });
            }
            let id = api.update(&id, desired).await?;
            Ok(Outcome::Updated { id })
        }
        Plan::Delete(id) => {
            if check_mode {
                return Ok(Outcome::Deleted);
            }
            api.delete(&id).await?;
            Ok(Outcome::Deleted)
        }
    }
}
