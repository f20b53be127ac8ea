//! Registry query shape and its filter enums.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::{KontragentError, Result};

/// Upper bound DaData accepts for `count`.
pub const MAX_COUNT: u32 = 300;

/// Main registration vs. subordinate branch.
///
/// A query without a branch type matches both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BranchType {
    Main,
    Branch,
}

impl BranchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchType::Main => "MAIN",
            BranchType::Branch => "BRANCH",
        }
    }
}

impl FromStr for BranchType {
    type Err = KontragentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MAIN" => Ok(BranchType::Main),
            "BRANCH" => Ok(BranchType::Branch),
            other => Err(KontragentError::InvalidInput(format!(
                "branch_type must be one of: MAIN, BRANCH (got {other:?})"
            ))),
        }
    }
}

/// Legal entity vs. individual entrepreneur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Legal,
    Individual,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Legal => "LEGAL",
            EntityType::Individual => "INDIVIDUAL",
        }
    }
}

impl FromStr for EntityType {
    type Err = KontragentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LEGAL" => Ok(EntityType::Legal),
            "INDIVIDUAL" => Ok(EntityType::Individual),
            other => Err(KontragentError::InvalidInput(format!(
                "type must be one of: LEGAL, INDIVIDUAL (got {other:?})"
            ))),
        }
    }
}

/// Registry lifecycle status of a party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyStatus {
    Active,
    Liquidating,
    Liquidated,
    Bankrupt,
    Reorganizing,
}

impl PartyStatus {
    pub const ALL: [PartyStatus; 5] = [
        PartyStatus::Active,
        PartyStatus::Liquidating,
        PartyStatus::Liquidated,
        PartyStatus::Bankrupt,
        PartyStatus::Reorganizing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartyStatus::Active => "ACTIVE",
            PartyStatus::Liquidating => "LIQUIDATING",
            PartyStatus::Liquidated => "LIQUIDATED",
            PartyStatus::Bankrupt => "BANKRUPT",
            PartyStatus::Reorganizing => "REORGANIZING",
        }
    }
}

impl FromStr for PartyStatus {
    type Err = KontragentError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        PartyStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == upper)
            .ok_or_else(|| {
                KontragentError::InvalidInput(format!(
                    "status must contain only: ACTIVE, LIQUIDATING, LIQUIDATED, BANKRUPT, REORGANIZING (got {upper:?})"
                ))
            })
    }
}

impl fmt::Display for PartyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `findById/party` request.
///
/// Used both as the network request shape and, through [`cache_key`](Self::cache_key),
/// as the cache key of multi-result lookups. Statuses are a set, so the
/// order in which filters were added never changes the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupQuery {
    pub identifier: String,
    pub branch_type: Option<BranchType>,
    pub kpp: Option<String>,
    pub entity_type: Option<EntityType>,
    pub statuses: Option<BTreeSet<PartyStatus>>,
    pub count: u32,
}

impl LookupQuery {
    /// Query for `identifier` with no filters and the default page size (10).
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into().trim().to_string(),
            branch_type: None,
            kpp: None,
            entity_type: None,
            statuses: None,
            count: 10,
        }
    }

    /// Single head-office record: `branch_type=MAIN, count=1`.
    pub fn main(identifier: impl Into<String>) -> Self {
        Self::new(identifier).branch_type(BranchType::Main).count(1)
    }

    /// Branches of an organisation.
    pub fn branches(identifier: impl Into<String>, count: u32) -> Self {
        Self::new(identifier)
            .branch_type(BranchType::Branch)
            .count(count)
    }

    pub fn branch_type(mut self, branch_type: BranchType) -> Self {
        self.branch_type = Some(branch_type);
        self
    }

    /// Filter by KPP; a blank value clears the filter.
    pub fn kpp(mut self, kpp: impl Into<String>) -> Self {
        let kpp = kpp.into().trim().to_string();
        self.kpp = (!kpp.is_empty()).then_some(kpp);
        self
    }

    pub fn entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    /// Add a status filter. Repeated statuses collapse.
    pub fn status(mut self, status: PartyStatus) -> Self {
        self.statuses.get_or_insert_with(BTreeSet::new).insert(status);
        self
    }

    pub fn statuses(mut self, statuses: impl IntoIterator<Item = PartyStatus>) -> Self {
        self.statuses
            .get_or_insert_with(BTreeSet::new)
            .extend(statuses);
        self
    }

    /// Requested result count, clamped to `1..=300`.
    pub fn count(mut self, count: u32) -> Self {
        self.count = count.clamp(1, MAX_COUNT);
        self
    }

    /// Deterministic cache key: every field contributes, statuses sorted.
    pub fn cache_key(&self) -> String {
        let statuses = self
            .statuses
            .iter()
            .flatten()
            .map(PartyStatus::as_str)
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}:{}:{}:{}:{}:{}",
            self.identifier,
            self.branch_type.map_or("ALL", |b| b.as_str()),
            self.kpp.as_deref().unwrap_or(""),
            self.entity_type.map_or("", |t| t.as_str()),
            statuses,
            self.count,
        )
    }

    /// JSON body for the `findById/party` endpoint.
    pub fn to_request_body(&self) -> FindByIdRequest<'_> {
        FindByIdRequest {
            query: &self.identifier,
            count: self.count.clamp(1, MAX_COUNT),
            branch_type: self.branch_type,
            kpp: self.kpp.as_deref(),
            entity_type: self.entity_type,
            status: self
                .statuses
                .as_ref()
                .filter(|s| !s.is_empty())
                .map(|s| s.iter().copied().collect()),
        }
    }
}

/// Wire shape of a `findById/party` request.
#[derive(Debug, Serialize)]
pub struct FindByIdRequest<'a> {
    pub query: &'a str,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_type: Option<BranchType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kpp: Option<&'a str>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<PartyStatus>>,
}
