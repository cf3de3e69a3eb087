//! The two externally maintained lists: membership and banned.

use serde::{Deserialize, Serialize};

use subwatch_core::{BannedSet, MembershipSet, ResultExt, SubIdentifier};

use crate::error::Result;
use crate::fetcher::{JsonSource, fetch_document};

/// `{ "johnOliverSubs": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipDocument {
    pub john_oliver_subs: Vec<String>,
}

/// `{ "bannedSubs": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannedDocument {
    pub banned_subs: Vec<String>,
}

impl From<&BannedSet> for BannedDocument {
    fn from(set: &BannedSet) -> Self {
        Self {
            banned_subs: set.to_names(),
        }
    }
}

fn parse_entries(entries: &[String]) -> impl Iterator<Item = SubIdentifier> + '_ {
    entries
        .iter()
        .filter_map(|raw| SubIdentifier::parse(raw).into_option_logged())
}

impl MembershipDocument {
    pub fn to_set(&self) -> MembershipSet {
        MembershipSet::new(parse_entries(&self.john_oliver_subs))
    }
}

impl BannedDocument {
    pub fn to_set(&self) -> BannedSet {
        BannedSet::new(parse_entries(&self.banned_subs))
    }
}

/// Fetch the membership list.
///
/// # Errors
///
/// Returns fetch errors unchanged, or
/// [`Error::InvalidPayload`](crate::Error::InvalidPayload) if the document
/// lacks `johnOliverSubs`.
pub async fn fetch_membership(source: &dyn JsonSource, url: &str) -> Result<MembershipSet> {
    let document: MembershipDocument = fetch_document(source, url).await?;
    Ok(document.to_set())
}

/// Fetch the banned list.
///
/// # Errors
///
/// Returns fetch errors unchanged, or
/// [`Error::InvalidPayload`](crate::Error::InvalidPayload) if the document
/// lacks `bannedSubs`.
pub async fn fetch_banned(source: &dyn JsonSource, url: &str) -> Result<BannedSet> {
    let document: BannedDocument = fetch_document(source, url).await?;
    Ok(document.to_set())
}
