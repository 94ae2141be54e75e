//! Fixture files describing a tracked account and what its regions return.
//!
//! ```json
//! {
//!   "account": { "id": 1, "roleArn": "arn:aws:iam::123456789012:role/costlens", "externalId": "x" },
//!   "accountId": "123456789012",
//!   "regions": {
//!     "us-east-1": { "pages": [ { "records": [] } ] },
//!     "eu-west-1": { "pages": [ { "records": [] }, { "error": "throttled" } ] },
//!     "ap-south-1": { "stalled": true }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use costlens_collector::{ProviderError, StaticProvider};
use costlens_types::{AccountId, CloudAccount, Region, ResourceRecord};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub account: CloudAccount,
    pub account_id: AccountId,
    #[serde(default)]
    pub regions: BTreeMap<Region, FixtureRegion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureRegion {
    #[serde(default)]
    pub pages: Vec<FixturePage>,
    /// Listing never completes
    #[serde(default)]
    pub stalled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FixturePage {
    Records { records: Vec<ResourceRecord> },
    Error { error: String },
}

impl Fixture {
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading fixture {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing fixture {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Build the provider serving this fixture.
    pub fn provider(&self) -> StaticProvider {
        let mut provider = StaticProvider::new(self.account_id.clone());
        for (region, script) in &self.regions {
            if script.stalled {
                provider = provider.with_stalled_region(region.clone());
                continue;
            }
            let pages = script
                .pages
                .iter()
                .map(|page| match page {
                    FixturePage::Records { records } => Ok(records.clone()),
                    FixturePage::Error { error } => {
                        Err(ProviderError::api("DescribeReservedInstances", error.clone()))
                    }
                })
                .collect();
            provider = provider.with_pages(region.clone(), pages);
        }
        provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costlens_collector::{ProviderClient, ResourcePage};
    use costlens_types::Credentials;

    const FIXTURE: &str = r#"{
        "account": { "id": 7, "roleArn": "arn:aws:iam::123456789012:role/costlens", "externalId": "ext" },
        "accountId": "123456789012",
        "regions": {
            "us-east-1": { "pages": [ { "records": [ {
                "id": "ri-1", "region": "us-east-1a", "type": "m5.large",
                "fixedPrice": 100.0, "usagePrice": 0.01, "duration": 31536000,
                "start": "2024-01-01T00:00:00Z", "end": "2025-01-01T00:00:00Z",
                "instanceCount": 2
            } ] } ] },
            "eu-west-1": { "pages": [ { "records": [] }, { "error": "throttled" } ] },
            "ap-south-1": { "stalled": true }
        }
    }"#;

    #[test]
    fn test_parse_fixture() {
        let fixture = Fixture::parse(FIXTURE).unwrap();
        assert_eq!(fixture.account.id, 7);
        assert_eq!(fixture.account_id.as_str(), "123456789012");
        assert_eq!(fixture.regions.len(), 3);
        assert!(fixture.regions[&Region::from("ap-south-1")].stalled);
    }

    #[tokio::test]
    async fn test_provider_serves_fixture_pages() {
        let provider = Fixture::parse(FIXTURE).unwrap().provider();
        let credentials = Credentials::new("a", "b");
        let home = Region::from("us-east-1");

        let regions = provider.list_regions(&credentials, &home).await.unwrap();
        assert_eq!(regions.len(), 3);

        let page: ResourcePage = provider
            .list_reserved_resources(&home, &credentials, None)
            .await
            .unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].instance_count, 2);

        let eu = Region::from("eu-west-1");
        let first = provider
            .list_reserved_resources(&eu, &credentials, None)
            .await
            .unwrap();
        let err = provider
            .list_reserved_resources(&eu, &credentials, first.next_token.as_deref())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Api { .. }));
    }

    #[test]
    fn test_rejects_malformed_fixture() {
        assert!(Fixture::parse(r#"{ "accountId": "1" }"#).is_err());
    }
}
