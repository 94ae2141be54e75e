//! Cloud provider capability consumed by collection runs.
//!
//! The core never talks to a provider SDK directly. Everything it needs is
//! expressed by [`ProviderClient`]; retries, if any, belong to the
//! implementation.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use costlens_types::{AccountId, CloudAccount, Credentials, Region, ResourceRecord};

use crate::error::{ProviderError, ProviderResult};

/// One page of reserved resources for a region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourcePage {
    pub records: Vec<ResourceRecord>,
    /// Token for the next page, `None` on the last page.
    pub next_token: Option<String>,
}

impl ResourcePage {
    pub fn last(records: Vec<ResourceRecord>) -> Self {
        Self {
            records,
            next_token: None,
        }
    }
}

/// Provider operations required by the collection core.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Obtain temporary credentials for a tracked account.
    async fn assume_role(
        &self,
        account: &CloudAccount,
        session_name: &str,
    ) -> ProviderResult<Credentials>;

    /// Resolve the provider account id the credentials belong to.
    async fn resolve_account_id(
        &self,
        credentials: &Credentials,
        home_region: &Region,
    ) -> ProviderResult<AccountId>;

    /// List the regions reachable with the credentials.
    async fn list_regions(
        &self,
        credentials: &Credentials,
        home_region: &Region,
    ) -> ProviderResult<Vec<Region>>;

    /// Fetch one page of reserved resources in `region`.
    async fn list_reserved_resources(
        &self,
        region: &Region,
        credentials: &Credentials,
        page_token: Option<&str>,
    ) -> ProviderResult<ResourcePage>;
}

/// Scripted behaviour of one region in a [`StaticProvider`].
#[derive(Debug, Clone)]
enum RegionScript {
    /// Pages returned in order; an `Err` ends the listing.
    Pages(Vec<Result<Vec<ResourceRecord>, ProviderError>>),
    /// Listing never completes.
    Stalled,
}

/// Provider backed by fixed data, for development and testing.
#[derive(Debug)]
pub struct StaticProvider {
    account_id: AccountId,
    regions: BTreeMap<Region, RegionScript>,
    assume_role_error: Option<ProviderError>,
    account_error: Option<ProviderError>,
    regions_error: Option<ProviderError>,
    page_delay: Option<Duration>,
    credentials_expiry: Option<DateTime<Utc>>,
    listing_calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            regions: BTreeMap::new(),
            assume_role_error: None,
            account_error: None,
            regions_error: None,
            page_delay: None,
            credentials_expiry: None,
            listing_calls: AtomicUsize::new(0),
        }
    }

    /// Add a region whose resources fit in a single page.
    pub fn with_region(self, region: impl Into<Region>, records: Vec<ResourceRecord>) -> Self {
        self.with_pages(region, vec![Ok(records)])
    }

    /// Add a region listed page by page.
    pub fn with_pages(
        mut self,
        region: impl Into<Region>,
        pages: Vec<Result<Vec<ResourceRecord>, ProviderError>>,
    ) -> Self {
        self.regions.insert(region.into(), RegionScript::Pages(pages));
        self
    }

    /// Add a region whose listing hangs until the caller gives up.
    pub fn with_stalled_region(mut self, region: impl Into<Region>) -> Self {
        self.regions.insert(region.into(), RegionScript::Stalled);
        self
    }

    pub fn failing_assume_role(mut self, error: ProviderError) -> Self {
        self.assume_role_error = Some(error);
        self
    }

    pub fn failing_account_lookup(mut self, error: ProviderError) -> Self {
        self.account_error = Some(error);
        self
    }

    pub fn failing_region_listing(mut self, error: ProviderError) -> Self {
        self.regions_error = Some(error);
        self
    }

    /// Delay every page by `delay`.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = Some(delay);
        self
    }

    /// Issue credentials that expire at `at`.
    pub fn with_credentials_expiring_at(mut self, at: DateTime<Utc>) -> Self {
        self.credentials_expiry = Some(at);
        self
    }

    /// Number of resource listing calls served so far.
    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderClient for StaticProvider {
    async fn assume_role(
        &self,
        account: &CloudAccount,
        session_name: &str,
    ) -> ProviderResult<Credentials> {
        if let Some(error) = &self.assume_role_error {
            return Err(error.clone());
        }
        let mut credentials = Credentials::new(
            format!("STATIC{}", account.id),
            format!("{}:{}", account.external_id, session_name),
        );
        credentials.session_token = Some(session_name.to_string());
        credentials.expires_at = self.credentials_expiry;
        Ok(credentials)
    }

    async fn resolve_account_id(
        &self,
        _credentials: &Credentials,
        _home_region: &Region,
    ) -> ProviderResult<AccountId> {
        match &self.account_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.account_id.clone()),
        }
    }

    async fn list_regions(
        &self,
        _credentials: &Credentials,
        _home_region: &Region,
    ) -> ProviderResult<Vec<Region>> {
        match &self.regions_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.regions.keys().cloned().collect()),
        }
    }

    async fn list_reserved_resources(
        &self,
        region: &Region,
        _credentials: &Credentials,
        page_token: Option<&str>,
    ) -> ProviderResult<ResourcePage> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);

        let pages = match self.regions.get(region) {
            Some(RegionScript::Pages(pages)) => pages,
            Some(RegionScript::Stalled) => return std::future::pending().await,
            None => return Err(ProviderError::UnknownRegion(region.clone())),
        };

        if let Some(delay) = self.page_delay {
            tokio::time::sleep(delay).await;
        }

        let index = match page_token {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| {
                ProviderError::api("DescribeReservedInstances", format!("bad page token {token}"))
            })?,
        };

        match pages.get(index) {
            None => Ok(ResourcePage::default()),
            Some(Err(error)) => Err(error.clone()),
            Some(Ok(records)) => Ok(ResourcePage {
                records: records.clone(),
                next_token: (index + 1 < pages.len()).then(|| (index + 1).to_string()),
            }),
        }
    }
}
