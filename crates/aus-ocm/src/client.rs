//! Blocking OCM API client
//!
//! Implements [`LabelStore`] and [`Directory`] against the OCM accounts and
//! clusters management APIs. Calls are sequential and never retried.

use std::time::Duration;

use aus_labels::{
    dry_run_prefix, BackendError, BackendResult, Cluster, Directory, Label, LabelScope,
    LabelStore, Organization, Subscription, VersionGate,
};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::model::{
    AccountDto, ClusterDto, GateAgreementDto, GateRefDto, LabelDto, NewGateAgreementDto,
    OrganizationDto, Page, SubscriptionDto, VersionGateDto,
};
use crate::search;

/// Default OCM API endpoint
pub const DEFAULT_API_URL: &str = "https://api.openshift.com";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const PAGE_SIZE: usize = 100;
const ACCOUNTS_MGMT: [&str; 3] = ["api", "accounts_mgmt", "v1"];
const CLUSTERS_MGMT: [&str; 3] = ["api", "clusters_mgmt", "v1"];

/// OCM API client authenticated with a bearer token
#[derive(Debug, Clone)]
pub struct OcmClient {
    base_url: Url,
    token: String,
    client: Client,
}

impl OcmClient {
    /// Create client
    ///
    /// An empty token is accepted here and reported by the first request,
    /// so commands that never reach the API work without credentials.
    ///
    /// # Errors
    /// Returns [`BackendError::Unavailable`] for an invalid URL or if the
    /// HTTP client cannot be built
    pub fn new(api_url: &str, token: impl Into<String>, timeout: Duration) -> BackendResult<Self> {
        let token = token.into().trim().to_string();
        let base_url = Url::parse(api_url)
            .map_err(|e| BackendError::Unavailable(format!("invalid API URL '{api_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Unavailable(format!(
                "invalid API URL '{api_url}'"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Unavailable(format!("can't create connection: {e}")))?;
        Ok(Self {
            base_url,
            token,
            client,
        })
    }

    /// API base URL
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments
    ///
    /// Segments are percent-encoded, so label keys and names may contain
    /// any character.
    #[must_use]
    pub fn endpoint(&self, api: [&str; 3], segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(api).extend(segments);
        }
        url
    }

    fn labels_endpoint(&self, scope: &LabelScope, key: Option<&str>) -> Url {
        let collection = match scope {
            LabelScope::Organization(_) => "organizations",
            LabelScope::Subscription(_) => "subscriptions",
        };
        let mut segments = vec![collection, scope.id(), "labels"];
        segments.extend(key);
        self.endpoint(ACCOUNTS_MGMT, &segments)
    }

    fn send(&self, request: RequestBuilder) -> BackendResult<Response> {
        if self.token.is_empty() {
            return Err(BackendError::Unavailable(
                "not logged in, no API token configured".to_string(),
            ));
        }
        let response = request
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        check_status(response)
    }

    fn get<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> BackendResult<T> {
        tracing::trace!(%url, "GET");
        let response = self.send(self.client.get(url).query(query))?;
        response
            .json::<T>()
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Fetch every page of a list endpoint; an empty `search` is not sent
    fn list<T: DeserializeOwned>(&self, url: &Url, search: &str, extra: &[(&str, String)]) -> BackendResult<Vec<T>> {
        let mut items = Vec::new();
        let mut page_number = 1usize;
        loop {
            let mut query = vec![
                ("page", page_number.to_string()),
                ("size", PAGE_SIZE.to_string()),
            ];
            if !search.is_empty() {
                query.push(("search", search.to_string()));
            }
            query.extend(extra.iter().cloned());

            let page: Page<T> = self.get(url.clone(), &query)?;
            let received = page.items.len();
            items.extend(page.items);
            if received == 0 || items.len() >= page.total {
                break;
            }
            page_number += 1;
        }
        Ok(items)
    }

    fn list_organization_labels(&self, organization_id: &str, key_prefix: &str) -> BackendResult<Vec<Label>> {
        let scope = LabelScope::Organization(organization_id.to_string());
        let labels = self.list::<LabelDto>(
            &self.labels_endpoint(&scope, None),
            &search::label_key_prefix(key_prefix),
            &[],
        );
        let labels = match labels {
            Ok(labels) => labels,
            Err(e) => {
                tracing::debug!(error = %e, "organization label listing failed, searching global labels");
                self.list::<LabelDto>(
                    &self.endpoint(ACCOUNTS_MGMT, &["labels"]),
                    &search::organization_label_key_prefix(organization_id, key_prefix),
                    &[],
                )?
            }
        };
        Ok(labels.into_iter().map(Label::from).collect())
    }
}

fn check_status(response: Response) -> BackendResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let message = response
        .text()
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(BackendError::Unavailable(
            format!("not authorized ({status}), check the API token"),
        )),
        _ => Err(BackendError::Http {
            status: status.as_u16(),
            url,
            message,
        }),
    }
}

impl LabelStore for OcmClient {
    fn list_labels(&self, scope: &LabelScope, key_prefix: &str) -> BackendResult<Vec<Label>> {
        match scope {
            LabelScope::Organization(id) => self.list_organization_labels(id, key_prefix),
            LabelScope::Subscription(_) => Ok(self
                .list::<LabelDto>(
                    &self.labels_endpoint(scope, None),
                    &search::label_key_prefix(key_prefix),
                    &[],
                )?
                .into_iter()
                .map(Label::from)
                .collect()),
        }
    }

    fn upsert_label(
        &self,
        scope: &LabelScope,
        key: &str,
        value: &str,
        dry_run: bool,
    ) -> BackendResult<()> {
        tracing::debug!("{}POST label {key}={value} on {scope}", dry_run_prefix(dry_run));
        if dry_run {
            return Ok(());
        }
        let body = LabelDto {
            key: key.to_string(),
            value: value.to_string(),
            internal: false,
        };
        self.send(self.client.post(self.labels_endpoint(scope, None)).json(&body))?;
        Ok(())
    }

    fn delete_label(&self, scope: &LabelScope, key: &str, dry_run: bool) -> BackendResult<()> {
        tracing::debug!("{}DELETE label {key} on {scope}", dry_run_prefix(dry_run));
        if dry_run {
            return Ok(());
        }
        self.send(self.client.delete(self.labels_endpoint(scope, Some(key))))?;
        Ok(())
    }
}

impl Directory for OcmClient {
    fn current_organization_id(&self) -> BackendResult<String> {
        let account: AccountDto = self.get(self.endpoint(ACCOUNTS_MGMT, &["current_account"]), &[])?;
        account
            .organization
            .map(|organization| organization.id)
            .ok_or_else(|| BackendError::not_found("organization", "of current account"))
    }

    fn organization(&self, organization_id: &str) -> BackendResult<Organization> {
        let url = self.endpoint(ACCOUNTS_MGMT, &["organizations", organization_id]);
        match self.get::<OrganizationDto>(url, &[]) {
            Ok(organization) => Ok(organization.into()),
            Err(BackendError::Http { status: 404, .. }) => {
                Err(BackendError::not_found("organization", organization_id))
            }
            Err(e) => Err(e),
        }
    }

    fn subscriptions(
        &self,
        organization_id: &str,
        display_name: Option<&str>,
    ) -> BackendResult<Vec<Subscription>> {
        let subscriptions = self.list::<SubscriptionDto>(
            &self.endpoint(ACCOUNTS_MGMT, &["subscriptions"]),
            &search::active_subscriptions(organization_id, display_name),
            &[("fetchLabels", "true".to_string())],
        )?;
        Ok(subscriptions.into_iter().map(Subscription::from).collect())
    }

    fn clusters(&self, organization_id: &str) -> BackendResult<Vec<Cluster>> {
        let clusters = self.list::<ClusterDto>(
            &self.endpoint(CLUSTERS_MGMT, &["clusters"]),
            &search::ready_clusters(organization_id),
            &[],
        )?;
        Ok(clusters.into_iter().map(Cluster::from).collect())
    }

    fn version_gates(&self) -> BackendResult<Vec<VersionGate>> {
        let gates =
            self.list::<VersionGateDto>(&self.endpoint(CLUSTERS_MGMT, &["version_gates"]), "", &[])?;
        Ok(gates.into_iter().map(VersionGate::from).collect())
    }

    fn gate_agreements(&self, cluster_id: &str) -> BackendResult<Vec<String>> {
        let agreements = self.list::<GateAgreementDto>(
            &self.endpoint(CLUSTERS_MGMT, &["clusters", cluster_id, "gate_agreements"]),
            "",
            &[],
        )?;
        Ok(agreements
            .into_iter()
            .map(|agreement| agreement.version_gate.id)
            .collect())
    }

    fn add_gate_agreement(
        &self,
        cluster_id: &str,
        gate_id: &str,
        dry_run: bool,
    ) -> BackendResult<()> {
        tracing::debug!(
            "{}POST gate agreement {gate_id} on cluster {cluster_id}",
            dry_run_prefix(dry_run)
        );
        if dry_run {
            return Ok(());
        }
        let body = NewGateAgreementDto {
            version_gate: GateRefDto { id: gate_id },
        };
        let url = self.endpoint(CLUSTERS_MGMT, &["clusters", cluster_id, "gate_agreements"]);
        self.send(self.client.post(url).json(&body))?;
        Ok(())
    }
}
