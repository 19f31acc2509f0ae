//! OCM wire types

use aus_labels::{Cluster, Label, Organization, Subscription, VersionGate};
use serde::{Deserialize, Serialize};

/// One page of a list response
#[derive(Debug, Deserialize)]
pub(crate) struct Page<T> {
    #[serde(default)]
    pub(crate) total: usize,
    #[serde(default = "Vec::new")]
    pub(crate) items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ObjectRef {
    pub(crate) id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountDto {
    pub(crate) organization: Option<ObjectRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrganizationDto {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    external_id: Option<String>,
}

impl From<OrganizationDto> for Organization {
    fn from(dto: OrganizationDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            external_id: dto.external_id,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct LabelDto {
    pub(crate) key: String,
    #[serde(default)]
    pub(crate) value: String,
    #[serde(default)]
    pub(crate) internal: bool,
}

impl From<LabelDto> for Label {
    fn from(dto: LabelDto) -> Self {
        Self::new(dto.key, dto.value)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubscriptionDto {
    id: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    cluster_id: String,
    #[serde(default)]
    labels: Vec<LabelDto>,
}

impl From<SubscriptionDto> for Subscription {
    fn from(dto: SubscriptionDto) -> Self {
        Self {
            id: dto.id,
            display_name: dto.display_name,
            cluster_id: dto.cluster_id,
            labels: dto.labels.into_iter().map(Label::from).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct VersionDto {
    #[serde(default)]
    raw_id: String,
    #[serde(default)]
    available_upgrades: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StsDto {
    #[serde(default)]
    enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
struct AwsDto {
    #[serde(default)]
    sts: Option<StsDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClusterDto {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: VersionDto,
    #[serde(default)]
    aws: Option<AwsDto>,
}

impl From<ClusterDto> for Cluster {
    fn from(dto: ClusterDto) -> Self {
        let sts_enabled = dto
            .aws
            .and_then(|aws| aws.sts)
            .is_some_and(|sts| sts.enabled);
        Self {
            id: dto.id,
            name: dto.name,
            version: dto.version.raw_id,
            available_upgrades: dto.version.available_upgrades,
            sts_enabled,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VersionGateDto {
    id: String,
    #[serde(default)]
    version_raw_id_prefix: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    documentation_url: String,
    #[serde(default)]
    sts_only: bool,
}

impl From<VersionGateDto> for VersionGate {
    fn from(dto: VersionGateDto) -> Self {
        Self {
            id: dto.id,
            version_raw_id_prefix: dto.version_raw_id_prefix,
            description: dto.description,
            documentation_url: dto.documentation_url,
            sts_only: dto.sts_only,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GateAgreementDto {
    pub(crate) version_gate: ObjectRef,
}

#[derive(Debug, Serialize)]
pub(crate) struct GateRefDto<'a> {
    pub(crate) id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewGateAgreementDto<'a> {
    pub(crate) version_gate: GateRefDto<'a>,
}
