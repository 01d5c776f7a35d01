use serde::{Deserialize, Deserializer, Serialize};

/// Tenant used when no tenant is specified for a token request.
pub const COMMON_TENANT: &str = "common";

/// API version used for the management tenant and subscription listings.
pub const ARM_API_VERSION: &str = "2019-11-01";

/// Category reported by the management API for the account's own directory.
pub const HOME_TENANT_CATEGORY: &str = "Home";

// ============ Resources & Settings ============

/// Token audiences an account can request tokens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AzureResource {
    ResourceManagement,
    Sql,
    OssRdbms,
    AzureKeyVault,
    Graph,
    MicrosoftResourceManagement,
}

/// A resource (token audience) known to the identity platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Short identifier, used in cache keys.
    pub id: String,
    /// Audience URL sent as the `resource` form field.
    pub endpoint: String,
    pub azure_resource_id: AzureResource,
}

impl Resource {
    pub fn new(id: &str, endpoint: &str, azure_resource_id: AzureResource) -> Self {
        Self {
            id: id.to_string(),
            endpoint: endpoint.to_string(),
            azure_resource_id,
        }
    }
}

/// Per-cloud provider settings: login host, client registration and resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    /// Provider id, stored in every account key.
    pub id: String,
    pub display_name: String,
    /// Login endpoint, with trailing slash (`https://login.microsoftonline.com/`).
    pub host: String,
    pub client_id: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub arm_resource: Resource,
    pub sql_resource: Resource,
    pub graph_resource: Resource,
    pub oss_rdbms_resource: Resource,
    pub microsoft_resource: Resource,
    pub azure_key_vault_resource: Resource,
}

impl ProviderSettings {
    /// All six resources, in lookup order.
    pub fn resources(&self) -> [&Resource; 6] {
        [
            &self.arm_resource,
            &self.sql_resource,
            &self.graph_resource,
            &self.oss_rdbms_resource,
            &self.microsoft_resource,
            &self.azure_key_vault_resource,
        ]
    }

    /// Find the resource registered for an audience.
    pub fn find_resource(&self, azure_resource: AzureResource) -> Option<&Resource> {
        self.resources()
            .into_iter()
            .find(|r| r.azure_resource_id == azure_resource)
    }
}

/// Well-known Azure clouds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AzureCloud {
    #[default]
    Public,
    China,
    UsGovernment,
}

/// Default public client registration.
const DEFAULT_CLIENT_ID: &str = "a69788c6-1d43-44ed-9ca3-b83e194da255";
const DEFAULT_REDIRECT_URI: &str = "http://localhost/redirect";

struct CloudEndpoints {
    id: &'static str,
    display_name: &'static str,
    host: &'static str,
    arm: &'static str,
    sql: &'static str,
    graph: &'static str,
    oss_rdbms: &'static str,
    microsoft: &'static str,
    key_vault: &'static str,
}

const PUBLIC_CLOUD: CloudEndpoints = CloudEndpoints {
    id: "azure_publicCloud",
    display_name: "Azure",
    host: "https://login.microsoftonline.com/",
    arm: "https://management.azure.com/",
    sql: "https://database.windows.net/",
    graph: "https://graph.windows.net/",
    oss_rdbms: "https://ossrdbms-aad.database.windows.net/",
    microsoft: "https://management.core.windows.net/",
    key_vault: "https://vault.azure.net/",
};

const CHINA_CLOUD: CloudEndpoints = CloudEndpoints {
    id: "azure_chinaCloud",
    display_name: "Azure (China)",
    host: "https://login.chinacloudapi.cn/",
    arm: "https://management.chinacloudapi.cn/",
    sql: "https://database.chinacloudapi.cn/",
    graph: "https://graph.chinacloudapi.cn/",
    oss_rdbms: "https://ossrdbms-aad.database.chinacloudapi.cn/",
    microsoft: "https://management.core.chinacloudapi.cn/",
    key_vault: "https://vault.azure.cn/",
};

const US_GOV_CLOUD: CloudEndpoints = CloudEndpoints {
    id: "azure_usGovernmentCloud",
    display_name: "Azure (US Government)",
    host: "https://login.microsoftonline.us/",
    arm: "https://management.usgovcloudapi.net/",
    sql: "https://database.usgovcloudapi.net/",
    graph: "https://graph.windows.net/",
    oss_rdbms: "https://ossrdbms-aad.database.usgovcloudapi.net/",
    microsoft: "https://management.core.usgovcloudapi.net/",
    key_vault: "https://vault.usgovcloudapi.net/",
};

impl AzureCloud {
    /// Built-in settings for this cloud.
    pub fn settings(self) -> ProviderSettings {
        let e = match self {
            Self::Public => &PUBLIC_CLOUD,
            Self::China => &CHINA_CLOUD,
            Self::UsGovernment => &US_GOV_CLOUD,
        };
        ProviderSettings {
            id: e.id.to_string(),
            display_name: e.display_name.to_string(),
            host: e.host.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scopes: vec![
                "openid".to_string(),
                "email".to_string(),
                "profile".to_string(),
                "offline_access".to_string(),
                format!("{}user_impersonation", e.arm),
            ],
            arm_resource: Resource::new("marm", e.arm, AzureResource::ResourceManagement),
            sql_resource: Resource::new("sql", e.sql, AzureResource::Sql),
            graph_resource: Resource::new("graph", e.graph, AzureResource::Graph),
            oss_rdbms_resource: Resource::new("ossrdbms", e.oss_rdbms, AzureResource::OssRdbms),
            microsoft_resource: Resource::new(
                "arm",
                e.microsoft,
                AzureResource::MicrosoftResourceManagement,
            ),
            azure_key_vault_resource: Resource::new(
                "vault",
                e.key_vault,
                AzureResource::AzureKeyVault,
            ),
        }
    }
}

// ============ Tenants & Subscriptions ============

/// Tenant entry as returned by the management API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantInfo {
    pub tenant_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub tenant_category: Option<String>,
}

/// A directory the account belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,
    pub display_name: String,
    /// Key of the access token the tenant was discovered with.
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_category: Option<String>,
}

impl Tenant {
    pub fn is_home(&self) -> bool {
        self.tenant_category.as_deref() == Some(HOME_TENANT_CATEGORY)
    }
}

/// A billing/resource container owned by a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub display_name: String,
    pub tenant_id: String,
}

// ============ Token endpoint ============

/// Form body of a `grant_type=refresh_token` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
    pub client_id: String,
    /// Audience endpoint; omitted from the form when `None`.
    pub resource: Option<String>,
}

impl RefreshTokenRequest {
    /// Form fields in the order they are sent.
    pub fn form_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", self.refresh_token.as_str()),
            ("client_id", self.client_id.as_str()),
            ("tenant", COMMON_TENANT),
        ];
        if let Some(resource) = &self.resource {
            pairs.push(("resource", resource.as_str()));
        }
        pairs
    }
}

/// Successful token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenEndpointResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Epoch seconds, as sent by the endpoint.
    #[serde(deserialize_with = "string_or_number")]
    pub expires_on: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub resource: Option<String>,
}

/// Outcome of a refresh-token exchange that reached the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenExchange {
    Issued(TokenEndpointResponse),
    /// The tenant requires the user to re-consent interactively.
    InteractionRequired { description: Option<String> },
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
