//! User-facing strings

pub const MICROSOFT_CORP_ACCOUNT: &str = "Microsoft Corp";
pub const MICROSOFT_ACCOUNT: &str = "Microsoft Account";
pub const DEFAULT_TENANT_NAME: &str = "Work or school account";

pub const ADD_TO_CACHE_ERROR: &str = "Error when adding your account to the cache.";
pub const REMOVE_FROM_CACHE_ERROR: &str = "Error when removing your account from the cache.";
pub const REFRESH_ACCOUNT_ERROR: &str = "Error when refreshing your account.";
pub const TOKEN_RETRIEVAL_ERROR: &str = "Retrieving the Azure token failed. Please sign in again.";
pub const REAUTH_PAGE_DECLINED: &str =
    "The authentication failed since the re-authentication page could not be opened.";

pub fn login_failed(detail: &str) -> String {
    format!("Failed to add account: {detail}")
}

pub fn consent_required(tenant: &str, resource: &str) -> String {
    format!("Your tenant '{tenant}' requires you to re-authenticate to access {resource} resources.")
}
