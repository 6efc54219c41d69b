use crate::api::models::{AuditLog, ListResponse};
use crate::client::{ApiClient, ClientError};
use crate::transport::RequestOptions;

const AUDIT_LOGS: &str = "/audit/logs/";

/// Filters accepted by the audit log endpoint. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLogQuery {
    pub user: Option<String>,
    /// `create`, `read`, `update`, `delete`, `execute`, `login` or `logout`
    pub action: Option<String>,
    pub resource_type: Option<String>,
    /// Matched against description and resource id
    pub search: Option<String>,
    /// e.g. `-timestamp`
    pub ordering: Option<String>,
    pub page: Option<u32>,
}

impl AuditLogQuery {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let page = self.page.map(|p| p.to_string());
        [
            ("user", self.user.as_ref()),
            ("action", self.action.as_ref()),
            ("resource_type", self.resource_type.as_ref()),
            ("search", self.search.as_ref()),
            ("ordering", self.ordering.as_ref()),
            ("page", page.as_ref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v.clone())))
        .collect()
    }
}

impl ApiClient {
    /// Without filters no query string is appended.
    pub async fn get_audit_logs(
        &self,
        query: Option<&AuditLogQuery>,
    ) -> Result<Vec<AuditLog>, ClientError> {
        let pairs = query.map(AuditLogQuery::to_pairs).unwrap_or_default();
        self.request::<ListResponse<AuditLog>>(
            AUDIT_LOGS,
            RequestOptions::get().query(pairs),
        )
        .await
        .map(ListResponse::into_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_has_no_pairs() {
        assert!(AuditLogQuery::default().to_pairs().is_empty());
    }

    #[test]
    fn test_query_pairs_keep_field_order() {
        let query = AuditLogQuery {
            action: Some("login".to_string()),
            search: Some("cluster".to_string()),
            page: Some(2),
            ..AuditLogQuery::default()
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("action".to_string(), "login".to_string()),
                ("search".to_string(), "cluster".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }
}
