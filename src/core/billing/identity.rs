//! STS and IAM backed [`IdentityClient`].

use async_trait::async_trait;
use aws_config::SdkConfig;

use crate::core::billing::{classify_sdk_error, BillingError, IdentityClient};

pub struct AwsIdentity {
    sts: aws_sdk_sts::Client,
    iam: aws_sdk_iam::Client,
}

impl AwsIdentity {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            sts: aws_sdk_sts::Client::new(sdk_config),
            iam: aws_sdk_iam::Client::new(sdk_config),
        }
    }
}

fn first_alias(aliases: &[String]) -> Option<String> {
    aliases
        .iter()
        .map(|a| a.trim())
        .find(|a| !a.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl IdentityClient for AwsIdentity {
    async fn account_id(&self) -> Result<String, BillingError> {
        let response = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| classify_sdk_error("sts:GetCallerIdentity", e))?;
        response
            .account()
            .map(str::to_string)
            .ok_or(BillingError::InvalidResponse {
                operation: "sts:GetCallerIdentity",
                message: "response has no account ID".to_string(),
            })
    }

    async fn account_alias(&self) -> Result<Option<String>, BillingError> {
        let response = self
            .iam
            .list_account_aliases()
            .send()
            .await
            .map_err(|e| classify_sdk_error("iam:ListAccountAliases", e))?;
        Ok(first_alias(response.account_aliases()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_alias_picks_first_non_blank() {
        let aliases = vec!["  ".to_string(), "acme-prod".to_string(), "other".to_string()];
        assert_eq!(first_alias(&aliases).as_deref(), Some("acme-prod"));
    }

    #[test]
    fn first_alias_none_when_unregistered() {
        assert!(first_alias(&[]).is_none());
    }
}
