pub mod arn;
pub mod cli;
pub mod commands;
pub mod logs;
pub mod profile;
pub mod resource;
pub mod s3;
pub mod sagemaker;

use anyhow::Result;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_types::region::Region;
pub use cli::{Cli, Commands};
use tracing::debug;

use crate::{arn::Arn, profile::ProfileSet};

/// Get the configuration to authn/authz with AWS that will be used across AWS clients
///
/// The account id parsed from the ARN is matched against the profiles declared in
/// the shared AWS config file. When a profile references that account, the session
/// is scoped to it; otherwise the default credential chain is used. The region
/// always comes from the ARN
pub async fn get_sdk_config(arn: &Arn) -> Result<SdkConfig> {
  let profiles = ProfileSet::read()?;

  let mut loader =
    aws_config::defaults(BehaviorVersion::latest()).region(Region::new(arn.region.clone()));

  match profiles.profile_for_account(&arn.account) {
    Some(profile) => {
      debug!("Using profile {profile} for account {}", arn.account);
      loader = loader.profile_name(profile);
    }
    None => debug!(
      "No profile found for account {} - using default credentials",
      arn.account
    ),
  }

  Ok(loader.load().await)
}
