use std::{fmt, str::FromStr};

use anyhow::bail;

/// A parsed Amazon Resource Name
///
/// `arn:partition:service:region:account-id:resource` where resource is one of
/// `resource-id`, `resource-type/resource-id` or `resource-type:resource-id`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Arn {
  pub service: String,
  pub region: String,
  pub account: String,
  pub resource: String,
}

impl Arn {
  /// Split the resource into a `(resource-type, resource-id)` pair
  ///
  /// When the resource carries no separator, both sides of the pair are the
  /// resource itself (e.g. a bare S3 bucket ARN yields the bucket twice)
  pub fn resource_split(&self) -> (&str, &str) {
    for sep in [':', '/'] {
      if let Some(pair) = self.resource.split_once(sep) {
        return pair;
      }
    }

    (&self.resource, &self.resource)
  }

  pub fn resource_type(&self) -> &str {
    self.resource_split().0
  }

  pub fn resource_id(&self) -> &str {
    self.resource_split().1
  }
}

impl FromStr for Arn {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let parts: Vec<&str> = s.splitn(6, ':').collect();

    match parts.as_slice() {
      ["arn", _partition, service, region, account, resource] => Ok(Self {
        service: service.to_string(),
        region: region.to_string(),
        account: account.to_string(),
        resource: resource.to_string(),
      }),
      _ => bail!("`{s}` is not a valid ARN"),
    }
  }
}

impl fmt::Display for Arn {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "arn:aws:{}:{}:{}:{}",
      self.service, self.region, self.account, self.resource
    )
  }
}
