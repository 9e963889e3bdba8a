use std::{fs, path::Path};

use anyhow::{bail, Result};
use aws_config::SdkConfig;
use aws_sdk_s3::{
  config::{self, retry::RetryConfig},
  Client,
};
use tracing::info;

/// Get the S3 client
pub async fn get_client(config: &SdkConfig) -> Result<Client> {
  let client = Client::from_conf(
    config::Builder::from(config)
      .retry_config(RetryConfig::standard().with_max_attempts(3))
      .build(),
  );
  Ok(client)
}

/// Split an `s3://bucket/prefix` URI into its bucket and prefix
pub fn split_uri(s3_uri: &str) -> Result<(&str, &str)> {
  let Some(path) = s3_uri.strip_prefix("s3://") else {
    bail!("`{s3_uri}` is not an S3 URI");
  };

  Ok(match path.split_once('/') {
    Some((bucket, prefix)) => (bucket, prefix),
    None => (path, ""),
  })
}

/// Download every object under the URI's prefix into the destination directory
///
/// Objects are stored flat under their file name, mirroring how SageMaker
/// mounts channel data into a training container
pub async fn download_prefix(client: &Client, s3_uri: &str, destination: &Path) -> Result<()> {
  let (bucket, prefix) = split_uri(s3_uri)?;
  let mut token: Option<String> = None;

  loop {
    let mut request = client.list_objects_v2().bucket(bucket).prefix(prefix);
    if let Some(token) = &token {
      request = request.continuation_token(token);
    }

    let response = request.send().await?;
    for object in response.contents.unwrap_or_default() {
      let Some(key) = object.key else { continue };
      let name = match key.rsplit_once('/') {
        Some((_, name)) => name,
        None => key.as_str(),
      };
      // Directory placeholder objects end in `/`
      if name.is_empty() {
        continue;
      }

      info!("Downloading s3://{bucket}/{key}");
      let body = client.get_object().bucket(bucket).key(&key).send().await?;
      let data = body.body.collect().await?;
      fs::write(destination.join(name), data.into_bytes())?;
    }

    token = response.next_continuation_token;
    if token.is_none() {
      break;
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use rstest::*;

  use super::*;

  #[rstest]
  #[case("s3://my-bucket/data/train", "my-bucket", "data/train")]
  #[case("s3://my-bucket/", "my-bucket", "")]
  #[case("s3://my-bucket", "my-bucket", "")]
  fn split_uri_test(#[case] uri: &str, #[case] bucket: &str, #[case] prefix: &str) {
    let result = split_uri(uri).unwrap();
    assert_eq!(result, (bucket, prefix));
  }

  #[test]
  fn split_uri_rejects_other_schemes() {
    assert!(split_uri("https://example.com/data").is_err());
  }
}
