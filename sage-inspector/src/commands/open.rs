use std::process::Command;

use anyhow::{bail, Result};
use clap::Args;
use tracing::debug;

use crate::{arn::Arn, resource::ResourceKind};

#[cfg(target_os = "macos")]
const OPEN_CMD: &str = "open";
#[cfg(not(target_os = "macos"))]
const OPEN_CMD: &str = "xdg-open";

/// Input arguments for the `open` command
#[derive(Args, Debug)]
pub struct Open {
  /// Resource ARN
  ///
  /// E.g. arn:aws:sagemaker:us-east-1:123456789012:training-job/job-name
  arn: Arn,

  /// Print the link instead of opening it in the browser
  #[arg(short, long = "print")]
  print_only: bool,
}

impl Open {
  pub async fn run(&self) -> Result<()> {
    let url = console_url(&self.arn)?;

    if self.print_only {
      println!("{url}");
      return Ok(());
    }

    debug!("Opening {url}");
    let status = Command::new(OPEN_CMD).arg(&url).status()?;
    if !status.success() {
      bail!("{OPEN_CMD} exited with {status}");
    }

    Ok(())
  }
}

/// AWS console URL for the resource behind the ARN
fn console_url(arn: &Arn) -> Result<String> {
  let kind = ResourceKind::from_arn(arn)?;
  let region = &arn.region;

  Ok(format!(
    "https://{region}.console.aws.amazon.com/sagemaker/home?region={region}#/{}/{}",
    kind.url_prefix(),
    arn.resource_id()
  ))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn it_builds_training_job_url() {
    let arn: Arn = "arn:aws:sagemaker:us-east-1:123456789012:training-job/my-job"
      .parse()
      .unwrap();

    let url = console_url(&arn).unwrap();
    assert_eq!(
      url,
      "https://us-east-1.console.aws.amazon.com/sagemaker/home?region=us-east-1#/jobs/my-job"
    );
  }

  #[test]
  fn it_builds_tuning_job_url() {
    let arn: Arn = "arn:aws:sagemaker:eu-west-1:123456789012:hyper-parameter-tuning-job/my-hpo"
      .parse()
      .unwrap();

    let url = console_url(&arn).unwrap();
    assert_eq!(
      url,
      "https://eu-west-1.console.aws.amazon.com/sagemaker/home?region=eu-west-1#/hyper-tuning-jobs/my-hpo"
    );
  }

  #[test]
  fn it_rejects_non_sagemaker_resources() {
    let arn: Arn = "arn:aws:s3:::my-bucket".parse().unwrap();
    assert!(console_url(&arn).is_err());
  }
}
