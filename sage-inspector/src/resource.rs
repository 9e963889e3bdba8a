use anyhow::{bail, Result};
use aws_config::SdkConfig;

use crate::{
  arn::Arn,
  logs::{self, LogFilter, LogStream},
  sagemaker,
};

/// SageMaker resource types that carry CloudWatch logs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
  Endpoint,
  NotebookInstance,
  TrainingJob,
  ProcessingJob,
  TransformJob,
  HyperParameterTuningJob,
}

impl ResourceKind {
  pub fn from_arn(arn: &Arn) -> Result<Self> {
    let kind = match arn.resource_type() {
      "endpoint" => Self::Endpoint,
      "notebook-instance" => Self::NotebookInstance,
      "training-job" => Self::TrainingJob,
      "processing-job" => Self::ProcessingJob,
      "transform-job" => Self::TransformJob,
      "hyper-parameter-tuning-job" => Self::HyperParameterTuningJob,
      other => bail!("`{other}` is not a supported SageMaker resource type"),
    };

    Ok(kind)
  }

  /// CamelCase name as used in log group names, e.g. `TrainingJob`
  pub fn kind_name(&self) -> &'static str {
    match self {
      Self::Endpoint => "Endpoint",
      Self::NotebookInstance => "NotebookInstance",
      Self::TrainingJob => "TrainingJob",
      Self::ProcessingJob => "ProcessingJob",
      Self::TransformJob => "TransformJob",
      Self::HyperParameterTuningJob => "HyperParameterTuningJob",
    }
  }

  /// Path prefix used for AWS console links
  pub fn url_prefix(&self) -> &'static str {
    match self {
      Self::Endpoint => "endpoints",
      Self::NotebookInstance => "notebook-instances",
      Self::TrainingJob => "jobs",
      Self::ProcessingJob => "processing-jobs",
      Self::TransformJob => "transform-jobs",
      Self::HyperParameterTuningJob => "hyper-tuning-jobs",
    }
  }

  /// CloudWatch log group holding the resource's streams
  ///
  /// Endpoints each get their own log group; tuning jobs log into the
  /// training job group of their trials
  pub fn log_group_name(&self, name: &str) -> String {
    match self {
      Self::Endpoint => format!("/aws/sagemaker/Endpoints/{name}"),
      Self::HyperParameterTuningJob => "/aws/sagemaker/TrainingJobs".to_string(),
      _ => format!("/aws/sagemaker/{}s", self.kind_name()),
    }
  }

  /// Stream name prefix within the log group, `None` selects the whole group
  pub fn log_stream_prefix(&self, name: &str) -> Option<String> {
    match self {
      Self::Endpoint => None,
      Self::HyperParameterTuningJob => Some(name.to_string()),
      _ => Some(format!("{name}/")),
    }
  }
}

/// A resolved SageMaker resource together with its log streams
pub struct Resource {
  pub kind: ResourceKind,
  pub name: String,
  group: String,
  stream_names: Vec<String>,
  logs_client: aws_sdk_cloudwatchlogs::Client,
}

impl Resource {
  /// Resolve the resource behind the ARN
  ///
  /// Describes the resource first so a bad name or a session without access
  /// fails before any log lookups, then enumerates its log streams
  pub async fn from_arn(arn: &Arn, config: &SdkConfig) -> Result<Self> {
    let kind = ResourceKind::from_arn(arn)?;
    let name = arn.resource_id().to_string();

    let client = sagemaker::get_client(config).await?;
    sagemaker::ensure_exists(&client, kind, &name).await?;

    let logs_client = logs::get_client(config).await?;
    let group = kind.log_group_name(&name);
    let prefix = kind.log_stream_prefix(&name);
    let stream_names = logs::log_stream_names(&logs_client, &group, prefix.as_deref()).await?;

    Ok(Self {
      kind,
      name,
      group,
      stream_names,
      logs_client,
    })
  }

  pub fn log_streams(&self) -> Vec<LogStream> {
    self
      .stream_names
      .iter()
      .map(|name| LogStream::new(self.logs_client.clone(), &self.group, name))
      .collect()
  }

  pub fn log_filter(&self) -> LogFilter {
    LogFilter::new(
      self.logs_client.clone(),
      &self.group,
      self.stream_names.clone(),
    )
  }
}

#[cfg(test)]
mod tests {
  use rstest::*;

  use super::*;

  fn arn(resource: &str) -> Arn {
    format!("arn:aws:sagemaker:us-east-1:123456789012:{resource}")
      .parse()
      .unwrap()
  }

  #[rstest]
  #[case("training-job/my-job", ResourceKind::TrainingJob)]
  #[case("processing-job/my-job", ResourceKind::ProcessingJob)]
  #[case("transform-job/my-job", ResourceKind::TransformJob)]
  #[case("endpoint/my-endpoint", ResourceKind::Endpoint)]
  #[case("notebook-instance/my-notebook", ResourceKind::NotebookInstance)]
  #[case("hyper-parameter-tuning-job/my-hpo", ResourceKind::HyperParameterTuningJob)]
  fn it_parses_resource_kinds(#[case] resource: &str, #[case] expected: ResourceKind) {
    let kind = ResourceKind::from_arn(&arn(resource)).unwrap();
    assert_eq!(kind, expected);
  }

  #[test]
  fn it_rejects_unknown_resource_kinds() {
    assert!(ResourceKind::from_arn(&arn("model/my-model")).is_err());
  }

  #[rstest]
  #[case(ResourceKind::TrainingJob, "/aws/sagemaker/TrainingJobs")]
  #[case(ResourceKind::ProcessingJob, "/aws/sagemaker/ProcessingJobs")]
  #[case(ResourceKind::TransformJob, "/aws/sagemaker/TransformJobs")]
  #[case(ResourceKind::NotebookInstance, "/aws/sagemaker/NotebookInstances")]
  #[case(ResourceKind::HyperParameterTuningJob, "/aws/sagemaker/TrainingJobs")]
  #[case(ResourceKind::Endpoint, "/aws/sagemaker/Endpoints/my-name")]
  fn log_group_name_test(#[case] kind: ResourceKind, #[case] expected: &str) {
    assert_eq!(kind.log_group_name("my-name"), expected);
  }

  #[rstest]
  #[case(ResourceKind::TrainingJob, Some("my-name/"))]
  #[case(ResourceKind::HyperParameterTuningJob, Some("my-name"))]
  #[case(ResourceKind::Endpoint, None)]
  fn log_stream_prefix_test(#[case] kind: ResourceKind, #[case] expected: Option<&str>) {
    assert_eq!(kind.log_stream_prefix("my-name").as_deref(), expected);
  }
}
