use anyhow::Result;
use aws_config::SdkConfig;
use aws_sdk_sagemaker::{
  config::{self, retry::RetryConfig},
  operation::describe_training_job::DescribeTrainingJobOutput,
  Client,
};
use tracing::debug;

use crate::resource::ResourceKind;

/// Get the SageMaker client
pub async fn get_client(config: &SdkConfig) -> Result<Client> {
  let client = Client::from_conf(
    // Start with the shared environment configuration
    config::Builder::from(config)
      // Set max attempts
      .retry_config(RetryConfig::standard().with_max_attempts(3))
      .build(),
  );
  Ok(client)
}

/// Describe the resource to confirm it exists and the session can see it
pub async fn ensure_exists(client: &Client, kind: ResourceKind, name: &str) -> Result<()> {
  match kind {
    ResourceKind::Endpoint => {
      client.describe_endpoint().endpoint_name(name).send().await?;
    }
    ResourceKind::NotebookInstance => {
      client
        .describe_notebook_instance()
        .notebook_instance_name(name)
        .send()
        .await?;
    }
    ResourceKind::TrainingJob => {
      client
        .describe_training_job()
        .training_job_name(name)
        .send()
        .await?;
    }
    ResourceKind::ProcessingJob => {
      client
        .describe_processing_job()
        .processing_job_name(name)
        .send()
        .await?;
    }
    ResourceKind::TransformJob => {
      client
        .describe_transform_job()
        .transform_job_name(name)
        .send()
        .await?;
    }
    ResourceKind::HyperParameterTuningJob => {
      client
        .describe_hyper_parameter_tuning_job()
        .hyper_parameter_tuning_job_name(name)
        .send()
        .await?;
    }
  }

  debug!("Described {} {name}", kind.kind_name());
  Ok(())
}

/// Get the full description of a training job
pub async fn describe_training_job(client: &Client, name: &str) -> Result<DescribeTrainingJobOutput> {
  let response = client
    .describe_training_job()
    .training_job_name(name)
    .send()
    .await?;

  Ok(response)
}
