use std::{
  collections::{BTreeMap, HashMap},
  fs,
  path::{Path, PathBuf},
};

use anyhow::{bail, Result};
use aws_config::SdkConfig;
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::{arn::Arn, get_sdk_config, resource::ResourceKind, s3, sagemaker};

/// Channel entry written to `inputdataconfig.json`
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ChannelConfig {
  content_type: &'static str,
}

/// Input arguments for the `scaffold` command
#[derive(Args, Debug)]
pub struct Scaffold {
  /// Training job ARN to scaffold from
  ///
  /// Without an ARN an empty scaffold with `train` and `test` channels
  /// is generated
  #[arg(long)]
  arn: Option<Arn>,

  /// Directory to generate the scaffold into
  destination: PathBuf,
}

impl Scaffold {
  pub async fn run(&self) -> Result<()> {
    // The session is resolved once and shared by the describe and download calls
    let config = match &self.arn {
      Some(arn) => Some(get_sdk_config(arn).await?),
      None => None,
    };

    let (hyperparameters, channels) = match (&self.arn, &config) {
      (Some(arn), Some(config)) => self.from_training_job(arn, config).await?,
      _ => (
        HashMap::new(),
        BTreeMap::from([("train".to_string(), None), ("test".to_string(), None)]),
      ),
    };

    make_config(&self.destination, &hyperparameters, &channels)?;
    self.download_data(&channels, config.as_ref()).await
  }

  /// Pull hyperparameters and data channels from the training job description
  async fn from_training_job(
    &self,
    arn: &Arn,
    config: &SdkConfig,
  ) -> Result<(HashMap<String, String>, BTreeMap<String, Option<String>>)> {
    if ResourceKind::from_arn(arn)? != ResourceKind::TrainingJob {
      bail!("`{arn}` is not a training job ARN");
    }

    let client = sagemaker::get_client(config).await?;
    let description = sagemaker::describe_training_job(&client, arn.resource_id()).await?;

    let hyperparameters = description.hyper_parameters.unwrap_or_default();
    let channels = description
      .input_data_config
      .unwrap_or_default()
      .into_iter()
      .map(|channel| {
        let uri = channel
          .data_source
          .and_then(|ds| ds.s3_data_source)
          .and_then(|s3| s3.s3_uri);
        (channel.channel_name.unwrap_or_default(), uri)
      })
      .collect();

    Ok((hyperparameters, channels))
  }

  /// Download each channel's S3 prefix into `input/data/<channel>/`
  async fn download_data(
    &self,
    channels: &BTreeMap<String, Option<String>>,
    config: Option<&SdkConfig>,
  ) -> Result<()> {
    let data = self.destination.join("input").join("data");

    let mut client = None;
    for (channel_name, s3_uri) in channels {
      let channel_path = data.join(channel_name);
      fs::create_dir_all(&channel_path)?;

      if let (Some(config), Some(uri)) = (config, s3_uri) {
        if client.is_none() {
          client = Some(s3::get_client(config).await?);
        }
        if let Some(client) = &client {
          info!("Downloading channel {channel_name} from {uri}");
          s3::download_prefix(client, uri, &channel_path).await?;
        }
      }
    }

    Ok(())
  }
}

/// Write `hyperparameters.json` and `inputdataconfig.json` under `input/config/`
fn make_config(
  destination: &Path,
  hyperparameters: &HashMap<String, String>,
  channels: &BTreeMap<String, Option<String>>,
) -> Result<()> {
  let config = destination.join("input").join("config");
  fs::create_dir_all(&config)?;

  fs::write(
    config.join("hyperparameters.json"),
    serde_json::to_string_pretty(hyperparameters)?,
  )?;

  let input_data_config: BTreeMap<&str, ChannelConfig> = channels
    .keys()
    .map(|channel| (channel.as_str(), ChannelConfig { content_type: "auto" }))
    .collect();
  fs::write(
    config.join("inputdataconfig.json"),
    serde_json::to_string_pretty(&input_data_config)?,
  )?;

  Ok(())
}
