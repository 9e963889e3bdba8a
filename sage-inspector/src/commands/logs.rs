use anyhow::Result;
use clap::{Args, Subcommand};

use crate::{arn::Arn, get_sdk_config, resource::Resource};

#[derive(Debug, Subcommand)]
pub enum LogsCommands {
  /// Print the first events of each log stream
  Head(Head),

  /// Print the last events of each log stream
  Tail(Tail),

  /// Print all events of each log stream
  Cat(Cat),

  /// Filter events across all log streams of the resource
  Filter(Filter),
}

impl LogsCommands {
  pub async fn run(&self) -> Result<()> {
    match self {
      Self::Head(head) => head.run().await,
      Self::Tail(tail) => tail.run().await,
      Self::Cat(cat) => cat.run().await,
      Self::Filter(filter) => filter.run().await,
    }
  }
}

/// Resolve the ARN into a resource using the matching credential profile
async fn resolve(arn: &Arn) -> Result<Resource> {
  let config = get_sdk_config(arn).await?;
  Resource::from_arn(arn, &config).await
}

/// Stream names go to stderr so stdout stays pipeable
fn print_stream_header(name: &str) {
  let style = anstyle::Style::new()
    .bold()
    .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Blue)));
  eprintln!("{style}{name}{style:#}");
}

#[derive(Args, Debug)]
pub struct Head {
  /// Resource ARN
  arn: Arn,

  /// Number of events to print per stream
  #[arg(short, default_value_t = 10)]
  n: i32,
}

impl Head {
  pub async fn run(&self) -> Result<()> {
    let resource = resolve(&self.arn).await?;

    for stream in resource.log_streams() {
      print_stream_header(&stream.stream_name);
      for line in stream.head(self.n).await? {
        println!("{line}");
      }
      println!();
    }

    Ok(())
  }
}

#[derive(Args, Debug)]
pub struct Tail {
  /// Resource ARN
  arn: Arn,

  /// Number of events to print per stream
  #[arg(short, default_value_t = 10)]
  n: i32,

  /// Keep polling for new events
  #[arg(short, long)]
  follow: bool,

  /// Seconds to wait between polls
  #[arg(short, long, default_value_t = 10)]
  interval: u64,
}

impl Tail {
  pub async fn run(&self) -> Result<()> {
    let resource = resolve(&self.arn).await?;

    for stream in resource.log_streams() {
      print_stream_header(&stream.stream_name);
      if self.follow {
        stream.follow(false, Some(self.n), self.interval).await?;
      } else {
        for line in stream.tail(self.n).await? {
          println!("{line}");
        }
      }
      println!();
    }

    Ok(())
  }
}

#[derive(Args, Debug)]
pub struct Cat {
  /// Resource ARN
  arn: Arn,

  /// Keep polling for new events
  #[arg(short, long)]
  follow: bool,

  /// Seconds to wait between polls
  #[arg(short, long, default_value_t = 10)]
  interval: u64,
}

impl Cat {
  pub async fn run(&self) -> Result<()> {
    let resource = resolve(&self.arn).await?;

    for stream in resource.log_streams() {
      print_stream_header(&stream.stream_name);
      if self.follow {
        stream.follow(true, None, self.interval).await?;
      } else {
        stream.cat().await?;
      }
      println!();
    }

    Ok(())
  }
}

#[derive(Args, Debug)]
pub struct Filter {
  /// Resource ARN
  arn: Arn,

  /// CloudWatch filter pattern
  #[arg(short, long)]
  expression: String,
}

impl Filter {
  pub async fn run(&self) -> Result<()> {
    let resource = resolve(&self.arn).await?;

    for (stream_name, messages) in resource.log_filter().filter(&self.expression).await? {
      print_stream_header(&stream_name);
      for message in messages {
        println!("{message}");
      }
      println!();
    }

    Ok(())
  }
}
