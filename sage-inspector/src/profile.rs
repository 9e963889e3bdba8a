use std::{
  collections::HashMap,
  env, fs,
  path::{Path, PathBuf},
};

use anyhow::Result;
use regex_lite::Regex;

/// Location of the shared AWS config file
///
/// Honors `AWS_CONFIG_FILE` the same way the SDKs do, falling back to
/// `~/.aws/config`
pub fn config_file_path() -> PathBuf {
  match env::var_os("AWS_CONFIG_FILE") {
    Some(path) => PathBuf::from(path),
    None => env::var_os("HOME")
      .map(PathBuf::from)
      .unwrap_or_default()
      .join(".aws")
      .join("config"),
  }
}

/// A single `[default]` or `[profile <name>]` section of the config file
#[derive(Debug)]
pub struct Profile {
  pub name: String,
  /// Attribute key/value pairs in file order
  pub settings: Vec<(String, String)>,
}

impl Profile {
  /// First 12-digit account id referenced by any attribute of this profile
  fn account_id(&self, pattern: &Regex) -> Option<&str> {
    self
      .settings
      .iter()
      .find_map(|(_, value)| pattern.find(value).map(|m| m.as_str()))
  }
}

/// Profiles declared in the shared AWS config file, indexed by account id
///
/// The scan is intentionally minimal: only section headers and `key = value`
/// lines are recognized, everything else is skipped. A missing config file
/// yields an empty set so callers fall back to the default credential chain.
#[derive(Debug, Default)]
pub struct ProfileSet {
  pub profiles: Vec<Profile>,
  accounts: HashMap<String, String>,
}

impl ProfileSet {
  pub fn read() -> Result<Self> {
    Self::read_from(&config_file_path())
  }

  pub fn read_from(path: &Path) -> Result<Self> {
    if !path.is_file() {
      return Ok(Self::default());
    }

    Self::parse(&fs::read_to_string(path)?)
  }

  pub fn parse(contents: &str) -> Result<Self> {
    let mut profiles: Vec<Profile> = Vec::new();
    let mut current: Option<Profile> = None;

    for line in contents.lines() {
      let line = line.trim();
      if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
        continue;
      }

      if let Some(header) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        if let Some(profile) = current.take() {
          profiles.push(profile);
        }

        let header = header.trim();
        let name = match header {
          "default" => Some(header.to_string()),
          _ => header.strip_prefix("profile ").map(|name| name.trim().to_string()),
        };

        // Sections other than `default`/`profile <name>` (e.g. sso-session) are skipped
        current = name.map(|name| Profile {
          name,
          settings: Vec::new(),
        });
        continue;
      }

      if let (Some(profile), Some((key, value))) = (current.as_mut(), line.split_once('=')) {
        profile.settings.push((key.trim().to_string(), value.trim().to_string()));
      }
    }

    if let Some(profile) = current.take() {
      profiles.push(profile);
    }

    let pattern = Regex::new(r"\b(\d{12})\b")?;
    let mut accounts = HashMap::new();
    for profile in &profiles {
      if let Some(account) = profile.account_id(&pattern) {
        // First profile referencing an account wins
        accounts
          .entry(account.to_string())
          .or_insert_with(|| profile.name.clone());
      }
    }

    Ok(Self { profiles, accounts })
  }

  /// Name of the first profile whose attributes reference the account id
  pub fn profile_for_account(&self, account: &str) -> Option<&str> {
    self.accounts.get(account).map(String::as_str)
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  const CONFIG: &str = r#"
# comment
[default]
region = us-east-1

[profile experiments]
role_arn = arn:aws:iam::123456789012:role/engineer
source_profile = default

[profile experiments-admin]
role_arn = arn:aws:iam::123456789012:role/admin

[profile prod]
sso_account_id = 210987654321
region = eu-west-1

[sso-session corp]
sso_start_url = https://corp.awsapps.com/start
"#;

  #[test]
  fn it_parses_profiles_in_order() {
    let profiles = ProfileSet::parse(CONFIG).unwrap();
    let names: Vec<&str> = profiles.profiles.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["default", "experiments", "experiments-admin", "prod"]);
  }

  #[test]
  fn first_profile_wins_for_an_account() {
    let profiles = ProfileSet::parse(CONFIG).unwrap();
    assert_eq!(profiles.profile_for_account("123456789012"), Some("experiments"));
    assert_eq!(profiles.profile_for_account("210987654321"), Some("prod"));
  }

  #[test]
  fn unknown_account_has_no_profile() {
    let profiles = ProfileSet::parse(CONFIG).unwrap();
    assert_eq!(profiles.profile_for_account("999999999999"), None);
  }

  #[test]
  fn missing_file_yields_empty_set() {
    let dir = tempfile::tempdir().unwrap();
    let profiles = ProfileSet::read_from(&dir.path().join("config")).unwrap();
    assert!(profiles.profiles.is_empty());
    assert_eq!(profiles.profile_for_account("123456789012"), None);
  }

  #[test]
  fn it_reads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();

    let profiles = ProfileSet::read_from(file.path()).unwrap();
    assert_eq!(profiles.profile_for_account("210987654321"), Some("prod"));
  }
}
