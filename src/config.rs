//! Instellingen van de werkbank.
//!
//! Vervangt globale instellingen door een expliciete waarde die aan
//! aanmaakcommando's en de facade doorgegeven wordt.

use std::path::{Path, PathBuf};

use quick_xml::de::from_str;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use log::LevelFilter;

use crate::geom::{SAMPLE_INTERVALS, Sampling};

/// Fouten bij het lezen van de configuratie.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("XML parsefout in configuratie: {0}")]
    Xml(#[from] quick_xml::DeError),
    #[error("kan configuratie `{path}` niet lezen: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("discretisatie vraagt minstens 2 monsters, kreeg {0}")]
    Samples(u32),
}

/// `<config profiles_dir=".." default_profile="Default.dat" discretize_samples="101" verbose="true"/>`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename = "config")]
pub struct WorkbenchConfig {
    #[serde(rename = "@profiles_dir", default = "default_profiles_dir")]
    pub profiles_dir: String,
    #[serde(rename = "@default_profile", default = "default_profile")]
    pub default_profile: String,
    #[serde(rename = "@discretize_samples", default = "default_samples")]
    pub discretize_samples: u32,
    #[serde(rename = "@verbose", default)]
    pub verbose: bool,
}

fn default_profiles_dir() -> String {
    "Profiles".to_owned()
}

fn default_profile() -> String {
    "Default.dat".to_owned()
}

fn default_samples() -> u32 {
    SAMPLE_INTERVALS + 1
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            profiles_dir: default_profiles_dir(),
            default_profile: default_profile(),
            discretize_samples: default_samples(),
            verbose: false,
        }
    }
}

impl WorkbenchConfig {
    /// Leest een configuratie uit XML-tekst.
    pub fn from_xml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = from_str(input)?;
        if config.discretize_samples < 2 {
            return Err(ConfigError::Samples(config.discretize_samples));
        }
        log::debug!(
            "configuratie: profielen in `{}`, standaard `{}`",
            config.profiles_dir,
            config.default_profile
        );
        Ok(config)
    }

    /// Discretisatie van de randen volgens `discretize_samples`.
    #[must_use]
    pub fn sampling(&self) -> Sampling {
        Sampling::from_samples(self.discretize_samples).unwrap_or_default()
    }

    /// Logniveau: `verbose` laat ook debugregels door.
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// Leest een configuratiebestand.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_xml_str(&text)
    }

    /// Volledig pad naar het standaardprofiel.
    #[must_use]
    pub fn default_profile_path(&self) -> PathBuf {
        Path::new(&self.profiles_dir).join(&self.default_profile)
    }

    /// Pad naar een profielbestand; absolute paden blijven ongewijzigd.
    #[must_use]
    pub fn profile_path(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.profiles_dir).join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_all_attributes() {
        let config = WorkbenchConfig::from_xml_str(
            r#"<config profiles_dir="/data/profiles" default_profile="naca2412.dat" discretize_samples="51" verbose="true"/>"#,
        )
        .expect("configuratie");
        assert_eq!(config.profiles_dir, "/data/profiles");
        assert_eq!(config.default_profile, "naca2412.dat");
        assert_eq!(config.discretize_samples, 51);
        assert!(config.verbose);
        assert_eq!(
            config.default_profile_path(),
            PathBuf::from("/data/profiles/naca2412.dat")
        );
    }

    #[test]
    fn missing_attributes_use_defaults() {
        let config = WorkbenchConfig::from_xml_str("<config/>").expect("configuratie");
        assert_eq!(config, WorkbenchConfig::default());
        assert_eq!(config.discretize_samples, 101);
    }

    #[test]
    fn rejects_too_few_samples() {
        let err = WorkbenchConfig::from_xml_str(r#"<config discretize_samples="1"/>"#).unwrap_err();
        assert!(matches!(err, ConfigError::Samples(1)));
    }

    #[test]
    fn samples_and_verbosity_map_to_runtime_settings() {
        let config = WorkbenchConfig::from_xml_str(r#"<config discretize_samples="51" verbose="true"/>"#)
            .expect("configuratie");
        assert_eq!(config.sampling().intervals(), 50);
        assert_eq!(config.log_level(), LevelFilter::Debug);

        let quiet = WorkbenchConfig::default();
        assert_eq!(quiet.sampling(), Sampling::DEFAULT);
        assert_eq!(quiet.log_level(), LevelFilter::Info);
    }

    #[test]
    fn absolute_profile_path_is_kept() {
        let config = WorkbenchConfig::default();
        assert_eq!(config.profile_path("/tmp/a.dat"), PathBuf::from("/tmp/a.dat"));
        assert_eq!(config.profile_path("a.dat"), PathBuf::from("Profiles/a.dat"));
    }
}
