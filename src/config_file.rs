//! Config file listing the analyses to run, in JSON5, YAML or HCL
//! format (chosen by file name extension).

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use cj_path_util::unix::polyfill::add_extension;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    chart::MetricSelection, info, metrics::EfficiencyMode, preset::Preset, sample::Schema,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigBackend {
    Json5,
    Yaml,
    Hcl,
}

impl ConfigBackend {
    pub fn parse_str<T: DeserializeOwned>(self, s: &str) -> Result<T> {
        match self {
            ConfigBackend::Json5 => serde_json5::from_str(s).context("decoding JSON5"),
            ConfigBackend::Yaml => serde_yml::from_str(s).context("decoding YAML"),
            ConfigBackend::Hcl => hcl::from_str(s).context("decoding HCL"),
        }
    }

    pub fn load_config_file<T: DeserializeOwned>(self, path: &Path) -> Result<T> {
        let s = std::fs::read_to_string(path)
            .with_context(|| anyhow!("loading config file from {path:?}"))?;
        self.parse_str(&s)
            .with_context(|| anyhow!("config file {path:?}"))
    }
}

pub const FILE_EXTENSIONS: &[(&str, ConfigBackend)] = &[
    ("json5", ConfigBackend::Json5),
    ("json", ConfigBackend::Json5),
    ("yml", ConfigBackend::Yaml),
    ("yaml", ConfigBackend::Yaml),
    ("hcl", ConfigBackend::Hcl),
];

pub fn backend_from_path(path: &Path) -> Result<ConfigBackend> {
    let Some(ext) = path.extension() else {
        bail!(
            "given file path does not have an extension \
             for determining the file type: {path:?}"
        )
    };
    let Some(ext) = ext.to_str() else {
        bail!("given file path does have an extension that is not unicode: {path:?}")
    };
    match FILE_EXTENSIONS.iter().find(|(e, _)| *e == ext) {
        Some((_, backend)) => Ok(*backend),
        None => bail!("given file path does have an unknown extension {ext:?}: {path:?}"),
    }
}

pub trait LoadConfigFile: DeserializeOwned {
    /// One of the `FILE_EXTENSIONS` is appended to look for the file.
    fn default_config_path_without_suffix() -> Result<Option<PathBuf>>;

    /// If `path` is given, the file must exist or an error is
    /// returned. Otherwise the default location is checked with all
    /// known extensions; exactly one file must exist there.
    fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        if let Some(path) = path {
            let path = path.as_ref();
            return backend_from_path(path)?.load_config_file(path);
        }
        let Some(base) = Self::default_config_path_without_suffix()? else {
            bail!("no config file path was given and there is no default location")
        };
        let mut found = Vec::new();
        for (extension, backend) in FILE_EXTENSIONS {
            let path = add_extension(&base, extension)
                .ok_or_else(|| anyhow!("path is missing a file name: {base:?}"))?;
            if path.exists() {
                found.push((path, *backend));
            }
        }
        match &found[..] {
            [] => {
                let extensions: Vec<&str> = FILE_EXTENSIONS.iter().map(|(e, _)| *e).collect();
                bail!(
                    "no config file path was given, and none found at {base:?} \
                     with any of the extensions {extensions:?}"
                )
            }
            [(path, backend)] => {
                info!("using config file {path:?}");
                backend.load_config_file(path)
            }
            _ => {
                let paths: Vec<_> = found.iter().map(|(path, _)| path).collect();
                bail!("multiple config file paths found, leading to ambiguity: {paths:?}")
            }
        }
    }
}

/// One analysis: which file to read, how to interpret it, and where
/// to write the results. Fields left out are taken from `preset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisSpec {
    pub input: PathBuf,
    #[serde(default)]
    pub preset: Option<Preset>,
    #[serde(default)]
    pub schema: Option<Schema>,
    #[serde(default)]
    pub mode: Option<EfficiencyMode>,
    #[serde(default)]
    pub metrics: Option<MetricSelection>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub x_label: Option<String>,
    #[serde(default)]
    pub y_range: Option<(f64, f64)>,
    #[serde(default)]
    pub ideal_lines: Option<bool>,
    /// Path of the SVG chart to write
    #[serde(default)]
    pub svg: Option<PathBuf>,
    /// Path of an Excel file to write the derived values to
    #[serde(default)]
    pub excel: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    pub analyses: Vec<AnalysisSpec>,
}

impl LoadConfigFile for AnalysisConfig {
    fn default_config_path_without_suffix() -> Result<Option<PathBuf>> {
        Ok(std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".scalability-plot")))
    }
}
