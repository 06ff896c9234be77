use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// CSV metadata sheet exported from the recorder.
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    // optional rolling log file directory; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Extensions treated as recordings when scanning the input folder for
    /// files no row refers to. Examples: ["*.wav", "flac"]. Case-insensitive.
    #[serde(default = "default_file_extensions")]
    pub file_extensions: Vec<String>,
}

fn default_csv_path() -> PathBuf { "OsloWaveTankAuralHydrophone_2025-11-05.csv".into() }
fn default_input_dir() -> PathBuf { "input".into() }
fn default_output_dir() -> PathBuf { "output".into() }

fn default_file_extensions() -> Vec<String> {
    vec!["*.wav", "*.flac", "*.aif", "*.aiff"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            log_dir: None,
            file_extensions: default_file_extensions(),
        }
    }
}

impl Config {
    pub fn from_path(path: &std::path::Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg)
    }
}
