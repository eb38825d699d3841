use clap::Parser;
use dotenvy::dotenv;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::domain::archive::DEFAULT_MAX_DECOMPRESSED_BYTES;

#[derive(Parser, Debug)]
struct Cli {
    #[clap(long, env = "WEBCRAFT_PORT")]
    port: Option<u16>,

    #[clap(long, env = "WEBCRAFT_CONFIG_PATH")]
    config: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub debug: bool,
    pub frontend_origin: Option<String>,
    pub ai: AiSettings,
    pub upload: UploadSettings,
    pub tree: TreeSettings,
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AiSettings {
    #[serde(default = "default_ai_api_url")]
    pub api_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_ai_model")]
    pub model: String,
}

fn default_ai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UploadSettings {
    /// Cap on a single uploaded body.
    pub max_upload_bytes: u64,
    /// Cap on the decompressed size of an uploaded archive.
    pub max_decompressed_bytes: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TreeSettings {
    /// Top-level folder names treated as synthetic wrappers.
    pub wrapper_dirs: Vec<String>,
    /// Extension assumed for extensionless import specifiers.
    pub default_import_extension: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            port: default_port(),
            debug: false,
            frontend_origin: None,
            ai: AiSettings {
                api_url: default_ai_api_url(),
                api_key: None,
                model: default_ai_model(),
            },
            upload: UploadSettings {
                max_upload_bytes: 10 * 1024 * 1024,
                max_decompressed_bytes: DEFAULT_MAX_DECOMPRESSED_BYTES,
            },
            tree: TreeSettings {
                wrapper_dirs: ["project", "app", "main", "source"]
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
                default_import_extension: ".tsx".to_string(),
            },
        }
    }
}

impl Settings {
    #[allow(clippy::result_large_err)]
    pub fn new() -> Result<Self, figment::Error> {
        dotenv().ok();
        let cli = Cli::parse();

        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        // 1. System Config
        figment = figment.merge(Toml::file("/etc/webcraft/config.toml"));

        // 2. User Config
        if let Some(config_dir) = dirs::config_dir() {
            figment = figment.merge(Toml::file(config_dir.join("webcraft/config.toml")));
        }

        // 3. Local Config
        figment = figment.merge(Toml::file("webcraft.toml"));

        // 4. CLI Config File (Overrides previous files)
        if let Some(config_path) = &cli.config {
            figment = figment.merge(Toml::file(config_path));
        }

        // 5. Environment Variables
        // Prefixed with WEBCRAFT_ (e.g. WEBCRAFT_PORT=8080, WEBCRAFT_AI__MODEL=gpt-4o)
        figment = figment.merge(Env::prefixed("WEBCRAFT_").split("__"));

        // Support the standard OpenAI env vars
        figment = figment.merge(
            Env::raw()
                .only(&["OPENAI_API_KEY"])
                .map(|_| "ai.api_key".into()),
        );
        figment = figment.merge(
            Env::raw()
                .only(&["OPENAI_BASE_URL"])
                .map(|_| "ai.api_url".into()),
        );

        // 6. CLI Arguments (Overrides everything)
        if let Some(port) = cli.port {
            figment = figment.merge(("port", port));
        }

        figment.extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::default();
        assert_eq!(settings.port, 3000);
        assert!(!settings.debug);
        assert_eq!(settings.upload.max_decompressed_bytes, 50 * 1024 * 1024);
        assert!(settings.tree.wrapper_dirs.contains(&"project".to_string()));
        assert_eq!(settings.tree.default_import_extension, ".tsx");
    }
}
