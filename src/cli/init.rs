//! Init command implementation
//!
//! Writes a starter `patlaw.toml`, `.env.example` and `data/` directory.

use super::output::Output;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    Success,
    /// patlaw.toml exists and --force was not given
    AlreadyExists,
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    pub host: String,
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing patlaw");

    let base_path = &config.path;
    let config_path = base_path.join("patlaw.toml");
    if config_path.exists() && !config.force {
        output.warning("patlaw.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    let data_dir = base_path.join("data");
    if let Err(e) = fs::create_dir_all(&data_dir) {
        output.error(&format!("Failed to create data/: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("directory", "data");

    let files = [
        ("config", "patlaw.toml", generate_patlaw_toml(&config)),
        ("env", ".env.example", generate_env_example()),
    ];

    for (kind, name, content) in &files {
        let path = base_path.join(name);
        match write_file(&path, content, config.force) {
            Ok(true) => output.created(kind, name),
            Ok(false) => output.skipped(name, "already exists"),
            Err(e) => {
                output.error(&format!("Failed to create {}: {}", name, e));
                return InitResult::Error(e.to_string());
            }
        }
    }

    output.header("Next Steps");
    output.info("1. Set the API keys:");
    output.command("cp .env.example .env");
    output.info("2. Check the configuration:");
    output.command("patlaw-server config --validate");
    output.info("3. Start the server:");
    output.command("patlaw-server");
    output.hint(&format!(
        "Server will be available at http://{}:{}",
        config.host, config.port
    ));

    InitResult::Success
}

/// Returns whether the file was written
fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    fs::write(path, content)?;
    Ok(true)
}

fn generate_patlaw_toml(config: &InitConfig) -> String {
    format!(
        r#"# patlaw configuration
# Secrets are never stored here: each *_env key names the environment
# variable that holds the value (see .env.example).

[server]
host = "{host}"
port = {port}
log_level = "info"
log_format = "text"     # "text" or "json"
max_page_size = 1000
request_timeout_secs = 60

[database]
url = "./data/patlaw.db"
# turso_url_env = "TURSO_DATABASE_URL"
# turso_token_env = "TURSO_AUTH_TOKEN"

[chat]
api_key_env = "COHERE_API_KEY"
api_base = "https://api.cohere.ai/v1"
model = "command-r-plus"

[search]
url = "http://localhost:8088"
# api_key_env = "WEAVIATE_API_KEY"
forward_chat_key = true

[tools.eplaw]
enabled = true
collection = "EPO_LEGAL_DOCS"
search_limit = 5
top_k = 5
rerank_property = "text"

[tools.patent_claims]
enabled = true
token_url = "https://ops.epo.org/3.2/auth/accesstoken"
api_base = "https://ops.epo.org/3.2/rest-services"
client_id_env = "PATENT_CLIENT_EPO_API_KEY"
client_secret_env = "PATENT_CLIENT_EPO_SECRET"
"#,
        host = config.host,
        port = config.port
    )
}

fn generate_env_example() -> String {
    r#"# Cohere chat API (query expansion, search-query extraction, Weaviate rerank)
COHERE_API_KEY=

# EPO Open Patent Services OAuth2 client credentials
PATENT_CLIENT_EPO_API_KEY=
PATENT_CLIENT_EPO_SECRET=

# RUST_LOG overrides server.log_level
# RUST_LOG=patlaw=debug,tower_http=debug
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use patlaw::PatlawConfig;
    use tempfile::TempDir;

    fn init_config(temp_dir: &TempDir, force: bool) -> InitConfig {
        InitConfig {
            path: temp_dir.path().to_path_buf(),
            force,
            host: "0.0.0.0".to_string(),
            port: 9000,
        }
    }

    #[test]
    fn test_generated_toml_parses() {
        let temp_dir = TempDir::new().unwrap();
        let toml_content = generate_patlaw_toml(&init_config(&temp_dir, false));

        let parsed: PatlawConfig = toml::from_str(&toml_content).unwrap();
        assert_eq!(parsed.server.host, "0.0.0.0");
        assert_eq!(parsed.server.port, 9000);
        assert_eq!(parsed.tools.eplaw.collection, "EPO_LEGAL_DOCS");
    }

    #[test]
    fn test_run_creates_files() {
        let temp_dir = TempDir::new().unwrap();
        let result = run(init_config(&temp_dir, false), &Output::no_color());

        assert_eq!(result, InitResult::Success);
        assert!(temp_dir.path().join("patlaw.toml").exists());
        assert!(temp_dir.path().join(".env.example").exists());
        assert!(temp_dir.path().join("data").is_dir());
    }

    #[test]
    fn test_run_already_exists_without_force() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("patlaw.toml"), "# mine").unwrap();

        let result = run(init_config(&temp_dir, false), &Output::no_color());
        assert_eq!(result, InitResult::AlreadyExists);

        let content = fs::read_to_string(temp_dir.path().join("patlaw.toml")).unwrap();
        assert_eq!(content, "# mine");
    }

    #[test]
    fn test_run_force_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("patlaw.toml"), "# mine").unwrap();

        let result = run(init_config(&temp_dir, true), &Output::no_color());
        assert_eq!(result, InitResult::Success);

        let content = fs::read_to_string(temp_dir.path().join("patlaw.toml")).unwrap();
        assert!(content.contains("[tools.patent_claims]"));
    }

    #[test]
    fn test_write_file_skips_existing_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("f.txt");
        assert!(write_file(&path, "one", false).unwrap());
        assert!(!write_file(&path, "two", false).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "one");
    }
}
