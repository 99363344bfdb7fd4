use clap::Parser;
use jsonapi_deserializer::config::{toml_config::TomlConfig, RunSettings};
use jsonapi_deserializer::utils::{logger, validation::Validate};
use jsonapi_deserializer::{
    Built, CliConfig, Deserializer, JsonApiDocument, JsonApiError, JsonPropertiesMapper,
    LocalStorage, Storage,
};
use std::io::{Read, Write};

fn main() {
    let config = CliConfig::parse();

    // 載入 TOML 配置（如有）
    let file_config = match config.config.as_deref().map(TomlConfig::from_file).transpose() {
        Ok(file_config) => file_config,
        Err(e) => {
            eprintln!("❌ Failed to load config file: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };
    let settings = config.resolve(file_config.as_ref());

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(settings.log_level.as_deref());
    } else {
        logger::init_cli_logger(config.verbose, settings.log_level.as_deref());
    }
    tracing::debug!("CLI config: {:?}", config);

    // 驗證配置
    let validation = config
        .validate()
        .and_then(|_| file_config.as_ref().map_or(Ok(()), |file| file.validate()));
    if let Err(e) = validation {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    if let Err(e) = run(&config, &settings) {
        tracing::error!("❌ Deserialization failed: {} (Category: {:?})", e, e.category());
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

fn run(config: &CliConfig, settings: &RunSettings) -> Result<(), JsonApiError> {
    let storage = LocalStorage::default();

    let input = if config.input == "-" {
        let mut buffer = Vec::new();
        std::io::stdin().read_to_end(&mut buffer)?;
        buffer
    } else {
        storage.read_file(&config.input)?
    };

    let document = JsonApiDocument::from_slice(&input)?;
    tracing::info!(
        "Loaded document with {} included resources",
        document.included.len()
    );

    let mapper =
        JsonPropertiesMapper::with_relationship_names_prop(&settings.relationship_names_prop);
    let mut deserializer = Deserializer::new(mapper).with_cycle_policy(settings.cycle_policy);
    deserializer.load(document);

    let output = match deserializer.build()? {
        Built::Single(model) => model.unwrap_or(serde_json::Value::Null),
        Built::Collection(models) => serde_json::Value::Array(models),
    };

    let mut rendered = if settings.pretty {
        serde_json::to_vec_pretty(&output)?
    } else {
        serde_json::to_vec(&output)?
    };
    rendered.push(b'\n');

    match &config.output {
        Some(path) => {
            storage.write_file(path, &rendered)?;
            tracing::info!("✅ Models written to {}", path);
        }
        None => std::io::stdout().write_all(&rendered)?,
    }

    Ok(())
}
