use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, Utc};
use clap::Parser;
use cloudmask::cli::args::{Cli, Command, ConfigCommand, DiffArgs, MaskArgs, RegexCommand, UnmaskArgs};
use cloudmask::codec::{self, ConfigFormat};
use cloudmask::config::Settings;
use cloudmask::diff;
use cloudmask::engine::{HttpMaskingEngine, MaskingEngine};
use cloudmask::harness::PatternTestHarness;
use cloudmask::infrastructure::error::{CloudMaskError, Result};
use cloudmask::infrastructure::{build_client, setup_logging};
use cloudmask::models::MaskingConfiguration;
use cloudmask::notification::{notify, Notification};
use cloudmask::orchestrator::{self, MaskingOrchestrator};
use cloudmask::profile::{BackupOutcome, ProfileEditor};
use cloudmask::storage::{ConfigurationStore, FileStorageProvider};

/// 运行期共享的组件
struct App {
    http: Arc<HttpMaskingEngine>,
    engine: Arc<dyn MaskingEngine>,
    store: ConfigurationStore,
    assume_yes: bool,
}

impl App {
    fn editor(&self) -> ProfileEditor {
        ProfileEditor::new(self.store.clone(), self.engine.clone())
    }
}

/// 目标文件已存在时询问是否覆盖；回答否视为用户取消
fn confirm_overwrite(path: &Path, assume_yes: bool) -> Result<()> {
    if assume_yes || !path.exists() {
        return Ok(());
    }

    eprint!("{} already exists. Overwrite? [y/N] ", path.display());
    io::stderr().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Ok(()),
        _ => Err(CloudMaskError::UserCancelled),
    }
}

async fn write_output(path: &Path, bytes: &[u8], assume_yes: bool) -> Result<()> {
    confirm_overwrite(path, assume_yes)?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| CloudMaskError::file_system(e.to_string(), Some(path.display().to_string())))
}

/// 读取输入：指定文件或标准输入
async fn read_input(path: Option<&PathBuf>) -> Result<(Option<String>, String)> {
    match path {
        Some(path) => {
            let file = orchestrator::read_input_file(path).await?;
            if let Some(warning) = file.large_file_warning() {
                eprintln!("{}", warning);
            }
            Ok((Some(file.name), file.text))
        }
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok((None, text))
        }
    }
}

async fn load_profile(app: &App, profile: Option<&str>) -> Result<MaskingConfiguration> {
    match profile {
        Some(name) => {
            let mut editor = app.editor();
            Ok(editor.load(name).await?.config)
        }
        None => Ok(MaskingConfiguration::default()),
    }
}

async fn handle_mask(app: &App, args: &MaskArgs) -> Result<Notification> {
    let config = load_profile(app, args.profile.as_deref()).await?;
    let (source, text) = read_input(args.input.as_ref()).await?;

    let orchestrator = MaskingOrchestrator::new(app.engine.clone());
    let outcome = orchestrator.mask(&text, &config).await?;

    let mapping_path = args
        .mapping
        .clone()
        .unwrap_or_else(|| PathBuf::from(orchestrator::mapping_file_name(source.as_deref())));
    confirm_overwrite(&mapping_path, app.assume_yes)?;
    orchestrator::export_mapping(&outcome.mapping, &mapping_path).await?;

    match args
        .output
        .clone()
        .or_else(|| source.as_deref().map(|name| PathBuf::from(orchestrator::masked_output_name(Some(name)))))
    {
        Some(path) => write_output(&path, outcome.result.transformed_text.as_bytes(), app.assume_yes).await?,
        None => println!("{}", outcome.result.transformed_text),
    }

    if args.diff {
        let rows = diff::diff(&text, &outcome.result.transformed_text);
        eprint!("{}", diff::render_side_by_side(&rows, 60));
    }

    Ok(Notification::masked(&outcome.result))
}

async fn handle_unmask(app: &App, args: &UnmaskArgs) -> Result<Notification> {
    let (source, text) = read_input(args.input.as_ref()).await?;
    let mapping = match &args.mapping {
        Some(path) => Some(orchestrator::load_mapping(path).await?),
        None => None,
    };

    let orchestrator = MaskingOrchestrator::new(app.engine.clone());
    let result = orchestrator.unmask(&text, mapping.as_ref()).await?;

    match args
        .output
        .clone()
        .or_else(|| source.as_deref().map(|name| PathBuf::from(orchestrator::unmasked_output_name(Some(name)))))
    {
        Some(path) => write_output(&path, result.transformed_text.as_bytes(), app.assume_yes).await?,
        None => println!("{}", result.transformed_text),
    }

    if args.diff {
        let rows = diff::diff(&text, &result.transformed_text);
        eprint!("{}", diff::render_side_by_side(&rows, 60));
    }

    Ok(Notification::unmasked(&result))
}

async fn handle_diff(args: &DiffArgs) -> Result<Notification> {
    let original = orchestrator::read_input_file(&args.original).await?;
    let transformed = orchestrator::read_input_file(&args.transformed).await?;

    let rows = diff::diff(&original.text, &transformed.text);
    let changed = diff::changed_count(&rows);
    let shown: Vec<_> = if args.changed_only {
        rows.iter().filter(|r| r.changed).cloned().collect()
    } else {
        rows.clone()
    };
    print!("{}", diff::render_side_by_side(&shown, args.width));

    Ok(Notification::info(format!(
        "{} of {} line(s) changed",
        changed,
        rows.len()
    )))
}

async fn handle_regex(app: &App, command: &RegexCommand) -> Result<Notification> {
    match command {
        RegexCommand::Test { pattern, text } => {
            let harness = PatternTestHarness::new(app.engine.clone());
            let result = harness.test(pattern, text).await?;
            for (i, m) in result.matches.iter().enumerate() {
                println!("{:>3}: {}", i + 1, m);
            }
            Ok(Notification::matches_found(&result))
        }
    }
}

async fn handle_config(app: &App, command: &ConfigCommand) -> Result<Notification> {
    let mut editor = app.editor();

    match command {
        ConfigCommand::List => {
            let summaries = editor.list().await?;
            for summary in &summaries {
                println!("{}\t{}", summary.name, summary.created_at.to_rfc3339());
            }
            Ok(Notification::info(format!("{} saved configuration(s)", summaries.len())))
        }
        ConfigCommand::Show { name, format } => {
            let entry = editor.load(name).await?;
            let format = match format.to_ascii_lowercase().as_str() {
                "yaml" | "yml" => ConfigFormat::Yaml,
                "json" => ConfigFormat::Json,
                other => {
                    return Err(CloudMaskError::UnsupportedFormat {
                        extension: format!(".{}", other),
                    })
                }
            };
            println!("{}", String::from_utf8_lossy(&editor.export(format)?));
            Ok(Notification::config_loaded(&entry.name))
        }
        ConfigCommand::Save { name, file } => {
            let format = ConfigFormat::from_path(file)?;
            let bytes = tokio::fs::read(file).await?;
            editor.set_config(format.decode(&bytes)?);
            let entry = editor.save_as(name).await?;
            Ok(Notification::config_saved(&entry.name))
        }
        ConfigCommand::Delete { name } => {
            editor.delete(name).await?;
            Ok(Notification::config_deleted(name))
        }
        ConfigCommand::Import { file, name } => {
            let bytes = tokio::fs::read(file).await?;
            let file_name = file.display().to_string();
            let imported = editor.import(&file_name, &bytes)?;
            let name = name.clone().unwrap_or(imported.suggested_name);
            let entry = editor.save_as(&name).await?;
            Ok(Notification::config_imported(&entry.name))
        }
        ConfigCommand::Export { name, output } => {
            editor.load(name).await?;
            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(codec::export_file_name(Utc::now())));
            write_output(&path, &editor.export(ConfigFormat::Json)?, app.assume_yes).await?;
            Ok(Notification::success(format!("Exported configuration to {}", path.display())))
        }
        ConfigCommand::Backup { output } => {
            let outcome = editor.backup().await?;
            if let BackupOutcome::Archive { bytes, .. } = &outcome {
                let path = output
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(codec::backup_file_name(Local::now().naive_local())));
                write_output(&path, bytes, app.assume_yes).await?;
            }
            Ok(outcome.notification())
        }
        ConfigCommand::Restore { archive } => {
            let bytes = tokio::fs::read(archive).await?;
            let restored = editor.restore(&bytes).await?;
            for name in &restored {
                println!("{}", name);
            }
            Ok(Notification::success(format!("Restored {} configuration(s)", restored.len())))
        }
        ConfigCommand::Validate { name } => {
            editor.load(name).await?;
            editor.validate().await?;
            Ok(Notification::success("Configuration is valid"))
        }
        ConfigCommand::AddCompany { profile, company } => {
            editor.load(profile).await?;
            if !editor.add_company_name(company) {
                return Err(CloudMaskError::validation("Company name is required", Some("company")));
            }
            editor.save_as(profile).await?;
            Ok(Notification::config_saved(profile))
        }
        ConfigCommand::AddPattern {
            profile,
            name,
            regex,
            sample,
        } => {
            editor.load(profile).await?;
            match sample {
                Some(sample) => {
                    let result = editor.add_custom_pattern_checked(name, regex, sample).await?;
                    eprintln!("{}", Notification::matches_found(&result));
                }
                None => editor.add_custom_pattern(name, regex)?,
            }
            editor.save_as(profile).await?;
            Ok(Notification::config_saved(profile))
        }
    }
}

async fn handle_health(app: &App) -> Result<Notification> {
    let health = app.http.health().await?;
    println!("engine\t{}\t{}\t{}", app.http.base_url(), health.status, health.version);

    let store_ok = app.store.health_check().await;
    println!(
        "store\t{:?}\t{}",
        app.store.storage_type(),
        if store_ok { "ok" } else { "unreadable" }
    );

    if store_ok {
        Ok(Notification::success(format!(
            "Engine is {} (version {})",
            health.status, health.version
        )))
    } else {
        Ok(Notification::warning("Saved configurations could not be read"))
    }
}

async fn run(cli: &Cli, settings: &Settings) -> Result<Notification> {
    let client = Arc::new(build_client(&settings.network_config())?);
    let http = Arc::new(HttpMaskingEngine::new(client, &settings.engine_url));
    let store = ConfigurationStore::new(Arc::new(FileStorageProvider::new(&settings.data_dir)));

    let app = App {
        engine: http.clone(),
        http,
        store,
        assume_yes: cli.yes,
    };

    match &cli.command {
        Command::Mask(args) => handle_mask(&app, args).await,
        Command::Unmask(args) => handle_unmask(&app, args).await,
        Command::Diff(args) => handle_diff(args).await,
        Command::Regex(command) => handle_regex(&app, command).await,
        Command::Config(command) => handle_config(&app, command).await,
        Command::Health => handle_health(&app).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::new();
    settings.update_from_args(&cli);
    settings.validate()?;
    setup_logging(settings.logging_config()?)?;

    tracing::debug!(engine_url = %settings.engine_url, data_dir = %settings.data_dir.display(), "Starting cloudmask");

    let result = run(&cli, &settings).await;
    // 每次操作恰好一条通知；取消时没有
    if let Some(notification) = notify(&result, Notification::clone) {
        eprintln!("{}", notification);
        if notification.is_error() {
            std::process::exit(1);
        }
    }

    Ok(())
}
