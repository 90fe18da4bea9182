use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "cloudmask",
    version,
    about = "在把文本发送给 LLM 之前脱敏 AWS 基础设施标识，并在之后还原",
    long_about = "cloudmask 管理脱敏配置（公司名、自定义正则、种子），调用脱敏引擎完成 mask / unmask，并支持配置导入导出、批量备份与恢复、正则调试和逐行对比。"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Masking engine base URL (default: http://localhost:8000)
    #[arg(long, global = true, value_name = "URL")]
    pub engine_url: Option<String>,

    /// Directory holding saved configurations (default: ~/.cloudmask)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// 覆盖已有文件时不再询问
    #[arg(short = 'y', long, global = true, default_value_t = false)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Mask text using a saved configuration
    Mask(MaskArgs),
    /// Restore masked text using a mapping file
    Unmask(UnmaskArgs),
    /// Show a line-by-line comparison of two files
    Diff(DiffArgs),
    /// Regex tools
    #[command(subcommand)]
    Regex(RegexCommand),
    /// Manage saved configurations
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Check that the masking engine and the configuration store are reachable
    Health,
}

#[derive(clap::Args, Debug)]
pub struct MaskArgs {
    /// Input file (reads stdin when omitted)
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Saved configuration to mask with
    #[arg(short, long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Where to write the masked text (default: derived from the input name)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Where to write the mapping file (default: <stem>-mapping.json)
    #[arg(short, long, value_name = "FILE")]
    pub mapping: Option<PathBuf>,

    /// 同时打印逐行对比
    #[arg(long, default_value_t = false)]
    pub diff: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnmaskArgs {
    /// Masked input file (reads stdin when omitted)
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Mapping file produced by `mask`
    #[arg(short, long, value_name = "FILE")]
    pub mapping: Option<PathBuf>,

    /// Where to write the restored text
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// 同时打印逐行对比
    #[arg(long, default_value_t = false)]
    pub diff: bool,
}

#[derive(clap::Args, Debug)]
pub struct DiffArgs {
    /// Original text file
    pub original: PathBuf,

    /// Transformed text file
    pub transformed: PathBuf,

    /// Column width for each side
    #[arg(long, default_value_t = 60, value_name = "N")]
    pub width: usize,

    /// Only print changed rows
    #[arg(long, default_value_t = false)]
    pub changed_only: bool,
}

#[derive(Subcommand, Debug)]
pub enum RegexCommand {
    /// Test a pattern against sample text
    Test {
        /// Regular expression
        pattern: String,
        /// Sample text
        text: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// List saved configurations
    List,
    /// Print a saved configuration
    Show {
        name: String,
        /// Output format (json or yaml)
        #[arg(long, default_value = "json")]
        format: String,
    },
    /// Save a configuration from a JSON/YAML file under a name
    Save {
        name: String,
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },
    /// Delete a saved configuration
    Delete { name: String },
    /// Import a JSON/YAML configuration file
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Name to save under (default: file name without extension)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Export a saved configuration as JSON
    Export {
        name: String,
        /// Output path (default: cloudmask-config-<millis>.json)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Back up all saved configurations into a tar.gz archive
    Backup {
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Restore configurations from a backup archive
    Restore {
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,
    },
    /// Ask the engine to validate a saved configuration
    Validate { name: String },
    /// Add a company name to a saved configuration
    AddCompany { profile: String, company: String },
    /// Add a custom pattern to a saved configuration
    AddPattern {
        profile: String,
        name: String,
        regex: String,
        /// 添加前先用样例文本试跑
        #[arg(long, value_name = "TEXT")]
        sample: Option<String>,
    },
}
