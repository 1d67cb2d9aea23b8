use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use gphoto_renamer_core::{app_paths, load_config, run, save_config, AppConfig, RunOptions, RunReport};

#[derive(Debug, Parser)]
#[command(name = "gphoto-renamer-cli")]
#[command(about = "フォトバックアップのエクスポートを撮影日時ベースの名前へ一括リネームします")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Rename(RenameArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
    Init,
}

#[derive(Debug, Args)]
struct RenameArgs {
    #[arg(long)]
    target: String,
    #[arg(long, default_value_t = false)]
    dryrun: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Rename(args) => cmd_rename(args),
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
            ConfigAction::Init => cmd_config_init(),
        },
    }
}

fn cmd_rename(args: RenameArgs) -> Result<()> {
    let target = args.target.trim();
    if target.is_empty() {
        anyhow::bail!("--target が空です");
    }

    let config = load_config()?;
    let dryrun = args.dryrun || config.dryrun_default;

    let options = RunOptions {
        target: target.into(),
        dryrun,
    };
    let report = run(&options)?;

    match args.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            print_report(&report, dryrun);
        }
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let config = AppConfig::default();
    save_config(&config)?;
    let paths = app_paths()?;
    println!("既定の設定を書き込みました: {}", paths.config_path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("設定ファイル: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn print_report(report: &RunReport, dryrun: bool) {
    if dryrun {
        println!("dryrunモード: 実ファイルは変更していません。");
    }
    println!("# サイドカー複製: {}", report.sidecar_copies);

    println!("# リネーム済み拡張子");
    for (ext, count) in &report.renamed_by_ext {
        println!("  - {}: {}", display_ext(ext), count);
    }

    println!("# リネーム不可拡張子");
    for (ext, count) in &report.unrenamed_by_ext {
        println!("  - {}: {}", display_ext(ext), count);
    }
}

fn display_ext(ext: &str) -> &str {
    if ext.is_empty() {
        "(拡張子なし)"
    } else {
        ext
    }
}
