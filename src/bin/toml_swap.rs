use clap::Parser;
use irs_demo::config::toml_config::TomlConfig;
use irs_demo::core::ConfigProvider;
use irs_demo::utils::{logger, validation::Validate};
use irs_demo::{LocalStorage, SwapEngine, SwapPipeline};

#[derive(Parser)]
#[command(name = "toml-swap")]
#[command(about = "Interest rate swap cash flows driven by a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "irs-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the contract start date (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<chrono::NaiveDate>,

    /// Show what would be computed without reading rates or writing output
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        let level = if args.verbose {
            Some("debug")
        } else {
            config.log_level()
        };
        logger::init_json_logger(level);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based swap run");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(start_date) = args.start_date {
        config.contract.start_date = Some(start_date);
        tracing::info!("🔧 Start date overridden to: {}", start_date);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let input = LocalStorage::new(".");
    let output = LocalStorage::new(config.output_path().to_string());
    let pipeline = SwapPipeline::new(input, output, config);
    let engine = SwapEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Swap run completed successfully!");
            println!("✅ Swap run completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Swap run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name,
        config.pipeline.version.as_deref().unwrap_or("0")
    );
    println!("  Rates: {}", config.rates_source());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Rate Source:");
    println!("  Location: {}", config.rates_source());
    if let Some(timeout) = config.request_timeout_seconds() {
        println!("  Timeout: {}s", timeout);
    }
    if let Some(headers) = config.request_headers() {
        println!("  Headers: {} custom headers", headers.len());
    }

    println!();
    println!("📝 Contract:");
    match config.start_date() {
        Some(date) => println!("  Start: {}", date),
        None => println!("  Start: default quarter for the data set"),
    }
    println!("  Tenure: {} years", config.tenure_years());
    println!("  Notional: £{:.0}", config.notional());
    println!("  Fixed rate: {:.2}%", config.fixed_rate());
    println!("  Floating: GBP LIBOR 3M + {:.2}%", config.spread());

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    if let Some(archive) = config.archive_name() {
        println!("  Compression: {} (ZIP)", archive);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
