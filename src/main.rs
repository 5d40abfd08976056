use clap::Parser;
use irs_demo::core::{rates, Pipeline};
use irs_demo::utils::{logger, validation::Validate};
use irs_demo::{CliConfig, LocalStorage, SwapEngine, SwapError, SwapPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting irs-demo CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let list_only = config.list_start_dates;
    let input = LocalStorage::new(".");
    let output = LocalStorage::new(config.output_path.clone());
    let pipeline = SwapPipeline::new(input, output, config);

    if list_only {
        if let Err(e) = list_start_dates(&pipeline).await {
            fail(e);
        }
        return Ok(());
    }

    let engine = SwapEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Swap cash flows computed successfully!");
            println!("✅ Swap cash flows computed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => fail(e),
    }

    Ok(())
}

async fn list_start_dates(
    pipeline: &SwapPipeline<LocalStorage, CliConfig>,
) -> Result<(), SwapError> {
    let observations = pipeline.extract().await?;
    let quarterly = rates::resample_quarterly(&observations);
    let selectable = rates::selectable_start_dates(&quarterly);
    let default = rates::default_start_date(&selectable);

    println!("📅 Selectable start dates ({}):", selectable.len());
    for date in &selectable {
        let marker = if Some(*date) == default {
            "  (default)"
        } else {
            ""
        };
        println!("  {}{}", date, marker);
    }

    Ok(())
}

fn fail(e: SwapError) -> ! {
    // 記錄詳細錯誤信息
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
