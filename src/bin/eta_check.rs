use clap::Parser;
use shipcheck::output::console::render_eta_report;
use shipcheck::utils::{logger, validation::Validate};
use shipcheck::{CheckEngine, CheckError, EtaCheckConfig, EtaCheckPipeline, EtaSettings, EtaSources, LocalStorage};

fn run(config: EtaCheckConfig) -> shipcheck::Result<()> {
    config.validate()?;
    tracing::debug!("CLI config: {:?}", config);

    let settings = EtaSettings {
        tolerance_days: config.tolerance_days,
        accept_eta_dates: config.accept_eta_dates,
    };
    let sources = EtaSources {
        erp: config.erp.clone(),
        import_doc: config.import_doc.clone(),
    };
    let dry_run = config.dry_run;
    let monitor_enabled = config.monitor;
    let storage = LocalStorage::for_config(&config);
    let pipeline = EtaCheckPipeline::new(storage, config, settings, sources);
    let mut engine = CheckEngine::new_with_monitoring(pipeline, monitor_enabled);

    if dry_run {
        let input = engine.preview()?;
        println!("🧪 Dry run, nothing written");
        println!("ERP rows with a PO: {}", input.erp.len());
        println!(
            "Import doc PO entries: {} from sheets [{}]",
            input.import.len(),
            input.import_sheets_used.join(", ")
        );
        println!("Tolerance: ±{} days", settings.tolerance_days);
        return Ok(());
    }

    let outcome = engine.run()?;
    println!("{}", render_eta_report(&outcome.output));
    for location in &outcome.written {
        println!("📁 {}", location);
    }
    Ok(())
}

fn report_failure(e: &CheckError) {
    tracing::error!(
        "❌ ETA check failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
}

fn main() {
    let config = EtaCheckConfig::parse();
    logger::init_cli_logger(config.verbose, config.log_json);

    tracing::info!("Starting eta-check");

    if let Err(e) = run(config) {
        report_failure(&e);
        std::process::exit(e.exit_code());
    }
}
