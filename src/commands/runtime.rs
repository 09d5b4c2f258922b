use crate::*;

fn sign_settings(cli: &Cli, force_overwrite: bool, jobs: Option<usize>) -> anyhow::Result<Settings> {
    let mut settings = load_settings(&cli.config)?;
    if force_overwrite {
        settings.force_overwrite = true;
    }
    if let Some(jobs) = jobs {
        settings.jobs = jobs;
    }
    settings.validate()?;
    Ok(settings)
}

pub fn handle_runtime_commands(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Sign {
            force_overwrite,
            jobs,
        } => {
            let settings = sign_settings(cli, *force_overwrite, *jobs)?;
            let reporter = Reporter::new(cli.json);
            let report = execute(&settings, &SystemRunner, reporter)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut {
                        ok: true,
                        data: report
                    })?
                );
            } else {
                println!(
                    "signed {}/{} scripts, {} key generation(s), registry {}",
                    report.signed, report.discovered, report.key_generations, report.registry_path
                );
                for s in &report.skipped {
                    println!("skipped\t{}\t{:?}\t{}", s.script, s.stage, s.error);
                }
            }
        }
        Commands::Inspect { script } => {
            let raw = std::fs::read(script)
                .with_context(|| format!("failed to read {}", script.display()))?;
            let report = InspectReport {
                script: script.display().to_string(),
                metadata: metadata::extract(&String::from_utf8_lossy(&raw)),
            };
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut {
                        ok: true,
                        data: report
                    })?
                );
            } else {
                println!("script: {}", report.script);
                for field in MetadataField::ALL {
                    if let Some(v) = report.metadata.get(field) {
                        println!("{}: {}", field.label().to_lowercase(), v);
                    }
                }
            }
        }
        _ => {}
    }
    Ok(())
}
