use crate::*;

pub fn handle_admin_commands(cli: &Cli) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Doctor => {
            let report = run_doctor(&cli.config, &SystemRunner);
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut {
                        ok: report.overall == "ok",
                        data: report
                    })?
                );
            } else {
                println!("doctor: {}", report.overall);
                for c in report.checks {
                    println!("{}\t{}", c.name, c.status);
                }
            }
        }
        Commands::Config => {
            let settings = load_settings(&cli.config)?;
            if cli.json {
                print_one(true, settings, |_| String::new())?;
            } else {
                print!("{}", serde_yaml::to_string(&settings)?);
            }
        }
        _ => return Ok(false),
    }
    Ok(true)
}
