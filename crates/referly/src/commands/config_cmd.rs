//! `config`: profile management.

use referly_config::{Config, Profile, config_path, load_config_from, save_config};

use crate::cli::{ConfigArgs, ConfigCommand, ConfigInitArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config_path().display().to_string(), global.quiet);
            Ok(())
        }
        ConfigCommand::Show => show(global),
        ConfigCommand::Init(init) => self::init(init, global),
    }
}

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let mut config = load_config_from(&config_path())?;

    // Never echo stored passwords.
    for profile in config.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some("<redacted>".into());
        }
    }

    let out = match global.output {
        OutputFormat::Json => output::render_json_pretty(&config),
        OutputFormat::JsonCompact => output::render_json_compact(&config),
        OutputFormat::Table | OutputFormat::Plain => {
            toml::to_string_pretty(&config).map_err(|e| CliError::Validation {
                field: "config".into(),
                reason: e.to_string(),
            })?
        }
    };
    output::print_output(out.trim_end(), global.quiet);
    Ok(())
}

fn init(args: ConfigInitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let _: url::Url = args.backend.parse().map_err(|_| CliError::Validation {
        field: "--backend".into(),
        reason: format!("invalid URL: {}", args.backend),
    })?;

    let path = config_path();
    let mut config: Config = if path.exists() {
        load_config_from(&path)?
    } else {
        Config::default()
    };

    let profile = config.profiles.entry(args.name.clone()).or_insert_with(Profile::default);
    profile.backend = args.backend;
    if args.email.is_some() {
        profile.email = args.email;
    }

    if args.default || config.profiles.len() == 1 {
        config.default_profile = Some(args.name.clone());
    }

    save_config(&config)?;
    output::print_output(
        &format!("Profile '{}' saved to {}", args.name, path.display()),
        global.quiet,
    );
    Ok(())
}
