use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use colored::Colorize;

use hub_defaults::{KeyedStore, PreferenceStore, Registry, RegistryConfig, StoreKey, Value};
use hub_digest::{DigestAlgorithm, HexCase, HexDigester};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    match cli.command {
        Command::Read(args) => cmd_read(&config, args),
        Command::Write(args) => cmd_write(&config, args),
        Command::Delete(args) => cmd_delete(&config, args),
        Command::Domains => cmd_domains(&config),
        Command::Digest(args) => cmd_digest(args),
    }
}

/// Config file, then environment, then command-line flags.
fn resolve_config(cli: &Cli) -> anyhow::Result<RegistryConfig> {
    let base = match &cli.config {
        Some(path) => RegistryConfig::load(path)?,
        None => RegistryConfig::default(),
    };
    let mut config = base
        .with_env_overrides()
        .context("applying environment overrides")?;
    if let Some(root) = &cli.root {
        config.store.root = root.clone();
    }
    if let Some(app) = &cli.app {
        config.application_domain = app.clone();
    }
    Ok(config)
}

fn cmd_read(config: &RegistryConfig, args: ReadArgs) -> anyhow::Result<()> {
    let registry = Registry::from_config(config);
    let store = registry.store_for(args.namespace.as_str());
    match args.key {
        Some(key) => match store.object(&StoreKey::new(key.as_str())) {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => println!("{} is {}", key.bold(), "not set".dimmed()),
        },
        None => {
            let snapshot = store.dictionary_representation();
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }
    Ok(())
}

fn cmd_write(config: &RegistryConfig, args: WriteArgs) -> anyhow::Result<()> {
    let value = parse_value(args.kind, &args.value)?;
    let registry = Registry::from_config(config);
    let store = registry.store_for(args.namespace.as_str());
    store.set_object(&StoreKey::new(args.key.as_str()), Some(value));
    flush(&*store)?;
    println!(
        "{} Set {} in {}",
        "✓".green().bold(),
        args.key.bold(),
        store.suite_name().cyan()
    );
    Ok(())
}

fn cmd_delete(config: &RegistryConfig, args: DeleteArgs) -> anyhow::Result<()> {
    let registry = Registry::from_config(config);
    let store = registry.store_for(args.namespace.as_str());
    match &args.key {
        Some(key) => {
            store.remove(&StoreKey::new(key.as_str()));
            flush(&*store)?;
            println!("{} Removed {}", "✓".green().bold(), key.bold());
        }
        None => {
            let domain = store.suite_name().to_string();
            store.remove_persistent_domain(&domain);
            flush(&*store)?;
            println!("{} Removed domain {}", "✓".green().bold(), domain.cyan());
        }
    }
    Ok(())
}

fn cmd_domains(config: &RegistryConfig) -> anyhow::Result<()> {
    let domains = config.store.open();
    let names = domains
        .names()
        .with_context(|| format!("listing domains in {}", config.store.root.display()))?;
    if names.is_empty() {
        println!("No persistent domains.");
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

fn cmd_digest(args: DigestArgs) -> anyhow::Result<()> {
    let algorithm = if args.sha1 {
        DigestAlgorithm::Sha1
    } else {
        DigestAlgorithm::Md5
    };
    let case = if args.lowercase {
        HexCase::Lower
    } else {
        HexCase::Upper
    };
    println!("{}", HexDigester::new(algorithm, case).digest(&args.text));
    Ok(())
}

fn flush(store: &dyn PreferenceStore) -> anyhow::Result<()> {
    if !store.synchronize() {
        bail!("failed to write preferences to disk");
    }
    Ok(())
}

fn parse_value(kind: ValueKind, text: &str) -> anyhow::Result<Value> {
    let value = match kind {
        ValueKind::String => Value::from(text),
        ValueKind::Int => Value::Integer(text.trim().parse().context("expected an integer")?),
        ValueKind::Float => Value::Float(text.trim().parse().context("expected a number")?),
        ValueKind::Double => Value::Double(text.trim().parse().context("expected a number")?),
        ValueKind::Bool => Value::Bool(parse_bool(text)?),
        ValueKind::Date => {
            let date = DateTime::parse_from_rfc3339(text.trim())
                .context("expected an RFC 3339 timestamp")?;
            Value::Date(date.with_timezone(&Utc))
        }
        ValueKind::Data => Value::data(hex::decode(text.trim()).context("expected hex bytes")?),
    };
    Ok(value)
}

fn parse_bool(text: &str) -> anyhow::Result<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => bail!("expected a boolean, got {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_values() {
        assert_eq!(parse_value(ValueKind::String, "hi").unwrap(), Value::from("hi"));
        assert_eq!(parse_value(ValueKind::Int, " 42 ").unwrap(), Value::Integer(42));
        assert_eq!(parse_value(ValueKind::Double, "2.5").unwrap(), Value::Double(2.5));
        assert_eq!(parse_value(ValueKind::Float, "1.5").unwrap(), Value::Float(1.5));
        assert_eq!(parse_value(ValueKind::Bool, "YES").unwrap(), Value::Bool(true));
        assert_eq!(parse_value(ValueKind::Data, "dead").unwrap(), Value::data(vec![0xdeu8, 0xad]));
        assert!(matches!(
            parse_value(ValueKind::Date, "2024-01-02T03:04:05Z").unwrap(),
            Value::Date(_)
        ));
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(parse_value(ValueKind::Int, "4.2").is_err());
        assert!(parse_value(ValueKind::Bool, "maybe").is_err());
        assert!(parse_value(ValueKind::Date, "yesterday").is_err());
        assert!(parse_value(ValueKind::Data, "xyz").is_err());
    }
}
