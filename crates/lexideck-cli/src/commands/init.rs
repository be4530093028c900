//! The `lexideck init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    let path = Path::new("lexideck.toml");
    if path.exists() {
        println!("lexideck.toml already exists, skipping.");
        return Ok(());
    }

    std::fs::write(path, SAMPLE_CONFIG)?;
    println!("Created lexideck.toml");

    println!("\nNext steps:");
    println!("  1. Run: lexideck deck create \"Spanish\"");
    println!("  2. Run: lexideck card add 1 perro dog");
    println!("  3. Run: lexideck study 1");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# lexideck configuration

# SQLite database file; ${VAR} references are expanded.
database_path = "./lexideck.db"

# Dictionary used by `card add --lookup` and `card lookup`.
dictionary_base_url = "https://api.dictionaryapi.dev"
dictionary_timeout_secs = 10

# Uncomment for reproducible shuffles.
# seed = 42
"#;
