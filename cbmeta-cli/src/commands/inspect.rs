//! Inspect command implementation

use anyhow::{Context, Result};
use cbmeta_core::decoder::decoder_for_path;
use cbmeta_core::normalize::FieldOutcome;
use std::path::Path;

/// Display the normalized metadata of one delivered file
pub fn inspect(input: &Path, json: bool) -> Result<()> {
    if !input.is_file() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let decoder = decoder_for_path(input)
        .with_context(|| format!("No decoder available for {}", input.display()))?;

    tracing::debug!("Decoding {:?}", input);
    let decoded = decoder
        .decode(input)
        .with_context(|| format!("Failed to decode {}", input.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
        return Ok(());
    }

    for (key, value) in decoded.record.iter() {
        println!("{:<12} {}", format!("{}:", key), value);
    }
    if let Some(isbn) = &decoded.package_isbn {
        println!("{:<12} {}", "package id:", if isbn.is_empty() { "(not an ISBN)" } else { isbn.as_str() });
    }
    if let Some(reason) = &decoded.degraded {
        println!("\nPackage could not be read: {}", reason);
    }

    let raw: Vec<_> = decoded
        .outcomes
        .iter()
        .filter_map(|(field, outcome)| match outcome {
            FieldOutcome::Raw { reason, .. } => Some((field.key(), reason)),
            FieldOutcome::Normalized { .. } => None,
        })
        .collect();
    if !raw.is_empty() {
        println!("\nFields kept as raw text:");
        for (field, reason) in raw {
            println!("  {}: {}", field, reason);
        }
    }

    Ok(())
}
