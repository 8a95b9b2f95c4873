//! Command-line MIDI export for octet compositions.
//!
//! Usage: `octet-cli [OUTPUT.mid] [COMPOSITION.json]`
//!
//! With no composition file the built-in sample is exported, which is
//! enough to audition the engine's output in any sequencer.

use std::fs;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use octet_core::{Composition, export_midi};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("octet=debug".parse().unwrap()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "sample.mid".to_string());
    let composition = match args.next() {
        Some(path) => {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("reading composition {path}"))?;
            serde_json::from_str::<Composition>(&json)
                .with_context(|| format!("parsing composition {path}"))?
        }
        None => Composition::sample(),
    };

    tracing::info!(
        title = %composition.title,
        measures = composition.measures.len(),
        "exporting composition"
    );

    let data = export_midi(&composition).context("serializing MIDI file")?;
    fs::write(&output, &data).with_context(|| format!("writing {output}"))?;

    tracing::info!(bytes = data.len(), path = %output, "export complete");
    Ok(())
}
