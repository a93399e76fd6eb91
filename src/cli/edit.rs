//! `vina edit`: patch one component from the command line.
//!
//! The patched file is pushed through the preview's update endpoint, the same
//! way the studio delivers edits. With `--dry-run` the result is printed and
//! nothing leaves the process.

use std::io::Write;

use anyhow::Result;

use crate::cli::args::{EditAction, EditTarget};
use crate::config::VinaConfig;
use crate::logger::{status_error, status_success};
use crate::patch::{AttributeEdit, EditIntent, PatchEngine};
use crate::studio::{EditPipeline, PreviewClient};

/// Split an action into its target and intent.
fn intent_of(action: &EditAction) -> (&EditTarget, EditIntent) {
    match action {
        EditAction::Text { target, text } => (target, EditIntent::ReplaceText(text.clone())),
        EditAction::Attr { target, attr, value, alt } => (
            target,
            EditIntent::ReplaceAttribute(AttributeEdit {
                attr_name: attr.clone(),
                new_value: value.clone(),
                alt_value: alt.clone(),
            }),
        ),
    }
}

pub fn run_edit(action: &EditAction, config: &VinaConfig) -> Result<()> {
    let (target, intent) = intent_of(action);
    let engine = PatchEngine::new(config.source_root());

    if target.dry_run {
        let result = engine.apply(&target.file, &target.component, &intent)?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(result.updated_source.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    let pipeline = EditPipeline::new(engine, PreviewClient::from_config(&config.studio)?);
    match pipeline.apply(&target.file, &target.component, &intent) {
        Ok(outcome) => {
            status_success(&outcome.reply.message);
            Ok(())
        }
        Err(e) => {
            status_error(&format!("edit failed at {:?} stage", e.stage()), &e.to_string());
            Err(e.into())
        }
    }
}
