//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Click-to-edit live preview for component sources
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: vina.toml)
    #[arg(short = 'C', long, default_value = "vina.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the preview process (static files, update endpoint, observer channel)
    #[command(visible_alias = "p")]
    Preview {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// HTTP port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Port for observer WebSocket connections
        #[arg(short, long)]
        ws_port: Option<u16>,
    },

    /// Run the editing surface that patches sources and pushes them to the preview
    #[command(visible_alias = "s")]
    Studio {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// HTTP port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Base URL of the running preview process
        #[arg(short = 'u', long, value_hint = clap::ValueHint::Url)]
        preview_url: Option<String>,
    },

    /// Patch a component and push the result to the preview
    #[command(visible_alias = "e")]
    Edit {
        #[command(subcommand)]
        action: EditAction,
    },

    /// Resolve a DOM path to its source locator
    #[command(visible_alias = "l")]
    Locate {
        /// DOM path, e.g. `main > section.hero > h1`
        dom_path: String,

        /// Extra rendered-markup snapshots to index (in addition to config)
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        markup: Vec<PathBuf>,
    },
}

/// `edit` subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum EditAction {
    /// Replace the first text run of a component
    Text {
        #[command(flatten)]
        target: EditTarget,

        /// Replacement text
        text: String,
    },

    /// Replace or insert an attribute (default `src`) on a component's image carrier
    Attr {
        #[command(flatten)]
        target: EditTarget,

        /// Attribute to write (default: src)
        #[arg(short, long)]
        attr: Option<String>,

        /// New attribute value
        value: String,

        /// Also write `alt` on the same element
        #[arg(long)]
        alt: Option<String>,
    },
}

/// Where an edit applies and how it is delivered.
#[derive(clap::Args, Debug, Clone)]
pub struct EditTarget {
    /// Source file, relative to the preview source directory
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub file: String,

    /// Component name (`default` or the file stem selects the default export)
    #[arg(short, long)]
    pub component: String,

    /// Print the patched source instead of pushing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_and_verbose_flags_coexist() {
        let err = Cli::try_parse_from(["vina", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);

        let cli = Cli::try_parse_from(["vina", "locate", "main", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_parse_edit_text() {
        let cli = Cli::try_parse_from([
            "vina", "edit", "text", "-f", "components/Hero.tsx", "-c", "Hero", "New title",
        ])
        .unwrap();
        let Commands::Edit { action: EditAction::Text { target, text } } = cli.command else {
            panic!("expected edit text");
        };
        assert_eq!(target.file, "components/Hero.tsx");
        assert_eq!(target.component, "Hero");
        assert_eq!(text, "New title");
        assert!(!target.dry_run);
    }

    #[test]
    fn test_parse_edit_attr_with_alt() {
        let cli = Cli::try_parse_from([
            "vina", "edit", "attr", "--file", "Logo.jsx", "--component", "Logo", "--attr", "icon",
            "--alt", "Company", "/assets/logo.svg", "--dry-run",
        ])
        .unwrap();
        let Commands::Edit { action: EditAction::Attr { target, attr, value, alt } } = cli.command
        else {
            panic!("expected edit attr");
        };
        assert_eq!(attr.as_deref(), Some("icon"));
        assert_eq!(value, "/assets/logo.svg");
        assert_eq!(alt.as_deref(), Some("Company"));
        assert!(target.dry_run);
    }

    #[test]
    fn test_parse_preview_overrides() {
        let cli = Cli::try_parse_from(["vina", "-v", "preview", "-p", "8080", "-w", "9000"]).unwrap();
        assert!(cli.verbose);
        let Commands::Preview { port, ws_port, interface } = cli.command else {
            panic!("expected preview");
        };
        assert_eq!(port, Some(8080));
        assert_eq!(ws_port, Some(9000));
        assert_eq!(interface, None);
    }
}
