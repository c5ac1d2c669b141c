//! # Blockmail - Block-based Email Builder
//!
//! Command-line front end over the editing core.
//!
//! ## Quick Start
//!
//! ```bash
//! # Start a document from the starter blocks
//! cargo run -- new
//!
//! # Add a button and set its label
//! cargo run -- add button
//! cargo run -- set b_123 content.text "Shop now"
//!
//! # Export the email
//! cargo run -- export -o email.html
//! ```
//!
//! Every command works on one document file (`--file`, or the configured
//! `storage.document_path`) through a short-lived `Editor` session that is
//! flushed before exit.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blockmail_core::{
    Block, BlockContent, BlockId, Config, DocumentStore, Editor, FieldPath, FieldValue, InsertAt,
    MoveTarget, TemplateId, upload,
};
use blockmail_render::{HtmlExporter, settings_for};
use blockmail_store::{JsonFileStore, JsonFileTemplateLibrary, RemoteSubmitter};

/// Blockmail - build HTML emails out of blocks
#[derive(Parser, Debug)]
#[command(name = "blockmail")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Document file (defaults to the configured document path)
    #[arg(short, long, value_name = "FILE", global = true)]
    file: Option<PathBuf>,

    /// Config file to use instead of the default one
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create a document
    New {
        /// Start without the starter blocks
        #[arg(long)]
        empty: bool,

        /// Overwrite an existing document
        #[arg(long)]
        force: bool,
    },

    /// List the blocks, or the properties of one block
    Show {
        #[arg(value_name = "ID")]
        id: Option<String>,

        /// Print the stored JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Add a block
    Add {
        /// Block type, e.g. `title`, `button`, `two-column`
        #[arg(value_name = "TYPE")]
        kind: String,

        /// Insert after this block instead of at the end
        #[arg(long, value_name = "ID")]
        after: Option<String>,
    },

    /// Set a field, e.g. `content.text` or `style.fontSize`
    Set {
        id: String,
        path: String,
        value: String,
    },

    /// Move a block
    Move {
        id: String,

        #[command(flatten)]
        target: MoveArgs,
    },

    /// Embed a local image into an image field, e.g. `content.src`
    Upload {
        id: String,

        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Field to set
        #[arg(long, default_value = "content.src")]
        field: String,
    },

    /// Insert a copy of a block right after it
    Duplicate { id: String },

    /// Delete a block
    Remove { id: String },

    /// Write the email as standalone HTML
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Manage saved templates
    #[command(subcommand)]
    Template(TemplateCmd),

    /// Post the email to a remote endpoint
    Submit {
        #[arg(long, value_name = "URL")]
        endpoint: String,

        #[arg(long)]
        name: String,
    },
}

#[derive(ClapArgs, Debug)]
#[group(required = true, multiple = false)]
struct MoveArgs {
    #[arg(long, value_name = "ID")]
    before: Option<String>,

    #[arg(long, value_name = "ID")]
    after: Option<String>,

    #[arg(long, value_name = "N")]
    index: Option<usize>,
}

impl MoveArgs {
    fn target(&self) -> MoveTarget {
        match (&self.before, &self.after, self.index) {
            (Some(id), _, _) => MoveTarget::Before(BlockId::from(id.as_str())),
            (_, Some(id), _) => MoveTarget::After(BlockId::from(id.as_str())),
            (_, _, index) => MoveTarget::Index(index.unwrap_or_default()),
        }
    }
}

#[derive(Subcommand, Debug)]
enum TemplateCmd {
    /// Save the document as a template
    Save { name: String },

    /// List saved templates, newest first
    List,

    /// Delete a template
    Remove { id: String },

    /// Replace the document with a template
    Load { id: String },
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting Blockmail v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => Config::load(),
    };
    let file = args
        .file
        .clone()
        .unwrap_or_else(|| config.storage.document_path.clone());

    run(args.command, config, &file)
}

fn run(command: Cmd, config: Config, file: &Path) -> anyhow::Result<()> {
    match command {
        Cmd::New { empty, force } => create_document(file, empty, force),
        Cmd::Show { id, json } => {
            let editor = open_existing(config, file)?;
            match id {
                Some(id) if json => {
                    let id = BlockId::from(id);
                    let block = editor
                        .document()
                        .get(&id)
                        .with_context(|| format!("No block with id {id}"))?;
                    println!("{}", serde_json::to_string_pretty(block)?);
                    Ok(())
                }
                Some(id) => show_block(editor, &BlockId::from(id)),
                None if json => {
                    println!("{}", serde_json::to_string_pretty(editor.blocks())?);
                    Ok(())
                }
                None => {
                    list_blocks(editor.blocks());
                    Ok(())
                }
            }
        }
        Cmd::Add { kind, after } => {
            let mut editor = open_existing(config, file)?;
            let at = match after {
                Some(id) => InsertAt::After(BlockId::from(id)),
                None => InsertAt::End,
            };
            let id = editor.add_block(&kind, at)?;
            finish(editor)?;
            println!("{id}");
            Ok(())
        }
        Cmd::Set { id, path, value } => {
            let mut editor = open_existing(config, file)?;
            let path: FieldPath = path.parse()?;
            if !editor.update_field(&BlockId::from(id), &path, FieldValue::from(value))? {
                println!("Unchanged");
            }
            finish(editor)
        }
        Cmd::Move { id, target } => {
            let mut editor = open_existing(config, file)?;
            if !editor.move_block(&BlockId::from(id), target.target())? {
                println!("Unchanged");
            }
            finish(editor)
        }
        Cmd::Upload { id, image, field } => {
            let mut editor = open_existing(config, file)?;
            let path: FieldPath = field.parse()?;
            let data_url = read_image(&image)?;
            editor.update_field(&BlockId::from(id), &path, FieldValue::from(data_url))?;
            finish(editor)
        }
        Cmd::Duplicate { id } => {
            let mut editor = open_existing(config, file)?;
            let id = BlockId::from(id);
            editor.copy_block(&id)?;
            if let Some(copy) = editor.paste(Some(&id))? {
                println!("{copy}");
            }
            finish(editor)
        }
        Cmd::Remove { id } => {
            let mut editor = open_existing(config, file)?;
            let id = BlockId::from(id);
            if !editor.delete_block(&id) {
                bail!("No block with id {id}");
            }
            finish(editor)
        }
        Cmd::Export { output } => {
            let editor = open_existing(config, file)?;
            let html = HtmlExporter::new(editor.config().export.clone()).export(editor.blocks());
            match output {
                Some(path) => {
                    std::fs::write(&path, html)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Exported to {}", path.display());
                }
                None => println!("{html}"),
            }
            Ok(())
        }
        Cmd::Template(command) => run_template(command, config, file),
        Cmd::Submit { endpoint, name } => {
            let editor = open_existing(config, file)?;
            let runtime = tokio::runtime::Runtime::new()?;
            let mut submitter = RemoteSubmitter::new(editor.config().export.clone())?;
            let result = runtime.block_on(submitter.submit(&endpoint, &name, editor.blocks()));
            if let Some(message) = submitter.state().message() {
                println!("{message}");
            }
            result?;
            Ok(())
        }
    }
}

fn run_template(command: TemplateCmd, config: Config, file: &Path) -> anyhow::Result<()> {
    match command {
        TemplateCmd::Save { name } => {
            let mut editor = open_existing(config, file)?;
            let id = editor.save_template(&name)?;
            println!("{id}");
        }
        TemplateCmd::List => {
            let editor = open_session(config, file);
            for template in editor.templates()? {
                println!(
                    "{}  {}  {} blocks  {}",
                    template.id,
                    template.saved_at.format("%Y-%m-%d %H:%M"),
                    template.blocks.len(),
                    template.name,
                );
            }
        }
        TemplateCmd::Remove { id } => {
            let mut editor = open_session(config, file);
            let id = TemplateId::from(id.as_str());
            if !editor.remove_template(&id)? {
                bail!("No template with id {id}");
            }
        }
        TemplateCmd::Load { id } => {
            let mut editor = open_session(config, file);
            editor.load_template(&TemplateId::from(id.as_str()))?;
            finish(editor)?;
        }
    }
    Ok(())
}

// ==================== Sessions ====================

fn open_session(config: Config, file: &Path) -> Editor {
    let templates = JsonFileTemplateLibrary::new(&config.storage.templates_path);
    Editor::open(config, Box::new(JsonFileStore::new(file)), Box::new(templates))
}

/// Opens a session over a document that must already exist.
fn open_existing(config: Config, file: &Path) -> anyhow::Result<Editor> {
    // A load error would silently fall back to the starter document.
    let store = JsonFileStore::new(file);
    match store.load() {
        Ok(Some(_)) => Ok(open_session(config, file)),
        Ok(None) => bail!(
            "No document at {}; run `blockmail new` first",
            file.display()
        ),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", file.display())),
    }
}

fn finish(mut editor: Editor) -> anyhow::Result<()> {
    editor.flush().context("Failed to save document")?;
    Ok(())
}

fn create_document(file: &Path, empty: bool, force: bool) -> anyhow::Result<()> {
    if file.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            file.display()
        );
    }
    let document = if empty {
        blockmail_core::Document::new()
    } else {
        blockmail_core::Document::starter()
    };
    JsonFileStore::new(file).save(document.blocks())?;
    println!("Created {} with {} blocks", file.display(), document.len());
    Ok(())
}

/// Reads an image file into a `data:` URL.
fn read_image(path: &Path) -> anyhow::Result<String> {
    let mime = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(upload::mime_for_extension)
        .with_context(|| format!("{} is not a supported image type", path.display()))?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(upload::image_data_url(mime, &bytes)?)
}

// ==================== Output ====================

fn list_blocks(blocks: &[Block]) {
    if blocks.is_empty() {
        println!("{}", blockmail_render::surface::EMPTY_CANVAS_MESSAGE);
        return;
    }
    for (index, block) in blocks.iter().enumerate() {
        println!(
            "{index:>3}  {:<36}  {:<11}  {}",
            block.id(),
            block.kind(),
            preview(block)
        );
    }
}

fn show_block(mut editor: Editor, id: &BlockId) -> anyhow::Result<()> {
    if editor.document().get(id).is_none() {
        bail!("No block with id {id}");
    }
    editor.select(Some(id));
    let panel = settings_for(editor.document());
    println!("{}", panel.subtitle);
    for control in panel.controls {
        println!(
            "  {:<22} {:<24} {}",
            control.label,
            control.path.to_string(),
            control.value.into_text()
        );
    }
    Ok(())
}

/// One-line summary of a block's content.
fn preview(block: &Block) -> String {
    let text = match block.content() {
        BlockContent::Title(c) | BlockContent::Subtitle(c) | BlockContent::Paragraph(c) => {
            c.text.clone()
        }
        BlockContent::Image(c) => c.src.clone(),
        BlockContent::Button(c) => format!("{} -> {}", c.text, c.url),
        BlockContent::Header(c) => c.logo.clone(),
        BlockContent::Hero(c) => c.title.clone(),
        BlockContent::Cta(c) => c.title.clone(),
        BlockContent::Footer(c) => c.contact_info.clone(),
        BlockContent::Section(c) => format!("{} nested", c.blocks.len()),
        BlockContent::TwoColumn(c) => {
            format!("{} | {}", c.left_column.len(), c.right_column.len())
        }
    };
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > 48 {
        format!("{}...", line.chars().take(45).collect::<String>())
    } else {
        line.to_string()
    }
}
