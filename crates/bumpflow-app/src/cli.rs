use crate::script::{ScriptError, Step, parse_script, replay};
use anyhow::{Context, Result};
use bumpflow_core::{Editor, EditorConfig, ToolKind};
use bumpflow_render::{RenderContext, Renderer, SvgRenderer};
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "bumpflow",
    version,
    about = "Replay a bumpflow editing session and export the diagram"
)]
pub struct Args {
    /// Session script (JSON array of steps) or '-' for stdin
    #[arg(short = 's', long = "script")]
    pub script: Option<PathBuf>,

    /// Editor config JSON file
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Output file for the session report (or tool listing). Defaults to stdout.
    #[arg(short = 'j', long = "json")]
    pub json: Option<PathBuf>,

    /// Also render the final diagram to this SVG file
    #[arg(long = "svg")]
    pub svg: Option<PathBuf>,

    /// Override the snap distance threshold
    #[arg(long = "snap-distance")]
    pub snap_distance: Option<f64>,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,

    /// Print the toolbar tools and exit
    #[arg(long = "list-tools")]
    pub list_tools: bool,
}

pub fn run() -> Result<()> {
    run_with(Args::parse())
}

pub fn run_with(args: Args) -> Result<()> {
    if args.list_tools {
        return write_output(&tool_listing(), args.json.as_deref());
    }

    let mut config = load_config(args.config.as_deref())?;
    if let Some(distance) = args.snap_distance {
        config.snap_distance = distance;
    }

    let steps = read_script(args.script.as_deref())?;
    log::info!("replaying {} step(s)", steps.len());

    let mut editor = Editor::with_config(config);
    let report = replay(&mut editor, &steps);
    if editor.state().is_gesture() {
        log::warn!("script ended in the middle of a gesture: {:?}", editor.state());
    }

    if let Err(err) = editor.diagram().check_integrity() {
        log::warn!("diagram failed integrity check: {err}");
    }

    let json = if args.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    write_output(&json, args.json.as_deref())?;

    if let Some(path) = args.svg.as_deref() {
        let mut renderer = SvgRenderer::new();
        renderer.build_scene(&RenderContext::from_editor(&editor));
        let svg = renderer.finish()?;
        std::fs::write(path, svg)
            .with_context(|| format!("Failed to write SVG to {}", path.display()))?;
    }

    Ok(())
}

/// One toolbar tool per line: its script name and label.
fn tool_listing() -> String {
    ToolKind::all()
        .map(|tool| match tool {
            ToolKind::PlaceBox(kind) => {
                format!("select_box_tool {}\t{}", kind.number(), tool.label())
            }
            ToolKind::Line => format!("select_line_tool\t{}", tool.label()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Load the editor configuration, or defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = EditorConfig::from_json(&contents)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}

fn read_script(path: Option<&Path>) -> Result<Vec<Step>, ScriptError> {
    let input = match path {
        Some(path) if path != Path::new("-") => {
            std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
                path: path.to_path_buf(),
                source,
            })?
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| ScriptError::Read {
                    path: PathBuf::from("-"),
                    source,
                })?;
            buf
        }
    };
    parse_script(&input)
}

fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            println!("{text}");
        }
    }
    Ok(())
}
