use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use parkpath_cli::commands::exit::handle_exit_command;
use parkpath_cli::commands::inspect::handle_inspect_command;
use parkpath_cli::commands::route::{handle_route_command, RouteCommandArgs};
use parkpath_cli::commands::slot::{handle_slot_command, SlotCommandArgs};
use parkpath_cli::commands::{
    build_options, format_options, load_graph, resolve_map_path, CommandContext,
};
use parkpath_cli::logging::{init_logging, LoggingConfig};
use parkpath_cli::output::OutputFormat;
use parkpath_lib::Coordinate;

#[derive(Parser, Debug)]
#[command(author, version, about = "Walking routes inside multi-level parking facilities")]
struct Cli {
    /// Facility map JSON file. Defaults to $PARKPATH_MAP.
    #[arg(long, global = true)]
    map: Option<PathBuf>,

    /// Output format for command results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Maximum distance for linking off-corridor points to a corridor.
    #[arg(long, global = true)]
    attach_radius: Option<f64>,

    /// Walking speed in metres per second used for time estimates.
    #[arg(long, global = true)]
    walking_speed: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Shortest walking route between two points, given as LEVEL,X,Y.
    Route {
        #[arg(long, allow_hyphen_values = true)]
        from: Coordinate,
        #[arg(long, allow_hyphen_values = true)]
        to: Coordinate,
    },
    /// Closest available slot by walking distance.
    NearestSlot {
        #[arg(long, allow_hyphen_values = true)]
        from: Coordinate,
        /// Candidate slot ids (comma separated); defaults to the map's
        /// available slots.
        #[arg(long = "slots", value_delimiter = ',')]
        slots: Vec<String>,
    },
    /// Closest exit by walking distance.
    NearestExit {
        #[arg(long, allow_hyphen_values = true)]
        from: Coordinate,
    },
    /// Summarise the navigation graph built from the map.
    Inspect,
}

fn main() -> Result<()> {
    init_logging(&LoggingConfig::from_env());
    let cli = Cli::parse();

    let map_path = resolve_map_path(cli.map.as_deref())?;
    let graph = load_graph(&map_path, &build_options(cli.attach_radius))?;
    let context = CommandContext {
        format: cli.format,
        format_options: format_options(cli.walking_speed)?,
    };

    let output = match cli.command {
        Command::Route { from, to } => {
            handle_route_command(&graph, &context, &RouteCommandArgs { from, to })?
        }
        Command::NearestSlot { from, slots } => {
            handle_slot_command(&graph, &context, &SlotCommandArgs { from, slots })?
        }
        Command::NearestExit { from } => handle_exit_command(&graph, &context, from)?,
        Command::Inspect => handle_inspect_command(&graph, &context)?,
    };

    print!("{output}");
    Ok(())
}
