use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "trip", about = concat!("tripsync v", env!("CARGO_PKG_VERSION"), " - shared trip plans"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: ./tripsync.toml when present)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List trips, soonest first
    List,
    /// Show one trip
    Show(ShowArgs),
    /// Apply an action to the trips and sync the result
    Dispatch(DispatchArgs),
    /// Follow the collection and log every change
    Watch,
    /// List, add or remove traveler profiles
    Profiles(ProfilesCmd),
}

#[derive(Args)]
pub struct ShowArgs {
    /// Trip id
    pub id: String,
}

#[derive(Args)]
pub struct DispatchArgs {
    /// Make this trip active before dispatching
    #[arg(long)]
    pub trip: Option<String>,
    /// Action as JSON, e.g. '{"type":"ADD_TODO","payload":{"text":"Visa"}}'
    pub action: String,
}

#[derive(Args)]
pub struct ProfilesCmd {
    #[command(subcommand)]
    pub action: Option<ProfilesAction>,
}

#[derive(Subcommand)]
pub enum ProfilesAction {
    /// Add a profile
    Add {
        /// Display name
        name: String,
    },
    /// Remove a profile (trips keep the id)
    Rm {
        /// Profile id
        id: String,
    },
}
