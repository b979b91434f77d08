use clap;
use std::path::PathBuf;

#[derive(clap::Parser,Debug)]
#[command(author, version, about, long_about = None)]
pub struct SeqExportArgs {
    #[command(subcommand)]
    pub action: Action,
}

#[derive(clap::Subcommand,Debug)]
pub enum Action {
    /// write a default parameter file for a sequence
    NewParams(NewParamsArgs),
    /// write a default scanner limits file
    NewSystemConfig(NewSystemConfigArgs),
    /// build a sequence from a parameter file and export the .seq
    Build(BuildArgs),
    /// summarize an existing .seq file
    Report(ReportArgs),
    ListSequences,
}

#[derive(clap::Args,Debug)]
pub struct NewParamsArgs {
    pub alias:String,
    pub destination:PathBuf,
}

#[derive(clap::Args,Debug)]
pub struct NewSystemConfigArgs {
    pub destination:PathBuf,
}

#[derive(clap::Args,Debug)]
pub struct BuildArgs {
    pub alias:String,
    pub params_file:PathBuf,
    pub destination:PathBuf,
}

#[derive(clap::Args,Debug)]
pub struct ReportArgs {
    pub seq_file:PathBuf,
    /// scanner limits file used to interpret raster times
    #[clap(short, long)]
    pub system:Option<PathBuf>,
}
