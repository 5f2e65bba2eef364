use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::sections::SectionId;

pub const DEFAULT_DATA_DIR: &str = "folio-data";

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Show(ShowArgs),
    AddUser(AddUserArgs),
    Upload(UploadArgs),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Section to print (hero, about, skills, experience, projects,
    /// testimonials, social, contact).
    #[arg(long)]
    pub section: SectionId,

    /// Local data directory.
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct AddUserArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    /// Local data directory.
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Image file to upload.
    #[arg(long)]
    pub file: PathBuf,
}
