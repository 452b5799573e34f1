use clap::{Parser, Subcommand, value_parser};
use kya_files::common::types::Ptr;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "kya-meshes")]
#[command(version)]
#[command(about = "Decodes G3D mesh resources from dumped memory images")]
pub struct CliArgs {
    #[arg(long, env = "KYA_DATA_DIR", default_value_t = default_data_dir())]
    pub data_dir: String,

    #[command(subcommand)]
    pub command: Command,
}

pub fn default_data_dir() -> String {
    std::env::current_dir()
        .map(|dir| dir.join("_data").to_string_lossy().to_string())
        .unwrap_or_else(|_| "_data".to_string())
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode an asset and print its hierarchies, lods and strips.
    List {
        /// The memory image, relative to the data directory.
        image: String,
        /// Address of the asset's manager record.
        #[arg(value_parser = value_parser!(Address))]
        manager: Address,
        /// The asset's name, e.g. `LEVEL\SECT1.g3d`.
        name: String,
    },
    /// Decode a single strip the way display list strips are decoded.
    Strip {
        image: String,
        #[arg(value_parser = value_parser!(Address))]
        address: Address,
        /// Dump the decoded mesh as Wavefront OBJ.
        #[arg(long)]
        obj: Option<String>,
    },
}

/// An address into the memory image, either `0x` prefixed hex or decimal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Address(pub Ptr);

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => trimmed.parse::<u32>(),
        };

        parsed
            .map(|address| Address(Ptr(address)))
            .map_err(|err| format!("Invalid address {}: {}", s, err))
    }
}
