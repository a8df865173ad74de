//! Command implementations for each file format

pub mod psa;
pub mod psk;

use clap::ValueEnum;
use ue_data::NameEncoding;
use ue_psa::BoneMappingMode;

/// Name encoding selection shared by the subcommands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EncodingArg {
    /// Legacy Windows-1252 codepage (the format's default)
    #[default]
    Windows1252,
    /// UTF-8, decoded lossily
    Utf8,
}

impl From<EncodingArg> for NameEncoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Windows1252 => Self::Windows1252,
            EncodingArg::Utf8 => Self::Utf8,
        }
    }
}

/// Bone mapping mode selection for retargeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MappingArg {
    /// Names must match byte for byte
    Exact,
    /// Case-folded name matching
    #[default]
    CaseInsensitive,
}

impl From<MappingArg> for BoneMappingMode {
    fn from(arg: MappingArg) -> Self {
        match arg {
            MappingArg::Exact => Self::Exact,
            MappingArg::CaseInsensitive => Self::CaseInsensitive,
        }
    }
}
