//! Engine configuration.
//!
//! [`EngineConfig`] is the typed configuration read by the search. The
//! string-keyed [`EngineConfig::set_option`] accepts the familiar UCI option
//! names and reports which resources need rebuilding after a change.

use std::fmt;
use std::str::FromStr;

use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::Color;

pub const DEFAULT_HASH_MB: usize = 16;
pub const MAX_HASH_MB: usize = 1 << 16;
pub const MAX_THREADS: usize = 512;
pub const MAX_MULTI_PV: usize = 500;

/// Error type for rejected options
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown option '{name}'")]
    Unknown { name: String },
    #[error("invalid value '{value}' for option '{name}'")]
    InvalidValue { name: String, value: String },
}

/// Which side contempt applies to while analysing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnalysisContempt {
    Off,
    White,
    Black,
    #[default]
    Both,
}

impl FromStr for AnalysisContempt {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(AnalysisContempt::Off),
            "white" => Ok(AnalysisContempt::White),
            "black" => Ok(AnalysisContempt::Black),
            "both" => Ok(AnalysisContempt::Both),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AnalysisContempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisContempt::Off => "Off",
            AnalysisContempt::White => "White",
            AnalysisContempt::Black => "Black",
            AnalysisContempt::Both => "Both",
        };
        f.write_str(name)
    }
}

/// Side effect an option change requires beyond updating the struct
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionChange {
    ResizeThreads(usize),
    ResizeHash(usize),
    ClearHash,
    ReloadTablebases,
}

/// Typed engine configuration shared by every session of a manager.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Search threads (`Threads`)
    pub threads: usize,
    /// Transposition table size in MB (`Hash`)
    pub hash_mb: usize,
    /// Draw aversion in centipawns (`Contempt`)
    pub contempt: i32,
    /// `Analysis Contempt`
    pub analysis_contempt: AnalysisContempt,
    /// Number of lines reported (`MultiPV`)
    pub multi_pv: usize,
    /// `UCI_AnalyseMode`
    pub analyse_mode: bool,
    /// `UCI_Chess960`
    pub chess960: bool,
    /// Directories with Syzygy tables, separated like `PATH` (`SyzygyPath`)
    pub syzygy_path: Option<String>,
    /// Minimum remaining depth for in-search probes (`SyzygyProbeDepth`)
    pub syzygy_probe_depth: i32,
    /// Largest piece count probed, 0 disables probing (`SyzygyProbeLimit`)
    pub syzygy_probe_limit: u32,
    /// Score cursed wins and blessed losses as draws (`Syzygy50MoveRule`)
    pub syzygy_50_move_rule: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            threads: 1,
            hash_mb: DEFAULT_HASH_MB,
            contempt: 24,
            analysis_contempt: AnalysisContempt::Both,
            multi_pv: 1,
            analyse_mode: false,
            chess960: false,
            syzygy_path: None,
            syzygy_probe_depth: 1,
            syzygy_probe_limit: 7,
            syzygy_50_move_rule: true,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.clamp(1, MAX_THREADS);
        self
    }

    #[must_use]
    pub fn with_hash_mb(mut self, hash_mb: usize) -> Self {
        self.hash_mb = hash_mb.clamp(1, MAX_HASH_MB);
        self
    }

    #[must_use]
    pub fn with_multi_pv(mut self, multi_pv: usize) -> Self {
        self.multi_pv = multi_pv.clamp(1, MAX_MULTI_PV);
        self
    }

    #[must_use]
    pub fn with_chess960(mut self, chess960: bool) -> Self {
        self.chess960 = chess960;
        self
    }

    /// Set an option by its UCI name (case-insensitive).
    ///
    /// Numeric values are clamped to the option's range. Returns the
    /// resource change the caller has to carry out, if any.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<Option<OptionChange>, OptionError> {
        let normalized = name.trim().to_ascii_lowercase();
        let value = value.trim();
        debug!("setoption {name} = {value}");

        let change = match normalized.as_str() {
            "threads" => {
                let threads = parse_number::<usize>(name, value)?.clamp(1, MAX_THREADS);
                self.threads = threads;
                Some(OptionChange::ResizeThreads(threads))
            }
            "hash" => {
                let mb = parse_number::<usize>(name, value)?.clamp(1, MAX_HASH_MB);
                self.hash_mb = mb;
                Some(OptionChange::ResizeHash(mb))
            }
            "clear hash" => Some(OptionChange::ClearHash),
            "contempt" => {
                self.contempt = parse_number::<i32>(name, value)?.clamp(-100, 100);
                None
            }
            "analysis contempt" => {
                self.analysis_contempt = value.parse().map_err(|()| invalid(name, value))?;
                None
            }
            "multipv" => {
                self.multi_pv = parse_number::<usize>(name, value)?.clamp(1, MAX_MULTI_PV);
                None
            }
            "uci_analysemode" => {
                self.analyse_mode = parse_bool(name, value)?;
                None
            }
            "uci_chess960" => {
                self.chess960 = parse_bool(name, value)?;
                None
            }
            "syzygypath" => {
                self.syzygy_path = match value {
                    "" | "<empty>" => None,
                    path => Some(path.to_string()),
                };
                Some(OptionChange::ReloadTablebases)
            }
            "syzygyprobedepth" => {
                self.syzygy_probe_depth = parse_number::<i32>(name, value)?.clamp(1, 100);
                None
            }
            "syzygyprobelimit" => {
                self.syzygy_probe_limit = parse_number::<u32>(name, value)?.min(7);
                Some(OptionChange::ReloadTablebases)
            }
            "syzygy50moverule" => {
                self.syzygy_50_move_rule = parse_bool(name, value)?;
                None
            }
            _ => {
                return Err(OptionError::Unknown {
                    name: name.to_string(),
                })
            }
        };
        Ok(change)
    }

    /// Contempt in centipawns from the point of view of `us`, the side to
    /// move at the root. Analysis mode restricts it to the configured side;
    /// a negative value means the engine prefers draws for `us`.
    #[must_use]
    pub fn contempt_for(&self, us: Color) -> i32 {
        if !self.analyse_mode {
            return self.contempt;
        }
        match (self.analysis_contempt, us) {
            (AnalysisContempt::Off, _) => 0,
            (AnalysisContempt::Both, _) => self.contempt,
            (AnalysisContempt::White, Color::Black) | (AnalysisContempt::Black, Color::White) => {
                -self.contempt
            }
            _ => self.contempt,
        }
    }
}

fn invalid(name: &str, value: &str) -> OptionError {
    OptionError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T, OptionError> {
    value.parse().map_err(|_| invalid(name, value))
}

fn parse_bool(name: &str, value: &str) -> Result<bool, OptionError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" => Ok(false),
        _ => Err(invalid(name, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_option_names_are_case_insensitive() {
        let mut config = EngineConfig::default();
        assert_eq!(config.set_option("multipv", "3"), Ok(None));
        assert_eq!(config.multi_pv, 3);
        assert_eq!(config.set_option("Analysis Contempt", "off"), Ok(None));
        assert_eq!(config.analysis_contempt, AnalysisContempt::Off);
        config.set_option("UCI_Chess960", "true").unwrap();
        assert!(config.chess960);
    }

    #[test]
    fn test_resource_options_report_changes() {
        let mut config = EngineConfig::default();
        assert_eq!(config.set_option("Threads", "4"), Ok(Some(OptionChange::ResizeThreads(4))));
        assert_eq!(config.set_option("Hash", "0"), Ok(Some(OptionChange::ResizeHash(1))));
        assert_eq!(config.hash_mb, 1);
        assert_eq!(config.set_option("Clear Hash", ""), Ok(Some(OptionChange::ClearHash)));
        assert_eq!(
            config.set_option("SyzygyPath", "/tmp/tb"),
            Ok(Some(OptionChange::ReloadTablebases))
        );
        assert_eq!(config.syzygy_path.as_deref(), Some("/tmp/tb"));
        config.set_option("SyzygyPath", "<empty>").unwrap();
        assert_eq!(config.syzygy_path, None);
    }

    #[test]
    fn test_set_option_rejects_unknown_and_garbage() {
        let mut config = EngineConfig::default();
        assert!(matches!(
            config.set_option("Skill Level", "3"),
            Err(OptionError::Unknown { .. })
        ));
        assert!(matches!(
            config.set_option("MultiPV", "many"),
            Err(OptionError::InvalidValue { .. })
        ));
        assert!(config.set_option("UCI_AnalyseMode", "maybe").is_err());
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_values_are_clamped() {
        let mut config = EngineConfig::default();
        config.set_option("Contempt", "1000").unwrap();
        assert_eq!(config.contempt, 100);
        config.set_option("MultiPV", "0").unwrap();
        assert_eq!(config.multi_pv, 1);
    }

    #[test]
    fn test_contempt_for_analysis_side() {
        let mut config = EngineConfig {
            contempt: 20,
            analyse_mode: true,
            ..EngineConfig::default()
        };
        assert_eq!(config.contempt_for(Color::White), 20);
        config.analysis_contempt = AnalysisContempt::White;
        assert_eq!(config.contempt_for(Color::White), 20);
        assert_eq!(config.contempt_for(Color::Black), -20);
        config.analysis_contempt = AnalysisContempt::Off;
        assert_eq!(config.contempt_for(Color::Black), 0);
        config.analyse_mode = false;
        assert_eq!(config.contempt_for(Color::Black), 20);
    }
}
