/*
    Orrery, typed automation for astrodynamics applications
    Copyright (C) 2023 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::units::UnitPreferences;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_derive::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use typed_builder::TypedBuilder;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse YAML configuration file: {0}")]
    ParseError(#[source] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PartialEq for ConfigError {
    /// No two configuration errors match
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

pub trait ConfigRepr: Debug + Sized + Serialize + DeserializeOwned {
    /// Builds the configuration representation from the path to a yaml
    fn load<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).map_err(ConfigError::ParseError)
    }

    /// Builds the configuration representation from a yaml string
    fn loads(data: &str) -> Result<Self, ConfigError> {
        debug!("Loading YAML:\n{data}");
        serde_yaml::from_str(data).map_err(ConfigError::ParseError)
    }
}

/// Window placement and visibility of the driven application.
///
/// The geometry values are produced by the caller (e.g. from a screen query);
/// this layer only forwards them at connection time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct WindowCfg {
    /// Show the application window. Headless engines ignore this.
    #[builder(default = true)]
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Leave the user in control of the window while the session drives it.
    #[builder(default = true)]
    #[serde(default = "default_visible")]
    pub user_control: bool,
    #[builder(default = 0)]
    #[serde(default)]
    pub top: u32,
    #[builder(default = 0)]
    #[serde(default)]
    pub left: u32,
    #[builder(default = 1280)]
    #[serde(default = "default_width")]
    pub width: u32,
    #[builder(default = 720)]
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_visible() -> bool {
    true
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

impl Default for WindowCfg {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Everything needed to open a session: window placement and the initial unit
/// preferences of the application instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct SessionCfg {
    #[builder(default)]
    #[serde(default)]
    pub window: WindowCfg,
    #[builder(default)]
    #[serde(default)]
    pub units: UnitPreferences,
}

impl SessionCfg {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidConfig(format!(
                "degenerate window geometry {}x{}",
                self.window.width, self.window.height
            )));
        }
        Ok(())
    }
}

impl ConfigRepr for SessionCfg {}
