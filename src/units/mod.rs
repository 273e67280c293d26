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

use enum_iterator::Sequence;
use serde_derive::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Dimensions tracked by the application-wide unit preference table.
///
/// The external engine interprets every dimensioned read and write under the
/// unit currently active for that value's dimension. There is exactly one
/// active unit per dimension at any instant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Sequence, Serialize, Deserialize)]
pub enum Dimension {
    Angle,
    Time,
    Distance,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Angle => write!(f, "angle"),
            Self::Time => write!(f, "time"),
            Self::Distance => write!(f, "distance"),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
    /// Full revolutions, paired with [TimeUnit::Days] to enter mean motion in revs/day.
    Revolutions,
}

impl AngleUnit {
    /// Radians represented by 1.0 of this unit.
    pub fn rad_per_unit(self) -> f64 {
        match self {
            Self::Degrees => std::f64::consts::PI / 180.0,
            Self::Radians => 1.0,
            Self::Revolutions => std::f64::consts::TAU,
        }
    }

    pub const fn abbrev(self) -> &'static str {
        match self {
            Self::Degrees => "deg",
            Self::Radians => "rad",
            Self::Revolutions => "revs",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    #[default]
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Seconds represented by 1.0 of this unit.
    pub fn sec_per_unit(self) -> f64 {
        match self {
            Self::Seconds => 1.0,
            Self::Minutes => 60.0,
            Self::Hours => 3_600.0,
            Self::Days => 86_400.0,
        }
    }

    pub const fn abbrev(self) -> &'static str {
        match self {
            Self::Seconds => "sec",
            Self::Minutes => "min",
            Self::Hours => "hr",
            Self::Days => "day",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Meters,
}

impl DistanceUnit {
    /// Kilometers represented by 1.0 of this unit.
    pub fn km_per_unit(self) -> f64 {
        match self {
            Self::Kilometers => 1.0,
            Self::Meters => 1.0e-3,
        }
    }

    pub const fn abbrev(self) -> &'static str {
        match self {
            Self::Kilometers => "km",
            Self::Meters => "m",
        }
    }
}

/// The active unit for every dimension of the preference table.
///
/// One field per dimension makes the "exactly one active unit per dimension"
/// invariant structural rather than checked.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPreferences {
    #[serde(default)]
    pub angle: AngleUnit,
    #[serde(default)]
    pub time: TimeUnit,
    #[serde(default)]
    pub distance: DistanceUnit,
}

impl UnitPreferences {
    /// Swaps in the override and returns what was active for that dimension.
    fn swap(&mut self, ovr: UnitOverride) -> UnitOverride {
        match ovr {
            UnitOverride::Angle(u) => UnitOverride::Angle(std::mem::replace(&mut self.angle, u)),
            UnitOverride::Time(u) => UnitOverride::Time(std::mem::replace(&mut self.time, u)),
            UnitOverride::Distance(u) => {
                UnitOverride::Distance(std::mem::replace(&mut self.distance, u))
            }
        }
    }

    pub fn abbrev(&self, dim: Dimension) -> &'static str {
        match dim {
            Dimension::Angle => self.angle.abbrev(),
            Dimension::Time => self.time.abbrev(),
            Dimension::Distance => self.distance.abbrev(),
        }
    }
}

impl fmt::Display for UnitPreferences {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (pos, dim) in enum_iterator::all::<Dimension>().enumerate() {
            if pos > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", dim, self.abbrev(dim))?;
        }
        Ok(())
    }
}

/// The unit preference table shared between the session façade and the model
/// backend. Single-threaded by design, hence `Rc<RefCell<_>>`.
pub type SharedUnits = Rc<RefCell<UnitPreferences>>;

pub fn shared(prefs: UnitPreferences) -> SharedUnits {
    Rc::new(RefCell::new(prefs))
}

/// A requested temporary unit for one dimension.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnitOverride {
    Angle(AngleUnit),
    Time(TimeUnit),
    Distance(DistanceUnit),
}

impl UnitOverride {
    pub const fn dimension(self) -> Dimension {
        match self {
            Self::Angle(_) => Dimension::Angle,
            Self::Time(_) => Dimension::Time,
            Self::Distance(_) => Dimension::Distance,
        }
    }
}

/// Scoped override of the shared unit preference table.
///
/// On construction, the listed dimensions are switched to the requested units
/// and the previously active units are captured. Dropping the scope restores
/// the captured units in reverse order, so scopes nest correctly and
/// restoration runs on every exit path, early returns and unwinding included.
#[derive(Debug)]
pub struct UnitScope {
    table: SharedUnits,
    saved: Vec<UnitOverride>,
}

impl UnitScope {
    pub fn apply(table: &SharedUnits, overrides: &[UnitOverride]) -> Self {
        let mut saved = Vec::with_capacity(overrides.len());
        {
            let mut prefs = table.borrow_mut();
            for &ovr in overrides {
                saved.push(prefs.swap(ovr));
            }
            debug!("unit scope applied: {}", prefs);
        }
        Self {
            table: Rc::clone(table),
            saved,
        }
    }
}

impl Drop for UnitScope {
    fn drop(&mut self) {
        let mut prefs = self.table.borrow_mut();
        // Reverse order so that repeated overrides of one dimension unwind correctly.
        for &ovr in self.saved.iter().rev() {
            prefs.swap(ovr);
        }
    }
}

/// Runs `body` with the requested units active, restoring the prior units
/// afterwards whether `body` succeeds or fails.
pub fn with_units<T, E, F>(table: &SharedUnits, overrides: &[UnitOverride], body: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
{
    let _scope = UnitScope::apply(table, overrides);
    body()
}

#[cfg(test)]
mod ut_units {
    use super::*;

    #[test]
    fn scope_restores_on_error() {
        let table = shared(UnitPreferences::default());
        let out: Result<(), &str> = with_units(
            &table,
            &[
                UnitOverride::Angle(AngleUnit::Revolutions),
                UnitOverride::Time(TimeUnit::Days),
            ],
            || Err("engine refused"),
        );
        assert!(out.is_err());
        assert_eq!(*table.borrow(), UnitPreferences::default());
    }

    #[test]
    fn repeated_dimension_in_one_scope_unwinds() {
        let table = shared(UnitPreferences::default());
        {
            let _scope = UnitScope::apply(
                &table,
                &[
                    UnitOverride::Angle(AngleUnit::Radians),
                    UnitOverride::Angle(AngleUnit::Revolutions),
                ],
            );
            assert_eq!(table.borrow().angle, AngleUnit::Revolutions);
        }
        assert_eq!(table.borrow().angle, AngleUnit::Degrees);
    }

    #[test]
    fn display_lists_every_dimension() {
        let prefs = UnitPreferences::default();
        assert_eq!(format!("{prefs}"), "angle: deg, time: sec, distance: km");
    }
}
