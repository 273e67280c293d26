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

//! Codec for the wire timestamp format of the automation boundary,
//! `DD Mon YYYY HH:MM:SS`, timezone-less and treated as UTC.

use crate::time::Epoch;
use snafu::prelude::*;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(display("malformed timestamp `{raw}`, expected `DD Mon YYYY HH:MM:SS`"))]
pub struct EpochFormatError {
    pub raw: String,
}

/// Renders an epoch in the boundary's fixed Gregorian format.
pub fn format_epoch(epoch: Epoch) -> String {
    let (y, m, d, hh, mm, ss, _) = epoch.to_gregorian_utc();
    format!(
        "{:02} {} {} {:02}:{:02}:{:02}",
        d,
        MONTHS[usize::from(m) - 1],
        y,
        hh,
        mm,
        ss
    )
}

pub fn parse_epoch(raw: &str) -> Result<Epoch, EpochFormatError> {
    let fail = || EpochFormatSnafu { raw }.build();

    let fields: Vec<&str> = raw.split_whitespace().collect();
    ensure!(fields.len() == 4, EpochFormatSnafu { raw });

    let day: u8 = fields[0].parse().map_err(|_| fail())?;
    let month = MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(fields[1]))
        .ok_or_else(fail)? as u8
        + 1;
    let year: i32 = fields[2].parse().map_err(|_| fail())?;

    let hms: Vec<&str> = fields[3].split(':').collect();
    ensure!(hms.len() == 3, EpochFormatSnafu { raw });
    let hh: u8 = hms[0].parse().map_err(|_| fail())?;
    let mm: u8 = hms[1].parse().map_err(|_| fail())?;
    let ss: u8 = hms[2].parse().map_err(|_| fail())?;

    ensure!(
        (1..=days_in_month(year, month)).contains(&day) && hh < 24 && mm < 60 && ss < 60,
        EpochFormatSnafu { raw }
    );

    Ok(Epoch::from_gregorian_utc(
        year,
        month,
        day,
        hh,
        mm,
        ss,
        0,
    ))
}

fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 => {
            if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

#[cfg(test)]
mod ut_timefmt {
    use super::*;

    #[test]
    fn parses_the_tutorial_epoch() {
        let epoch = parse_epoch("08 Jun 2016 15:14:26").unwrap();
        assert_eq!(epoch, Epoch::from_gregorian_utc_hms(2016, 6, 8, 15, 14, 26));
        assert_eq!(format_epoch(epoch), "08 Jun 2016 15:14:26");
    }

    #[test]
    fn rejects_garbage() {
        for raw in [
            "",
            "yesterday",
            "08 Jun 2016",
            "31 Feb 2016 00:00:00",
            "08 Jun 2016 24:00:00",
            "08 Frob 2016 00:00:00",
        ] {
            assert!(parse_epoch(raw).is_err(), "accepted `{raw}`");
        }
    }
}
