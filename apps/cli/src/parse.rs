// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line coordinate syntax: `x,y,z` points and `;`-separated loops.

use anyhow::{bail, Context, Result};
use geowrap::{LoopInput, Point3};

/// Parses `"x,y,z"`.
pub fn parse_point(text: &str) -> Result<Point3<f64>> {
    let coords = text
        .split(',')
        .map(|c| {
            c.trim()
                .parse::<f64>()
                .with_context(|| format!("invalid coordinate {c:?} in point {text:?}"))
        })
        .collect::<Result<Vec<f64>>>()?;
    match coords.as_slice() {
        [x, y, z] => Ok(Point3::new(*x, *y, *z)),
        _ => bail!("point {text:?} needs three coordinates, got {}", coords.len()),
    }
}

/// Parses `"x,y,z;x,y,z;..."`. Empty segments, such as a trailing `;`, are
/// ignored.
pub fn parse_loop(text: &str) -> Result<LoopInput> {
    text.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_point)
        .collect()
}
