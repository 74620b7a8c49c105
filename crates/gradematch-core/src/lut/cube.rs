//! Adobe/Resolve `.cube` 3D LUT files.
//!
//! # Format
//!
//! ```text
//! TITLE "gradematch"
//! LUT_3D_SIZE 33
//!
//! DOMAIN_MIN 0.0 0.0 0.0
//! DOMAIN_MAX 1.0 1.0 1.0
//!
//! 0.000000 0.000000 0.000000
//! ...
//! 1.000000 1.000000 1.000000
//! ```
//!
//! Data rows are red-fastest, which is also [`Lut3D`]'s memory order.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use super::{Lut3D, MAX_SIZE};
use crate::error::{GradeError, Result};

/// Write `lut` in `.cube` syntax.
pub fn write_to(writer: &mut dyn Write, lut: &Lut3D, title: &str) -> std::io::Result<()> {
    writeln!(writer, "TITLE \"{}\"", sanitize_title(title))?;
    writeln!(writer, "LUT_3D_SIZE {}", lut.size)?;
    writeln!(writer)?;
    writeln!(writer, "DOMAIN_MIN 0.0 0.0 0.0")?;
    writeln!(writer, "DOMAIN_MAX 1.0 1.0 1.0")?;
    writeln!(writer)?;
    for rgb in &lut.data {
        writeln!(writer, "{:.6} {:.6} {:.6}", rgb[0], rgb[1], rgb[2])?;
    }
    Ok(())
}

/// Write `lut` to `path` atomically.
pub fn write(lut: &Lut3D, path: &Path, title: &str) -> Result<()> {
    crate::atomic::write_with(path, "writing cube", |w| write_to(w, lut, title))?;
    tracing::info!(path = %path.display(), size = lut.size, "wrote cube LUT");
    Ok(())
}

/// Read a 3D `.cube` file.
pub fn read(path: &Path) -> Result<Lut3D> {
    let file = File::open(path).map_err(|e| GradeError::io("reading cube", path, e))?;
    parse(BufReader::new(file)).map_err(|err| match err {
        GradeError::Io { source, .. } => GradeError::io("reading cube", path, source),
        other => other,
    })
}

/// Parse `.cube` text. Comments, blank lines and `TITLE` are skipped; only
/// the unit domain is accepted.
pub fn parse<R: BufRead>(reader: R) -> Result<Lut3D> {
    let mut size: Option<usize> = None;
    let mut data = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| GradeError::io("reading cube", Path::new("<stream>"), e))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("TITLE") {
            continue;
        }
        let lineno = number + 1;
        if let Some(rest) = line.strip_prefix("LUT_3D_SIZE") {
            let n = rest.trim().parse::<usize>().map_err(|_| {
                GradeError::format("cube", format!("line {lineno}: invalid LUT_3D_SIZE"))
            })?;
            if !(2..=MAX_SIZE).contains(&n) {
                return Err(GradeError::format(
                    "cube",
                    format!("line {lineno}: LUT_3D_SIZE {n} outside 2..={MAX_SIZE}"),
                ));
            }
            size = Some(n);
            data.reserve(n.pow(3).min(1 << 20));
        } else if line.starts_with("LUT_1D_SIZE") {
            return Err(GradeError::format("cube", "expected a 3D LUT, found 1D"));
        } else if let Some(rest) = line.strip_prefix("DOMAIN_MIN") {
            expect_domain(rest, 0.0, lineno)?;
        } else if let Some(rest) = line.strip_prefix("DOMAIN_MAX") {
            expect_domain(rest, 1.0, lineno)?;
        } else {
            data.push(parse_triple(line, lineno)?);
        }
    }

    let size = size.ok_or_else(|| GradeError::format("cube", "missing LUT_3D_SIZE"))?;
    Lut3D::from_data(size, data)
        .map_err(|e| GradeError::format("cube", e.to_string()))
}

fn parse_triple(line: &str, lineno: usize) -> Result<[f64; 3]> {
    let mut values = line.split_whitespace().map(str::parse::<f64>);
    let mut next = || match values.next() {
        Some(Ok(v)) if v.is_finite() => Ok(v),
        _ => Err(GradeError::format(
            "cube",
            format!("line {lineno}: expected three numbers, got `{line}`"),
        )),
    };
    let triple = [next()?, next()?, next()?];
    if values.next().is_some() {
        return Err(GradeError::format(
            "cube",
            format!("line {lineno}: trailing values in `{line}`"),
        ));
    }
    Ok(triple)
}

fn expect_domain(rest: &str, expected: f64, lineno: usize) -> Result<()> {
    let domain = parse_triple(rest, lineno)?;
    if domain.iter().any(|&v| (v - expected).abs() > 1e-9) {
        return Err(GradeError::format(
            "cube",
            format!("line {lineno}: only the [0, 1] domain is supported"),
        ));
    }
    Ok(())
}

/// Titles are single-line and may not contain `"`.
fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '"' => '\'',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect()
}
