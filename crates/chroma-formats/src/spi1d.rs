//! Sony Pictures Imageworks 1D LUT format (`.spi1d`).
//!
//! ```text
//! Version 1
//! From 0.0 1.0
//! Length 4
//! Components 1
//! {
//!     0.0
//!     0.1
//!     0.5
//!     1.0
//! }
//! ```
//!
//! Header tags are case-insensitive. `From` defaults to `0 1`. One-component
//! tables drive all three channels; two-component tables leave blue at zero.

use std::io::BufRead;
use std::sync::Arc;

use chroma_lut::Lut1D;
use chroma_ops::{
    OpChain, OpError, TransformDirection, create_lut1d_op, create_min_max_op, resolve_direction,
};

use crate::format::{CachedFile, FileFormat, FormatCapabilities, FormatInfo};
use crate::{FileTransform, FormatResult, ParseError};

const FORMAT_LABEL: &str = ".spi1d";

/// Reader for `.spi1d` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spi1D;

impl FileFormat for Spi1D {
    fn format_info(&self) -> Vec<FormatInfo> {
        vec![FormatInfo {
            name: "spi1d",
            extension: "spi1d",
            capabilities: FormatCapabilities {
                can_read: true,
                can_bake: false,
            },
        }]
    }

    fn read(&self, reader: &mut dyn BufRead, source_name: &str) -> FormatResult<CachedFile> {
        let parsed = parse_spi1d(reader, source_name)?;
        Ok(CachedFile::Lut1D {
            lut: Arc::new(parsed.lut),
            from_min: parsed.from_min,
            from_max: parsed.from_max,
        })
    }

    /// Forward is `[range, lut]`; inverse reverses the order and inverts
    /// both ops.
    fn build_ops(
        &self,
        chain: &mut OpChain,
        cached: &CachedFile,
        transform: &FileTransform,
        direction: TransformDirection,
    ) -> FormatResult<()> {
        let CachedFile::Lut1D {
            lut,
            from_min,
            from_max,
        } = cached
        else {
            return Err(OpError::contract("Cannot build Spi1D Op. Invalid cache type.").into());
        };
        let dir = resolve_direction(direction, transform.direction, "Spi1D Op")?;
        let min = [*from_min; 3];
        let max = [*from_max; 3];

        // Build into a scratch chain so a failure leaves `chain` untouched.
        let mut ops = OpChain::new();
        match dir {
            TransformDirection::Inverse => {
                create_lut1d_op(&mut ops, Arc::clone(lut), transform.interpolation, dir)?;
                create_min_max_op(&mut ops, min, max, dir)?;
            }
            _ => {
                create_min_max_op(&mut ops, min, max, dir)?;
                create_lut1d_op(&mut ops, Arc::clone(lut), transform.interpolation, dir)?;
            }
        }
        chain.extend(ops)?;
        Ok(())
    }
}

/// Contents of a parsed `.spi1d` file.
#[derive(Debug, Clone, PartialEq)]
pub struct Spi1DFile {
    /// Samples expanded to three channels.
    pub lut: Lut1D,
    /// Lower bound of the input domain.
    pub from_min: f64,
    /// Upper bound of the input domain.
    pub from_max: f64,
}

/// Parses SPI1D text.
pub fn parse_spi1d(reader: &mut dyn BufRead, source_name: &str) -> FormatResult<Spi1DFile> {
    let error = |message: &str| ParseError::new(FORMAT_LABEL, source_name, message);

    let mut version: Option<u32> = None;
    let mut from = (0.0f64, 1.0f64);
    let mut length: Option<usize> = None;
    let mut components: Option<usize> = None;
    // (length, components) once the opening brace is seen.
    let mut body: Option<(usize, usize)> = None;
    let mut values: Vec<f32> = Vec::new();
    let mut entries = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some((length, components)) = body {
            if trimmed.starts_with('}') {
                break;
            }
            let parsed: Option<Vec<f32>> = trimmed
                .split_whitespace()
                .map(|s| s.parse().ok())
                .collect();
            let sample = match parsed.as_deref() {
                Some(v) if v.len() == components => expand(v),
                _ => return Err(error("Malformed LUT line.").at_line(line_no, line.as_str()).into()),
            };
            if entries == length {
                return Err(error("Too many entries found.").at_line(line_no, line.as_str()).into());
            }
            values.extend_from_slice(&sample);
            entries += 1;
            continue;
        }

        if trimmed.starts_with('{') {
            let header = check_header(version, length, components)
                .map_err(|message| error(message))?;
            values.reserve(3 * header.0.min(1 << 20));
            body = Some(header);
            continue;
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        let at = |message: &str| error(message).at_line(line_no, line.as_str());
        match parts[0].to_ascii_lowercase().as_str() {
            "version" => {
                let Some(v) = single(&parts) else {
                    return Err(at("Invalid 'Version' Tag.").into());
                };
                if v != 1 {
                    return Err(at("Only format version 1 supported.").into());
                }
                version = Some(v);
            }
            "from" => {
                let parsed = match parts.as_slice() {
                    [_, lo, hi] => lo.parse::<f64>().ok().zip(hi.parse::<f64>().ok()),
                    _ => None,
                };
                let Some(range) = parsed else {
                    return Err(at("Invalid 'From' Tag.").into());
                };
                from = range;
            }
            "length" => {
                let Some(n) = single(&parts) else {
                    return Err(at("Invalid 'Length' Tag.").into());
                };
                length = Some(n);
            }
            "components" => {
                let Some(n) = single::<usize>(&parts) else {
                    return Err(at("Invalid 'Components' Tag.").into());
                };
                if !(1..=3).contains(&n) {
                    return Err(at("Components must be [1,2,3].").into());
                }
                components = Some(n);
            }
            _ => {
                tracing::trace!(source = source_name, line = line_no, "skipping unknown spi1d header line");
            }
        }
    }

    let (length, _) = check_header(version, length, components).map_err(|message| error(message))?;
    if entries < length {
        return Err(error("Not enough entries found.").into());
    }

    tracing::trace!(source = source_name, length, "parsed spi1d");
    Ok(Spi1DFile {
        lut: Lut1D::from_values(length, values)?,
        from_min: from.0,
        from_max: from.1,
    })
}

fn check_header(
    version: Option<u32>,
    length: Option<usize>,
    components: Option<usize>,
) -> Result<(usize, usize), &'static str> {
    if version.is_none() {
        return Err("Could not find 'Version' Tag.");
    }
    let Some(length) = length else {
        return Err("Could not find 'Length' Tag.");
    };
    let Some(components) = components else {
        return Err("Could not find 'Components' Tag.");
    };
    Ok((length, components))
}

fn single<T: std::str::FromStr>(parts: &[&str]) -> Option<T> {
    match parts {
        [_, v] => v.parse().ok(),
        _ => None,
    }
}

fn expand(v: &[f32]) -> [f32; 3] {
    match *v {
        [x] => [x, x, x],
        [x, y] => [x, y, 0.0],
        [x, y, z] => [x, y, z],
        _ => [0.0; 3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FormatError;

    fn parse(text: &str) -> FormatResult<Spi1DFile> {
        parse_spi1d(&mut text.as_bytes(), "test.spi1d")
    }

    fn parse_message(text: &str) -> (String, Option<usize>) {
        match parse(text).unwrap_err() {
            FormatError::Parse(err) => (err.message, err.line),
            other => panic!("expected a parse error, got {other}"),
        }
    }

    #[test]
    fn two_component_body() {
        let file = parse("Version 1\nFrom -1 2\nLength 2\nComponents 2\n{\n0.1 0.2\n0.3 0.4\n}\n").unwrap();
        assert_eq!(file.lut.values(), &[0.1, 0.2, 0.0, 0.3, 0.4, 0.0]);
        assert_eq!((file.from_min, file.from_max), (-1.0, 2.0));
    }

    #[test]
    fn three_component_body_with_comments() {
        let text = "# curve\nversion 1\nlength 1\ncomponents 3\n{\n  # one entry\n  0.5 0.25 0.125\n}\n";
        let file = parse(text).unwrap();
        assert_eq!(file.lut.values(), &[0.5, 0.25, 0.125]);
    }

    #[test]
    fn only_version_one() {
        let (msg, line) = parse_message("Version 2\nLength 1\nComponents 1\n{\n0\n}\n");
        assert_eq!(msg, "Only format version 1 supported.");
        assert_eq!(line, Some(1));
    }

    #[test]
    fn components_out_of_range() {
        let (msg, _) = parse_message("Version 1\nLength 1\nComponents 4\n{\n0 0 0 0\n}\n");
        assert_eq!(msg, "Components must be [1,2,3].");
    }

    #[test]
    fn missing_version() {
        let (msg, line) = parse_message("Length 1\nComponents 1\n{\n0\n}\n");
        assert_eq!(msg, "Could not find 'Version' Tag.");
        assert_eq!(line, None);
    }

    #[test]
    fn malformed_body_line() {
        let (msg, line) = parse_message("Version 1\nLength 2\nComponents 1\n{\n0.0 0.5\n1.0\n}\n");
        assert_eq!(msg, "Malformed LUT line.");
        assert_eq!(line, Some(5));
    }

    #[test]
    fn short_body() {
        let (msg, line) = parse_message("Version 1\nLength 3\nComponents 1\n{\n0.0\n1.0\n}\n");
        assert_eq!(msg, "Not enough entries found.");
        assert_eq!(line, None);
    }

    #[test]
    fn long_body() {
        let (msg, line) = parse_message("Version 1\nLength 1\nComponents 1\n{\n0.0\n1.0\n}\n");
        assert_eq!(msg, "Too many entries found.");
        assert_eq!(line, Some(6));
    }

    #[test]
    fn bad_from_tag() {
        let (msg, _) = parse_message("Version 1\nFrom 0\nLength 1\nComponents 1\n{\n0\n}\n");
        assert_eq!(msg, "Invalid 'From' Tag.");
    }

    #[test]
    fn wrong_cache_kind_is_a_contract_violation() {
        let lut = Arc::new(chroma_lut::Lut3D::identity(2).unwrap());
        let mut chain = OpChain::new();
        let err = Spi1D
            .build_ops(
                &mut chain,
                &CachedFile::Lut3D { lut },
                &FileTransform::new("x.spi1d"),
                TransformDirection::Forward,
            )
            .unwrap_err();
        assert!(matches!(err, FormatError::Op(OpError::ContractViolation(_))));
        assert!(chain.is_empty());
    }
}
