//! Iridas ITX 3D LUT format.
//!
//! Simple 3D LUT format used by Iridas/Adobe SpeedGrade.
//!
//! # Format
//!
//! ```text
//! LUT_3D_SIZE 17
//! # optional comment
//! 0.0 0.0 0.0
//! 1.0 0.0 0.0
//! ...
//! ```
//!
//! - Red coordinate changes fastest, then green, then blue
//! - Values are floating point RGB triplets
//! - Lines starting with `#` are comments
//! - The size tag is matched case-insensitively

use std::fmt::Write as _;
use std::io::BufRead;
use std::sync::Arc;

use chroma_lut::{Lut3D, identity_grid};
use chroma_ops::{CpuProcessor, OpChain, OpError, TransformDirection, create_lut3d_op, resolve_direction};

use crate::format::{BakeOptions, CachedFile, FileFormat, FormatCapabilities, FormatInfo};
use crate::{FileTransform, FormatError, FormatResult, ParseError};

const FORMAT_LABEL: &str = ".itx";

/// Cube edge used when a bake does not ask for one.
pub const DEFAULT_CUBE_SIZE: usize = 64;

/// Largest cube edge a bake accepts.
pub const MAX_CUBE_SIZE: usize = 256;

/// Reader and baker for `.itx` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct IridasItx;

impl FileFormat for IridasItx {
    fn format_info(&self) -> Vec<FormatInfo> {
        vec![FormatInfo {
            name: "iridas_itx",
            extension: "itx",
            capabilities: FormatCapabilities {
                can_read: true,
                can_bake: true,
            },
        }]
    }

    fn read(&self, reader: &mut dyn BufRead, source_name: &str) -> FormatResult<CachedFile> {
        let lut = parse_itx(reader, source_name)?;
        Ok(CachedFile::Lut3D { lut: Arc::new(lut) })
    }

    fn build_ops(
        &self,
        chain: &mut OpChain,
        cached: &CachedFile,
        transform: &FileTransform,
        direction: TransformDirection,
    ) -> FormatResult<()> {
        let CachedFile::Lut3D { lut } = cached else {
            return Err(OpError::contract("Cannot build Iridas .itx Op. Invalid cache type.").into());
        };
        let dir = resolve_direction(direction, transform.direction, "Iridas .itx Op")?;
        create_lut3d_op(chain, Arc::clone(lut), transform.interpolation, dir)?;
        Ok(())
    }

    fn bake(&self, processor: &CpuProcessor, options: &BakeOptions) -> FormatResult<String> {
        let size = options.cube_size.unwrap_or(DEFAULT_CUBE_SIZE).max(2);
        if size > MAX_CUBE_SIZE {
            return Err(FormatError::Unsupported(format!(
                "cube size {size} exceeds the maximum of {MAX_CUBE_SIZE}"
            )));
        }
        let mut grid = identity_grid(size);
        processor.apply(&mut grid, 3)?;

        let mut out = String::with_capacity(grid.len() * 10 + 32);
        // Writing into a String cannot fail.
        let _ = writeln!(out, "LUT_3D_SIZE {size}");
        for rgb in grid.chunks_exact(3) {
            let _ = writeln!(out, "{:.6} {:.6} {:.6}", rgb[0], rgb[1], rgb[2]);
        }
        out.push('\n');

        tracing::debug!(size, bytes = out.len(), "baked iridas itx cube");
        Ok(out)
    }
}

/// Parses ITX text into a cube.
pub fn parse_itx(reader: &mut dyn BufRead, source_name: &str) -> FormatResult<Lut3D> {
    let mut size: Option<usize> = None;
    let mut raw: Vec<f32> = Vec::new();
    let mut triples = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        if parts[0].eq_ignore_ascii_case("LUT_3D_SIZE") {
            let parsed = match parts.as_slice() {
                [_, n] => n.parse::<usize>().ok(),
                _ => None,
            };
            let Some(n) = parsed else {
                return Err(ParseError::new(FORMAT_LABEL, source_name, "Malformed LUT_3D_SIZE tag.")
                    .at_line(line_no, line.as_str())
                    .into());
            };
            size = Some(n);
            // Cap the up-front allocation; the count check runs at the end.
            raw.reserve(3 * n.saturating_pow(3).min(1 << 20));
            continue;
        }

        // Lines before the size tag carry no samples.
        if size.is_none() {
            continue;
        }

        let values: Option<Vec<f32>> = parts.iter().map(|s| s.parse().ok()).collect();
        match values.as_deref() {
            Some([r, g, b]) => {
                raw.extend_from_slice(&[*r, *g, *b]);
                triples += 1;
            }
            _ => {
                return Err(
                    ParseError::new(FORMAT_LABEL, source_name, "Malformed color triples specified.")
                        .at_line(line_no, line.as_str())
                        .into(),
                );
            }
        }
    }

    let Some(size) = size else {
        return Err(ParseError::new(FORMAT_LABEL, source_name, "No 3D LUT found.").into());
    };

    let expected = size.saturating_pow(3);
    if triples != expected {
        return Err(FormatError::ShapeMismatch {
            source_name: source_name.to_string(),
            expected,
            found: triples,
        });
    }

    tracing::trace!(source = source_name, size, "parsed iridas itx");
    Ok(Lut3D::from_values(size, raw)?)
}
