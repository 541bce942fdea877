//! Parsing, op building and baking through the public format API.

use approx::assert_abs_diff_eq;
use chroma_formats::iridas_itx::{self, IridasItx};
use chroma_formats::spi1d::Spi1D;
use chroma_formats::{Baker, CachedFile, FileFormat, FileTransform, FormatError};
use chroma_lut::{Interpolation, identity_grid};
use chroma_ops::data::OpData;
use chroma_ops::{OpChain, OpKind, TransformDirection, create_min_max_op};

const SCENARIO_C: &str = "Version 1\nComponents 1\nLength 2\n{\n0.0\n1.0\n}\n";

fn itx_with_triples(count: usize) -> (String, Vec<f32>) {
    let grid = identity_grid(2);
    let mut values = Vec::new();
    let mut text = String::from("LUT_3D_SIZE 2\n");
    for (i, rgb) in grid.chunks_exact(3).take(count).enumerate() {
        // Distinct values so order mistakes show up.
        let v = [rgb[0] * 0.5 + i as f32 * 0.01, rgb[1] * 0.75, rgb[2]];
        text.push_str(&format!("{} {} {}\n", v[0], v[1], v[2]));
        values.extend_from_slice(&v);
    }
    (text, values)
}

fn identity_processor() -> chroma_ops::CpuProcessor {
    let mut chain = OpChain::new();
    create_min_max_op(&mut chain, [0.0; 3], [1.0; 3], TransformDirection::Forward).unwrap();
    chain.finalize().unwrap();
    chain.cpu_processor().unwrap()
}

#[test]
fn scenario_a_itx_keeps_red_fastest_order() {
    let (text, values) = itx_with_triples(8);
    let cached = IridasItx.read(&mut text.as_bytes(), "a.itx").unwrap();
    let CachedFile::Lut3D { lut } = cached else {
        panic!("expected a 3D LUT");
    };
    assert_eq!(lut.grid_size(), 2);
    assert_eq!(lut.values(), values.as_slice());
}

#[test]
fn scenario_b_itx_short_body() {
    let (text, _) = itx_with_triples(7);
    let err = IridasItx.read(&mut text.as_bytes(), "b.itx").unwrap_err();
    assert!(matches!(
        err,
        FormatError::ShapeMismatch {
            expected: 8,
            found: 7,
            ..
        }
    ));
    assert!(err.to_string().contains("found 7, expected 8"));
}

#[test]
fn scenario_c_spi1d_defaults_domain() {
    let cached = Spi1D.read(&mut SCENARIO_C.as_bytes(), "c.spi1d").unwrap();
    let CachedFile::Lut1D {
        lut,
        from_min,
        from_max,
    } = cached
    else {
        panic!("expected a 1D LUT");
    };
    assert_eq!(lut.length(), 2);
    assert_eq!(lut.values(), &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
    assert_eq!((from_min, from_max), (0.0, 1.0));
}

fn spi1d_chain(text: &str, direction: TransformDirection) -> OpChain {
    let cached = Spi1D.read(&mut text.as_bytes(), "d.spi1d").unwrap();
    let mut chain = OpChain::new();
    Spi1D
        .build_ops(&mut chain, &cached, &FileTransform::new("d.spi1d"), direction)
        .unwrap();
    chain
}

fn lut1d_direction(chain: &OpChain, index: usize) -> TransformDirection {
    match chain.ops()[index].data() {
        OpData::Lut1D(d) => d.direction(),
        other => panic!("expected a LUT1D op, got {}", other.kind()),
    }
}

#[test]
fn scenario_d_forward_and_inverse_order() {
    let forward = spi1d_chain(SCENARIO_C, TransformDirection::Forward);
    let kinds: Vec<OpKind> = forward.ops().iter().map(|op| op.kind()).collect();
    assert_eq!(kinds, [OpKind::Range, OpKind::Lut1D]);
    assert_eq!(lut1d_direction(&forward, 1), TransformDirection::Forward);

    let inverse = spi1d_chain(SCENARIO_C, TransformDirection::Inverse);
    let kinds: Vec<OpKind> = inverse.ops().iter().map(|op| op.kind()).collect();
    assert_eq!(kinds, [OpKind::Lut1D, OpKind::Range]);
    assert_eq!(lut1d_direction(&inverse, 0), TransformDirection::Inverse);
}

#[test]
fn scenario_d_inverse_range_maps_back_to_domain() {
    let text = "Version 1\nFrom 0 2\nComponents 1\nLength 2\n{\n0.0\n1.0\n}\n";
    let forward = spi1d_chain(text, TransformDirection::Forward);
    let inverse = spi1d_chain(text, TransformDirection::Inverse);

    let OpData::Range(fwd) = forward.ops()[0].data() else {
        panic!("expected a range op first");
    };
    let OpData::Range(inv) = inverse.ops()[1].data() else {
        panic!("expected a range op last");
    };
    assert_abs_diff_eq!(fwd.scale()[0], 0.5);
    assert_abs_diff_eq!(inv.scale()[0], 2.0);
    assert!(fwd.is_inverse_of(inv));
}

#[test]
fn transform_direction_composes_with_request() {
    let cached = Spi1D.read(&mut SCENARIO_C.as_bytes(), "e.spi1d").unwrap();
    let transform = FileTransform::new("e.spi1d").with_direction(TransformDirection::Inverse);

    let mut chain = OpChain::new();
    Spi1D
        .build_ops(&mut chain, &cached, &transform, TransformDirection::Inverse)
        .unwrap();
    assert_eq!(chain.ops()[0].kind(), OpKind::Range);

    let unknown = transform.with_direction(TransformDirection::Unknown);
    let mut chain = OpChain::new();
    let err = Spi1D
        .build_ops(&mut chain, &cached, &unknown, TransformDirection::Forward)
        .unwrap_err();
    assert!(err.to_string().contains("unspecified transform direction"));
    assert!(chain.is_empty());
}

#[test]
fn itx_uses_transform_interpolation() {
    let (text, _) = itx_with_triples(8);
    let cached = IridasItx.read(&mut text.as_bytes(), "t.itx").unwrap();
    let transform = FileTransform::new("t.itx").with_interpolation(Interpolation::Tetrahedral);
    let mut chain = OpChain::new();
    IridasItx
        .build_ops(&mut chain, &cached, &transform, TransformDirection::Inverse)
        .unwrap();
    let OpData::Lut3D(data) = chain.ops()[0].data() else {
        panic!("expected a LUT3D op");
    };
    assert_eq!(data.interpolation(), Interpolation::Tetrahedral);
    assert_eq!(data.direction(), TransformDirection::Inverse);
}

#[test]
fn itx_rejects_a_1d_cache_entry() {
    let cached = Spi1D.read(&mut SCENARIO_C.as_bytes(), "wrong.spi1d").unwrap();
    let mut chain = OpChain::new();
    let err = IridasItx
        .build_ops(&mut chain, &cached, &FileTransform::new("wrong.itx"), TransformDirection::Forward)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "contract violation: Cannot build Iridas .itx Op. Invalid cache type."
    );
}

#[test]
fn scenario_e_default_cube_size() {
    let text = Baker::new("iridas_itx").bake(&identity_processor()).unwrap();
    let size = iridas_itx::DEFAULT_CUBE_SIZE;
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(format!("LUT_3D_SIZE {size}").as_str()));
    let rows: Vec<&str> = lines.take_while(|l| !l.is_empty()).collect();
    assert_eq!(rows.len(), size.pow(3));
    assert_eq!(rows[1], format!("{:.6} 0.000000 0.000000", 1.0 / (size - 1) as f32));
    assert!(text.ends_with("\n\n"));
}

#[test]
fn scenario_e_cube_size_clamps_to_two() {
    let text = Baker::new("iridas_itx").with_cube_size(0).bake(&identity_processor()).unwrap();
    assert!(text.starts_with("LUT_3D_SIZE 2\n"));
    assert_eq!(text.lines().filter(|l| !l.is_empty()).count(), 1 + 8);
}

#[test]
fn oversized_cube_is_rejected() {
    for size in [iridas_itx::MAX_CUBE_SIZE + 1, usize::MAX] {
        let err = Baker::new("iridas_itx")
            .with_cube_size(size)
            .bake(&identity_processor())
            .unwrap_err();
        assert!(matches!(err, FormatError::Unsupported(_)));
        assert!(err.to_string().contains(&size.to_string()));
    }
}

#[test]
fn baked_identity_reparses_to_identity_grid() {
    let size = 9;
    let text = Baker::new("iridas_itx").with_cube_size(size).bake(&identity_processor()).unwrap();
    let lut = iridas_itx::parse_itx(&mut text.as_bytes(), "baked.itx").unwrap();
    assert_eq!(lut.grid_size(), size);
    for (got, want) in lut.values().iter().zip(identity_grid(size)) {
        assert_abs_diff_eq!(*got, want, epsilon = 1e-6);
    }
}

#[test]
fn baking_applies_the_processor() {
    let mut chain = OpChain::new();
    create_min_max_op(&mut chain, [0.0; 3], [2.0; 3], TransformDirection::Forward).unwrap();
    chain.finalize().unwrap();
    let text = Baker::new("iridas_itx")
        .with_cube_size(2)
        .bake(&chain.cpu_processor().unwrap())
        .unwrap();
    let last = text.lines().filter(|l| !l.is_empty()).last().unwrap();
    assert_eq!(last, "0.500000 0.500000 0.500000");
}
