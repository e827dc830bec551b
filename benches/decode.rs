use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gifanim::{Animation, Decoder};
use std::io::Cursor;

/// 10x10, four colors, one frame
const SIMPLE: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x0A, 0x00, 0x0A, 0x00, 0x91, 0x00,
    0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00,
    0x00, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00,
    0x00, 0x00, 0x0A, 0x00, 0x0A, 0x00, 0x00, 0x02, 0x16, 0x8C, 0x2D, 0x99,
    0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02, 0x75, 0xEC, 0x95, 0xFA, 0xA8,
    0xDE, 0x60, 0x8C, 0x04, 0x91, 0x4C, 0x01, 0x00, 0x3B,
];

fn decode_blocks(crit: &mut Criterion) {
    crit.bench_function("decode_blocks", |b| {
        b.iter(|| {
            let blocks =
                Decoder::new(Cursor::new(black_box(SIMPLE))).into_blocks();
            for block in blocks {
                black_box(block.unwrap());
            }
        })
    });
}

fn decode_steps(crit: &mut Criterion) {
    crit.bench_function("decode_steps", |b| {
        b.iter(|| {
            let steps = Decoder::new(Cursor::new(black_box(SIMPLE)));
            for step in steps {
                black_box(step.unwrap());
            }
        })
    });
}

fn decode_animation(crit: &mut Criterion) {
    crit.bench_function("decode_animation", |b| {
        b.iter(|| black_box(Animation::decode(black_box(SIMPLE)).unwrap()))
    });
}

criterion_group!(benches, decode_blocks, decode_steps, decode_animation);
criterion_main!(benches);
