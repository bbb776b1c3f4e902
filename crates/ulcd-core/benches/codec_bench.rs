//! Criterion benchmarks for the SPE command codec.
//!
//! The interactive draw loop encodes a `touch_Get` triple and a
//! `gfx_CircleFilled` on every iteration, so those are the hot paths.
//!
//! Run with:
//! ```bash
//! cargo bench --package ulcd-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ulcd_core::protocol::{TouchQuery, ACK};
use ulcd_core::{decode_reply, encode_command, Colour, SpeCommand};

fn bench_encode(c: &mut Criterion) {
    let circle = SpeCommand::CircleFilled {
        x: 240,
        y: 136,
        radius: 30,
        colour: Colour::WHITE,
    };
    let text = SpeCommand::PutString("hello from ulcdctl\n".to_string());

    let mut group = c.benchmark_group("encode");
    group.bench_function("circle_filled", |b| {
        b.iter(|| encode_command(black_box(&circle)).unwrap())
    });
    group.bench_function("putstr", |b| b.iter(|| encode_command(black_box(&text)).unwrap()));
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let touch = SpeCommand::TouchGet(TouchQuery::Status);
    let reply = [ACK, 0x00, 0x03];

    c.bench_function("decode/touch_word", |b| {
        b.iter(|| decode_reply(black_box(&touch), black_box(&reply)).unwrap())
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
