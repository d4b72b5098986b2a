//! Microbenchmarks for the adapter hot paths: sink growth, option
//! splitting, and a full Unicode conversion pass.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use nkf_bridge::{Converter, OutputSink, options};

fn bench_sink_append(c: &mut Criterion) {
    c.bench_function("sink_append_64k", |b| {
        b.iter(|| {
            let mut sink = OutputSink::new();
            for i in 0..65_536u32 {
                sink.put(i as u8);
            }
            black_box(sink.len())
        })
    });
}

fn bench_split_options(c: &mut Criterion) {
    let arg = "-x -w16L0 --ic=UTF-8 'fold width' \"quoted \\\" value\" --oc=UTF-16LE";
    c.bench_function("split_options", |b| {
        b.iter(|| {
            let mut count = 0usize;
            options::split_options(black_box(arg), |_| count += 1).unwrap();
            black_box(count)
        })
    });
}

fn bench_convert_utf8_to_utf16(c: &mut Criterion) {
    let input: Vec<u8> = "かな漢字変換ベンチマーク and some ascii too. "
        .as_bytes()
        .iter()
        .copied()
        .cycle()
        .take(64 * 1024)
        .collect();
    // Truncate to a char boundary so the cycled input stays valid UTF-8.
    let valid_len = match std::str::from_utf8(&input) {
        Ok(_) => input.len(),
        Err(e) => e.valid_up_to(),
    };
    let input = &input[..valid_len];

    c.bench_function("convert_utf8_to_utf16le_64k", |b| {
        let mut converter = Converter::default();
        b.iter(|| {
            let out = converter
                .convert("--oc=UTF-16LE", black_box(input))
                .unwrap();
            black_box(out.len())
        })
    });
}

criterion_group!(
    benches,
    bench_sink_append,
    bench_split_options,
    bench_convert_utf8_to_utf16
);
criterion_main!(benches);
