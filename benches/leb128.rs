use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use protodyn::leb128::{decode_varint, encode_varint};

fn varint_decoding(c: &mut Criterion) {
    let values: Vec<_> = vec![
        1u64,
        0x0000_0000_0000_0080,
        0x0000_0000_0000_8000,
        0x0000_0000_0080_0000,
        0x0000_0000_8000_0000,
        0x8000_0000_0000_0000,
    ]
    .into_iter()
    .map(|value| {
        let mut buffer = Vec::new();
        let len = encode_varint(value, &mut buffer);
        (buffer, len)
    })
    .collect();

    let mut group = c.benchmark_group("varint_decode");
    for (data, len) in &values {
        group.bench_with_input(BenchmarkId::from_parameter(len), &data, |b, data| {
            b.iter(|| {
                let value = decode_varint(&mut &data[..]);
                std::hint::black_box(value)
            })
        });
    }
}

fn varint_encoding(c: &mut Criterion) {
    let values = [1u64, 0x8000, 0x8000_0000, 0x8000_0000_0000_0000];

    let mut group = c.benchmark_group("varint_encode");
    for value in values {
        group.bench_with_input(BenchmarkId::from_parameter(value), &value, |b, &value| {
            let mut buffer = Vec::with_capacity(16);
            b.iter(|| {
                buffer.clear();
                let len = encode_varint(std::hint::black_box(value), &mut buffer);
                std::hint::black_box(len)
            })
        });
    }
}

criterion_group!(benches, varint_decoding, varint_encoding);
criterion_main!(benches);
