use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lzhuff::{CompressOptions, Compressor, Lzw};

fn sample() -> Vec<u8> {
    b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt \
      ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation ullamco \
      laboris nisi ut aliquip ex ea commodo consequat. "
        .repeat(256)
}

fn lzw(c: &mut Criterion) {
    let data = sample();
    let packed = Lzw::compress_vec(&data, &CompressOptions::default()).unwrap();

    c.bench_function("Lzw_compress", |b| {
        b.iter(|| black_box(Lzw::compress_vec(black_box(&data), &CompressOptions::default())))
    });

    c.bench_function("Lzw_decompress", |b| {
        b.iter(|| black_box(Lzw::decompress_slice(black_box(&packed))))
    });
}

criterion_group!(lz, lzw);
criterion_main!(lz);
