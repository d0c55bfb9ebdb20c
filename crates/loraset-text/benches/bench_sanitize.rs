use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use loraset_text::{sanitize_caption, CaptionSanitizer};

const CAPTION: &str = "The image is a close-up portrait of a young woman with long dark hair. \
She is wearing a white blouse and her hair is pulled back. The background is blurred, \
and the woman is looking directly at the camera with a slight smile on her face.";

fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sanitize");

    for repeat in [1, 8, 64].iter() {
        let caption = CAPTION.repeat(*repeat);
        group.throughput(criterion::Throughput::Bytes(caption.len() as u64));

        let sanitizer = CaptionSanitizer::new("sks");

        group.bench_with_input(BenchmarkId::new("reused", repeat), &caption, |b, c| {
            b.iter(|| black_box(sanitizer.sanitize(c)))
        });

        group.bench_with_input(BenchmarkId::new("one_shot", repeat), &caption, |b, c| {
            b.iter(|| black_box(sanitize_caption(c, "sks")))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sanitize);
criterion_main!(benches);
