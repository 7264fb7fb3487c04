use std::hint::black_box;

use backed_http::codec::RequestDecoder;
use backed_http::parser::parse_request;
use bencher::fixtures;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use tokio_util::bytes::BytesMut;
use tokio_util::codec::Decoder;

fn bench_fixture<F>(criterion: &mut Criterion, group_name: &str, mut routine: F)
where
    F: FnMut(&mut RequestDecoder, &mut BytesMut),
{
    let mut group = criterion.benchmark_group(group_name);

    for fixture in fixtures() {
        group.throughput(Throughput::Bytes(fixture.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fixture.name()), &fixture, |b, fixture| {
            let mut request_decoder = RequestDecoder::new();
            b.iter_batched_ref(
                || BytesMut::from(fixture.content()),
                |bytes_mut| routine(&mut request_decoder, bytes_mut),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn benchmark_request_decoder(criterion: &mut Criterion) {
    bench_fixture(criterion, "request_decoder", |decoder, bytes_mut| {
        let message = decoder.decode(bytes_mut).expect("fixture should frame").expect("fixture is complete");
        black_box(message);
    });
}

fn benchmark_decode_and_parse(criterion: &mut Criterion) {
    bench_fixture(criterion, "decode_and_parse", |decoder, bytes_mut| {
        let message = decoder.decode(bytes_mut).expect("fixture should frame").expect("fixture is complete");
        let request = parse_request(message).expect("fixture should parse");
        black_box(request);
    });
}

criterion_group!(decoder, benchmark_request_decoder, benchmark_decode_and_parse);
criterion_main!(decoder);
