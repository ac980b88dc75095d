//! Throughput Benchmark for upcase-echo
//!
//! Measures the transform on its own, the transfer helpers over an
//! in-memory pipe, and a full loopback round trip through the server.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use upcase_echo::config::ServerConfig;
use upcase_echo::server::EchoServer;
use upcase_echo::transfer::{recv_exact, send_all};
use upcase_echo::transform::uppercase_in_place;
use upcase_echo::BUFFER_SIZE;

/// Benchmark the in-place transform on one full scratch buffer
fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    group.throughput(Throughput::Bytes(BUFFER_SIZE as u64));

    let source: Vec<u8> = b"the quick brown fox jumps over the lazy dog 0123456789 "
        .iter()
        .copied()
        .cycle()
        .take(BUFFER_SIZE)
        .collect();

    group.bench_function("uppercase_4k", |b| {
        let mut buf = source.clone();
        b.iter(|| {
            buf.copy_from_slice(&source);
            uppercase_in_place(black_box(&mut buf));
        });
    });

    group.finish();
}

/// Benchmark send_all / recv_exact over an in-memory duplex pipe
fn bench_transfer(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("transfer");
    group.throughput(Throughput::Bytes(BUFFER_SIZE as u64));

    let payload = vec![b'x'; BUFFER_SIZE];

    group.bench_function("duplex_4k", |b| {
        b.iter(|| {
            rt.block_on(async {
                let (mut tx, mut rx) = tokio::io::duplex(512);
                let data = payload.clone();
                let writer = tokio::spawn(async move { send_all(&mut tx, &data).await.unwrap() });

                let mut buf = vec![0u8; BUFFER_SIZE];
                black_box(recv_exact(&mut rx, &mut buf).await.unwrap());
                writer.await.unwrap();
            })
        });
    });

    group.finish();
}

/// Benchmark a request/response round trip through a live server
fn bench_roundtrip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let addr = rt.block_on(async {
        let server = EchoServer::bind(ServerConfig {
            port: 0,
            ..Default::default()
        })
        .unwrap();
        let addr = server.local_addr();
        tokio::spawn(server.run());
        addr
    });

    let mut stream = rt.block_on(async {
        let stream = TcpStream::connect(addr).await.unwrap();
        stream.set_nodelay(true).unwrap();
        stream
    });

    let mut group = c.benchmark_group("roundtrip");

    for size in [16usize, 1024, 4095] {
        let request = vec![b'a'; size];
        let mut response = vec![0u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(format!("loopback_{}", size), |b| {
            b.iter(|| {
                rt.block_on(async {
                    send_all(&mut stream, &request).await.unwrap();
                    black_box(recv_exact(&mut stream, &mut response).await.unwrap());
                })
            });
        });
    }

    rt.block_on(async {
        let _ = stream.shutdown().await;
    });

    group.finish();
}

criterion_group!(benches, bench_transform, bench_transfer, bench_roundtrip);

criterion_main!(benches);
