// ABOUTME: Benchmark suite for console output parsing and reply matching
// ABOUTME: Measures listing parsing, attribute block parsing and ordered pattern evaluation

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jcli::expect::{Expect, Prompt, Prompts};
use jcli::response::{detail_lines, parse_attribute_block, parse_table};
use std::time::Duration;

fn mt_listing(rows: usize) -> String {
    let mut raw = String::from(
        "mtrouter -l\r\n#Order Type                    Rate       Connector ID(s)                  Filter(s)\r\n",
    );
    for order in 0..rows {
        raw.push_str(&format!(
            "#{order:<5} RandomRoundrobinMTRoute 0.0 (!)    smppc(c{order}), smppc(d{order})   <T>, <DA (dst_addr=^\\+33\\d+)>\r\n"
        ));
    }
    raw.push_str(&format!("Total MT Routes: {rows}\r\njcli : "));
    raw
}

fn user_detail() -> String {
    let mut raw = String::from("uid u1\r\ngid g1\r\nusername alice\r\n");
    for (sub, key) in [
        ("authorization", "http_send"),
        ("authorization", "smpps_send"),
        ("authorization", "dlr_level"),
        ("value_filter", "src_addr"),
        ("value_filter", "dst_addr"),
        ("quota", "balance"),
        ("quota", "sms_count"),
        ("quota", "http_throughput"),
    ] {
        raw.push_str(&format!("mt_messaging_cred {sub} {key} ND\r\n"));
    }
    raw
}

fn bench_parse_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_table");
    group.measurement_time(Duration::from_secs(10));

    for rows in [1, 10, 100] {
        let raw = mt_listing(rows);
        group.bench_with_input(BenchmarkId::new("mt_routes", rows), &raw, |b, raw| {
            b.iter(|| parse_table(black_box(raw)))
        });
    }

    group.finish();
}

fn bench_attribute_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("attribute_block");
    group.measurement_time(Duration::from_secs(10));

    let raw = user_detail();
    group.bench_function("user_detail", |b| {
        b.iter(|| parse_attribute_block(detail_lines(black_box(&raw))))
    });

    group.finish();
}

fn bench_reply_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("reply_matching");
    group.measurement_time(Duration::from_secs(10));

    let matcher = Expect::new()
        .success(r"Successfully(.+)", Prompt::Standard)
        .not_found(r"Unknown MT Route: .*", Prompt::Standard)
        .failure(r"(.*)", Prompt::Standard)
        .compile(&Prompts::default())
        .expect("patterns compile");

    let success = "mtrouter -r 20\r\nSuccessfully removed MT route with order:20\r\njcli : ";
    let partial = "mtrouter -r 20\r\nSuccessfully rem";
    let listing = mt_listing(100);

    group.bench_function("success", |b| b.iter(|| matcher.find(black_box(success))));
    group.bench_function("incomplete", |b| b.iter(|| matcher.find(black_box(partial))));
    group.bench_function("catch_all_large", |b| b.iter(|| matcher.find(black_box(&listing))));

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_table,
    bench_attribute_block,
    bench_reply_matching
);
criterion_main!(benches);
