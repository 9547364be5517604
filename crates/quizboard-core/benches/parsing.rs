use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizboard_core::groups::detect_groups;
use quizboard_core::table::parse_table;

fn make_headers(questions: usize) -> Vec<String> {
    let mut headers = vec!["Username".to_string(), "Total score".to_string()];
    for i in 0..questions {
        headers.push(format!("Question {i}"));
        headers.push(format!("Question {i} [Score]"));
        if i % 2 == 0 {
            headers.push(format!("Question {i} [Feedback]"));
        }
    }
    headers
}

fn make_csv(questions: usize, rows: usize) -> String {
    let headers = make_headers(questions);
    let mut s = headers
        .iter()
        .map(|h| format!("\"{h}\""))
        .collect::<Vec<_>>()
        .join(",");
    s.push('\n');
    for r in 0..rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| {
                if h.ends_with("[Score]") {
                    "1/1".to_string()
                } else {
                    format!("answer {r}")
                }
            })
            .collect();
        s.push_str(&cells.join(","));
        s.push('\n');
    }
    s
}

fn bench_detect_groups(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_groups");

    for q in [5, 50, 200] {
        let headers = make_headers(q);
        group.bench_function(format!("questions={q}"), |b| {
            b.iter(|| detect_groups(black_box(&headers)))
        });
    }

    group.finish();
}

fn bench_parse_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_table");

    let small = make_csv(10, 30);
    let large = make_csv(40, 2_000);
    let html = "<!DOCTYPE html><html><body>Not found</body></html>".to_string();

    group.bench_function("small", |b| b.iter(|| parse_table(black_box(&small))));
    group.bench_function("large", |b| b.iter(|| parse_table(black_box(&large))));
    group.bench_function("html_rejected", |b| b.iter(|| parse_table(black_box(&html))));

    group.finish();
}

criterion_group!(benches, bench_detect_groups, bench_parse_table);
criterion_main!(benches);
