use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;
use signup::models::Project;
use signup::services::slug::slugify;
use std::hint::black_box;

fn benchmark_project_creation(c: &mut Criterion) {
    let long_name = "Über Résumé Generator für Ærø & Friends ".repeat(20);

    let body = json!({
        "project_name": "My Cool Project",
        "owner_id": "octocat",
        "members": ["octocat", "hubot", "monalisa"],
        "project_repo": "https://github.com/octocat/my-cool-project",
        "project_description": "A project with a reasonably long description ".repeat(10),
        "comments": [{"body": "ignored", "user": "x", "posted": "2026-01-01T00:00:00Z"}],
    });
    let fields = body.as_object().expect("object literal").clone();

    let mut group = c.benchmark_group("project_creation");

    group.bench_function("slugify_short", |b| {
        b.iter(|| slugify(black_box("My Cool Project")))
    });

    group.bench_function("slugify_long_unicode", |b| {
        b.iter(|| slugify(black_box(&long_name)))
    });

    group.bench_function("project_from_body", |b| {
        b.iter(|| Project::from_body(black_box(&fields)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_project_creation);
criterion_main!(benches);
