use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pathmacro::{Dispatch, Registry, Route, Store, Template};

fn parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("Parse");
    let registry = Registry::new();

    group.bench_function("untyped", |b| {
        b.iter(|| {
            for pattern in black_box(routes!(untyped)) {
                black_box(Template::parse(pattern, &registry).unwrap());
            }
        });
    });

    group.bench_function("typed", |b| {
        b.iter(|| {
            for pattern in black_box(routes!(typed)) {
                black_box(Template::parse(pattern, &registry).unwrap());
            }
        });
    });

    group.finish();
}

fn serve(c: &mut Criterion) {
    let mut group = c.benchmark_group("Serve");
    let registry = Registry::new();
    let paths = routes!(literal).to_vec();

    let mut plain = matchit::Router::new();
    for route in routes!(untyped) {
        plain.insert(route, true).unwrap();
    }
    group.bench_function("matchit", |b| {
        b.iter(|| {
            for path in black_box(&paths) {
                let matched = black_box(plain.at(path).unwrap());
                assert!(*matched.value);
            }
        });
    });

    let mut filtered = matchit::Router::new();
    for pattern in routes!(typed) {
        let route = Route::new(pattern, &registry, |_: &Store<'_>| true).unwrap();
        filtered.insert(route.template().route(), route).unwrap();
    }
    group.bench_function("matchit + filter", |b| {
        b.iter(|| {
            for path in black_box(&paths) {
                let matched = filtered.at(path).unwrap();
                let mut store: Store<'_> = matched.params.iter().map(|(_, v)| v).collect();
                let res = black_box(matched.value.dispatch(&mut store));
                assert!(matches!(res, Dispatch::Handled(true)));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, parse, serve);
criterion_main!(benches);

macro_rules! routes {
    (literal) => {{
        routes!(finish => "octocat", "hello-world.rs", "42", "open")
    }};
    (untyped) => {{
        routes!(finish => "{p1}", "{p2}", "{p3}", "{p4}")
    }};
    (typed) => {{
        routes!(finish =>
            "{p1:alphabetical}",
            "{p2:file max(64)}",
            "{p3:uint64 min(1) else 400}",
            "{p4:string regexp(^(open|closed)$)}"
        )
    }};
    (finish => $p1:literal, $p2:literal, $p3:literal, $p4:literal) => {{
        [
            concat!("/authorizations"),
            concat!("/authorizations/", $p3),
            concat!("/applications/", $p1, "/tokens/", $p3),
            concat!("/events"),
            concat!("/repos/", $p1, "/", $p2, "/events"),
            concat!("/networks/", $p1, "/", $p2, "/events"),
            concat!("/orgs/", $p1, "/events"),
            concat!("/users/", $p1, "/received_events"),
            concat!("/users/", $p1, "/events/orgs/", $p2),
            concat!("/notifications/threads/", $p3),
            concat!("/gists/", $p3, "/star"),
            concat!("/repos/", $p1, "/", $p2, "/git/blobs/", $p3),
            concat!("/repos/", $p1, "/", $p2, "/issues/", $p3),
            concat!("/repos/", $p1, "/", $p2, "/issues/", $p3, "/comments"),
            concat!("/repos/", $p1, "/", $p2, "/milestones/", $p3, "/labels"),
            concat!("/repos/", $p1, "/", $p2, "/pulls/", $p3, "/commits"),
            concat!("/repos/", $p1, "/", $p2, "/releases/", $p3, "/assets"),
            concat!("/legacy/issues/search/", $p1, "/", $p2, "/", $p3, "/", $p4),
            concat!("/legacy/user/search/", $p1),
            concat!("/users/", $p1, "/following/", $p2),
            concat!("/user/keys/", $p3),
            concat!("/user"),
        ]
    }};
}

use routes;
