use std::hint::black_box;

use bencher::{TestCase, TestFile};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use futures::executor::block_on;
use futures::FutureExt;
use http::Method;
use micro_router::pattern::is_url_matched;
use micro_router::{terminal_fn, Dispatcher, Request, Response, RouteMethod, Router};

static SMALL_TABLE: TestFile = TestFile::new("small.txt", include_str!("../resources/routes/small.txt"));
static LARGE_TABLE: TestFile = TestFile::new("large.txt", include_str!("../resources/routes/large.txt"));

fn create_test_cases() -> Vec<TestCase> {
    vec![
        TestCase::small("small_table_nested", SMALL_TABLE, "/users/42/posts/hello"),
        TestCase::large("large_table_last", LARGE_TABLE, "/api/teams/7/history/3"),
        TestCase::large("large_table_miss", LARGE_TABLE, "/api/unknown/7"),
    ]
}

fn build_dispatcher(file: &TestFile) -> Dispatcher {
    let mut router = Router::new();
    for (method, path) in file.routes() {
        let method = method.parse::<RouteMethod>().expect("route table should only contain known methods");
        let reply = terminal_fn(|_req, res| async move { Ok(res.text("ok")?) }.boxed());
        router.register(method, Some(path), [reply]).expect("route should be valid");
    }
    Dispatcher::builder().router(router).build().expect("router is set")
}

fn benchmark_path_matching(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("path_matching");

    for case in create_test_cases() {
        let schemas: Vec<&str> = case.file().routes().map(|(_, path)| path).collect();
        group.throughput(Throughput::Elements(schemas.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter(|| schemas.iter().filter(|schema| is_url_matched(schema, black_box(case.target()), false)).count());
        });
    }

    group.finish();
}

fn benchmark_dispatch(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("dispatch");

    for case in create_test_cases() {
        let dispatcher = build_dispatcher(case.file());
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter_batched(
                || (Request::new(Method::GET, case.target()), Response::new()),
                |(mut req, mut res)| {
                    block_on(dispatcher.handle(&mut req, &mut res)).expect("dispatch should recover every error");
                    black_box(res);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(routing, benchmark_path_matching, benchmark_dispatch);
criterion_main!(routing);
