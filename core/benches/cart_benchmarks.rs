use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use storefront::backend::memory::InMemoryBackend;
use storefront::checkout::snapshot_lines;
use storefront::{CartEngine, CartLine, CartView, MemoryStorage, Owner, SharedBackend};
use tokio::runtime::Runtime;
use uuid::Uuid;

fn lines(n: usize) -> Vec<CartLine> {
  (0..n)
    .map(|i| CartLine {
      id: Uuid::new_v4(),
      product_id: Uuid::new_v4(),
      title: format!("Product {}", i),
      price_cents: 1_000 + i as i64,
      qty: (i % 5) as i32 + 1,
      images: vec![],
    })
    .collect()
}

// --- Pure derivations ---

fn bench_view_and_snapshot(c: &mut Criterion) {
  let mut group = c.benchmark_group("CartDerivations");
  let owner = Owner::Anonymous { device_id: Uuid::nil() };

  for size in [1usize, 10, 100].iter() {
    let input = lines(*size);
    group.throughput(Throughput::Elements(*size as u64));
    group.bench_with_input(BenchmarkId::new("view_totals", size), &input, |b, input| {
      b.iter(|| CartView::new(owner, input.clone()))
    });
    group.bench_with_input(BenchmarkId::new("order_snapshot", size), &input, |b, input| {
      b.iter(|| snapshot_lines(input))
    });
  }
  group.finish();
}

// --- Engine operations against the in-memory backend ---

fn bench_engine_add(c: &mut Criterion) {
  let mut group = c.benchmark_group("CartEngineAdd");
  let rt = Runtime::new().unwrap();

  for signed_in in [false, true].iter() {
    let backend = Arc::new(InMemoryBackend::new());
    let product = backend.seed_product("Bench", 10_000);
    let shared: SharedBackend = backend.clone();
    let engine = CartEngine::new(shared, Arc::new(MemoryStorage::new()), Uuid::new_v4());
    if *signed_in {
      let user_id = Uuid::new_v4();
      backend.create_profile(user_id, false);
      rt.block_on(engine.sign_in(user_id)).unwrap();
    }

    let label = if *signed_in { "remote" } else { "local" };
    group.bench_function(BenchmarkId::new("add_to_cart", label), |b| {
      b.to_async(&rt).iter(|| async { engine.add_to_cart(product.id, 1).await.unwrap() })
    });
  }
  group.finish();
}

fn bench_sign_in_reconcile(c: &mut Criterion) {
  let mut group = c.benchmark_group("SignInReconcile");
  let rt = Runtime::new().unwrap();

  for local_lines in [1usize, 10, 50].iter() {
    let backend = Arc::new(InMemoryBackend::new());
    let products: Vec<_> = (0..*local_lines)
      .map(|i| backend.seed_product(&format!("P{}", i), 1_000))
      .collect();

    group.bench_with_input(BenchmarkId::from_parameter(local_lines), &products, |b, products| {
      b.to_async(&rt).iter(|| async {
        let shared: SharedBackend = backend.clone();
        let engine = CartEngine::new(shared, Arc::new(MemoryStorage::new()), Uuid::new_v4());
        for p in products {
          engine.add_to_cart(p.id, 2).await.unwrap();
        }
        let user_id = Uuid::new_v4();
        engine.sign_in(user_id).await.unwrap()
      })
    });
  }
  group.finish();
}

criterion_group!(benches, bench_view_and_snapshot, bench_engine_add, bench_sign_in_reconcile);
criterion_main!(benches);
