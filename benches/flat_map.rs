use bencher::{benchmark_group, benchmark_main, black_box, Bencher};
use rxpush::prelude::*;
use std::convert::Infallible;

fn range(
  n: u64,
) -> ObservableCreate<impl Fn(Emitter<u64, Infallible>), u64, Infallible> {
  observable::create(move |emitter| {
    for v in 0..n {
      if emitter.is_stopped() {
        return;
      }
      emitter.next(v);
    }
    emitter.complete();
  })
}

fn flat_map_just(b: &mut Bencher) {
  b.iter(|| {
    range(1000)
      .flat_map(observable::just::<u64, Infallible>, 4)
      .unwrap()
      .last()
      .subscribe(|v| {
        black_box(v);
      })
  });
}

fn flat_map_sequential(b: &mut Bencher) {
  b.iter(|| {
    range(100)
      .flat_map(|_| range(10), 1)
      .unwrap()
      .subscribe(|_| {})
  });
}

fn flat_map_queued(b: &mut Bencher) {
  b.iter(|| {
    range(100)
      .flat_map(|v| range(v % 10), 2)
      .unwrap()
      .last()
      .subscribe(|_| {})
  });
}

benchmark_group!(benches, flat_map_just, flat_map_sequential, flat_map_queued);
benchmark_main!(benches);
