use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gridload::grid::WorksheetOptions;
use gridload::types::CellValue;
use gridload::{impl_record, GenericLoader, LoadOptions, RecordExtractor, Workbook};

#[derive(Clone)]
struct Sale {
    id: i64,
    name: String,
    amount: f64,
    paid: bool,
}

impl_record!(Sale { id, name, amount, paid });

fn sales(size: usize) -> Vec<Sale> {
    (0..size as i64)
        .map(|i| Sale {
            id: i,
            name: format!("Name_{}", i),
            amount: i as f64 * 1.5,
            paid: i % 2 == 0,
        })
        .collect()
}

fn benchmark_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");
    group.sample_size(10);

    for size in [1000, 10000, 100000].iter() {
        let records = sales(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut book = Workbook::new();
                let summary = book.load_records(&records, "Sales").unwrap();
                black_box(summary);
            });
        });
    }

    group.finish();
}

fn benchmark_buffer_items(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_items");
    group.sample_size(10);

    let records = sales(20000);
    for items in [1, 64, 512, 4096].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(items), items, |b, &items| {
            let loader = GenericLoader::with_options(
                RecordExtractor,
                LoadOptions::builder().with_buffer_items(items).build(),
            );
            b.iter(|| {
                let mut book =
                    Workbook::with_sheet_options(WorksheetOptions::default().with_default_extents(0, 0));
                black_box(loader.load(&mut book, &records).unwrap());
            });
        });
    }

    group.finish();
}

fn benchmark_wide_rows(c: &mut Criterion) {
    let rows: Vec<Vec<CellValue>> = (0..2000)
        .map(|r| (0..200).map(|c| CellValue::Int(r * 200 + c)).collect())
        .collect();

    c.bench_function("wide_rows_2000x200", |b| {
        b.iter(|| {
            let mut book = Workbook::new();
            black_box(book.load_records(&rows, "Wide").unwrap());
        });
    });
}

criterion_group!(
    benches,
    benchmark_load,
    benchmark_buffer_items,
    benchmark_wide_rows
);
criterion_main!(benches);
