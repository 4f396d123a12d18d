//! Loading typed records into a workbook and reading them back

use chrono::NaiveDate;
use gridload::{
    impl_record, GenericLoader, LoadOptions, RecordExtractor, SheetEvent, Surface, TargetRange,
    Workbook,
};

struct Employee {
    id: u32,
    name: String,
    department: Option<String>,
    hired: NaiveDate,
    salary: f64,
}

impl_record!(Employee {
    id,
    name,
    department,
    hired,
    salary
});

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let staff = vec![
        Employee {
            id: 1,
            name: "Alice Johnson".to_string(),
            department: Some("Engineering".to_string()),
            hired: NaiveDate::from_ymd_opt(2019, 4, 1).ok_or("bad date")?,
            salary: 75000.0,
        },
        Employee {
            id: 2,
            name: "Bob Smith".to_string(),
            department: None,
            hired: NaiveDate::from_ymd_opt(2021, 9, 15).ok_or("bad date")?,
            salary: 65000.0,
        },
        Employee {
            id: 3,
            name: "Carol White".to_string(),
            department: Some("Sales".to_string()),
            hired: NaiveDate::from_ymd_opt(2016, 1, 11).ok_or("bad date")?,
            salary: 85000.0,
        },
    ];

    // Quick path: default options, one call
    let mut book = Workbook::new();
    let summary = book.load_records(&staff, "Staff")?;
    println!(
        "Loaded {} records into {} in {} batch(es)",
        summary.records, summary.range, summary.batches
    );

    // Buffer size, auto-spread and short-row handling come from GRIDLOAD_* variables
    let options = LoadOptions {
        target_range: TargetRange::starting_at(1, 1),
        ..LoadOptions::from_env()
    };
    let loader = GenericLoader::with_options(RecordExtractor, options);

    // Reading into an existing sheet keeps its subscriptions
    let sheet = book.worksheet_mut(0).ok_or("workbook is empty")?;
    sheet.on_event(|event| {
        if let SheetEvent::RangeDataChanged(range) = event {
            println!("Sheet changed: {}", range);
        }
    });
    loader.read(sheet, &staff)?;

    let sheet = book.worksheet(0).ok_or("workbook is empty")?;
    println!("Sheet '{}' is {}x{}", sheet.name(), sheet.row_count(), sheet.column_count());
    for row in sheet.rows().skip(1).take(staff.len()) {
        println!("{}", row.to_strings()[1..6].join(" | "));
    }

    Ok(())
}
